use crate::engine::{BodyState, EngineConfig};
use crate::error::Error;
use crate::geometry::{Axis, Direction};
use crate::scene::{Body, World};

/// Applies gravity and directional air friction to a body, then clamps the
/// resulting speed to the configured maximum.
///
/// Air friction opposes the full velocity vector; speeds below the per-step
/// friction loss snap to exactly zero so a decelerating body never
/// oscillates around rest.
pub(crate) fn integrate_body(body: &mut Body, config: &EngineConfig, dt: f64) {
    body.velocity.y += config.gravity * dt;

    let speed_lost = config.air_friction * dt;
    let speed = body.speed();
    if speed < speed_lost {
        body.velocity = glam::DVec2::ZERO;
    } else if speed > 0.0 {
        body.velocity -= body.velocity / speed * speed_lost;
    }

    let speed = body.speed();
    if speed > config.max_speed {
        body.velocity *= config.max_speed / speed;
    }
}

/// Applies contact friction across this frame's contact graph.
///
/// Each body is charged for its Down and Right links only, so every
/// symmetric link is processed exactly once. Friction acts on the
/// tangential component: a Down contact drags the horizontal velocities
/// toward each other, a Right contact the vertical ones.
pub(crate) fn apply_contact_friction(
    world: &mut World,
    states: &[BodyState],
    dt: f64,
) -> Result<(), Error> {
    for (index, state) in states.iter().enumerate() {
        for dir in [Direction::Down, Direction::Right] {
            if let Some(other) = state.contiguous[dir.index()] {
                let tangent = dir.axis().other();
                rub_together(world, states, index, other, tangent, dt)?;
            }
        }
    }
    Ok(())
}

/// Moves the two tangential velocity components toward each other by the
/// averaged friction step, clamped so the pair never overshoots equality.
fn rub_together(
    world: &mut World,
    states: &[BodyState],
    i: usize,
    j: usize,
    tangent: Axis,
    dt: f64,
) -> Result<(), Error> {
    let body_a = world.body(states[i].node)?;
    let body_b = world.body(states[j].node)?;

    let friction = (body_a.friction_factor + body_b.friction_factor) / 2.0 * dt;
    let v1 = tangent.component(body_a.velocity);
    let v2 = tangent.component(body_b.velocity);
    let gap = v2 - v1;
    if gap == 0.0 || friction <= 0.0 {
        return Ok(());
    }

    let (movable_a, movable_b) = (body_a.movable, body_b.movable);
    // With both sides movable each may close at most half the gap, so they
    // meet in the middle instead of swapping past each other.
    let limit = if movable_a && movable_b {
        gap.abs() / 2.0
    } else {
        gap.abs()
    };
    let step = friction.min(limit) * gap.signum();

    if movable_a {
        let body = world.body_mut(states[i].node)?;
        body.velocity = tangent.with_component(body.velocity, v1 + step);
    }
    if movable_b {
        let body = world.body_mut(states[j].node)?;
        body.velocity = tangent.with_component(body.velocity, v2 - step);
    }
    Ok(())
}
