use log::{debug, trace};

use crate::engine::BodyState;
use crate::error::Error;
use crate::geometry::{Axis, Direction, Rect};
use crate::scene::World;

use super::sweep::{sweep_pair, SweepBody, SweptContact};

/// Result of one frame's collision loop.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolveOutcome {
    /// Number of resolved collisions.
    pub passes: usize,
    /// True when the iteration cap ended the loop early.
    pub capped: bool,
}

struct Earliest {
    first: usize,
    second: usize,
    contact: SweptContact,
}

/// Runs the iterative earliest-collision loop over the frame time, then
/// performs the final free-flight move for the residual slice.
///
/// Bodies advance together to each collision instant, so free flight of
/// uninvolved bodies is never interrupted. The loop is capped at
/// `max_passes` to guarantee termination under pathological contact
/// configurations; hitting the cap is recoverable and simply ends
/// resolution for this frame.
pub(crate) fn resolve_collisions(
    world: &mut World,
    states: &mut [BodyState],
    connection_counter: &mut u64,
    frame_time: f64,
    max_passes: usize,
) -> Result<ResolveOutcome, Error> {
    let mut remaining = frame_time;
    let mut passes = 0;
    let mut capped = false;

    while remaining > 0.0 {
        let Some(hit) = find_earliest(world, states, remaining)? else {
            break;
        };
        if passes >= max_passes {
            capped = true;
            break;
        }

        let t = hit.contact.time;
        advance_all(world, states, remaining * t)?;
        resolve_contact(world, states, connection_counter, &hit)?;

        remaining *= 1.0 - t;
        passes += 1;
    }

    // Final free-flight move over whatever slice is left.
    advance_all(world, states, remaining)?;

    Ok(ResolveOutcome { passes, capped })
}

/// World-space rectangles of a body (local geometry mapped through the
/// ancestor chain).
pub(crate) fn global_rects(world: &World, state: &BodyState) -> Result<Vec<Rect>, Error> {
    let body = world.body(state.node)?;
    body.geometry
        .iter()
        .map(|&rect| world.map_rect_to_global(state.node, rect, None))
        .collect()
}

fn find_earliest(
    world: &World,
    states: &[BodyState],
    remaining: f64,
) -> Result<Option<Earliest>, Error> {
    let mut rect_cache = Vec::with_capacity(states.len());
    for state in states {
        rect_cache.push(global_rects(world, state)?);
    }

    let mut best: Option<Earliest> = None;
    for first in 0..states.len() {
        for second in first + 1..states.len() {
            let body_a = world.body(states[first].node)?;
            let body_b = world.body(states[second].node)?;
            if !body_a.movable && !body_b.movable {
                continue;
            }

            // A standing pair's vertical contact is a resolved state, not a
            // new collision.
            let resting_on_each_other = states[first].is_stand
                && states[second].is_stand
                && (states[first].contiguous[Direction::Down.index()] == Some(second)
                    || states[second].contiguous[Direction::Down.index()] == Some(first));

            let contact = sweep_pair(
                SweepBody {
                    rects: &rect_cache[first],
                    velocity: body_a.velocity,
                    movable: body_a.movable,
                },
                SweepBody {
                    rects: &rect_cache[second],
                    velocity: body_b.velocity,
                    movable: body_b.movable,
                },
                resting_on_each_other,
                remaining,
            );

            if let Some(contact) = contact {
                let earlier = match &best {
                    Some(b) => contact.time < b.contact.time,
                    None => true,
                };
                if earlier {
                    best = Some(Earliest {
                        first,
                        second,
                        contact,
                    });
                }
            }
        }
    }
    Ok(best)
}

/// Advances every body by its velocity over `dt` seconds. Immovable bodies
/// advance too: moving platforms carry a velocity of their own.
fn advance_all(world: &mut World, states: &[BodyState], dt: f64) -> Result<(), Error> {
    if dt <= 0.0 {
        return Ok(());
    }
    for state in states {
        let velocity = world.body(state.node)?.velocity;
        let position = world.position(state.node)?;
        world.set_position(state.node, position + velocity * dt)?;
    }
    Ok(())
}

fn resolve_contact(
    world: &mut World,
    states: &mut [BodyState],
    connection_counter: &mut u64,
    hit: &Earliest,
) -> Result<(), Error> {
    let (i, j) = (hit.first, hit.second);
    let dir = hit.contact.direction;
    let axis = dir.axis();

    trace!(
        "contact between bodies {i} and {j}: t={:.6} dir={dir:?}",
        hit.contact.time
    );

    // Symmetric contact graph update.
    states[i].contiguous[dir.index()] = Some(j);
    states[j].contiguous[dir.opposite().index()] = Some(i);

    // Chain membership is decided on the ids held before the merge; a fresh
    // pair gets a new id, otherwise the larger id wins and chains merge.
    let same_chain =
        states[i].connection != 0 && states[i].connection == states[j].connection;
    let merged = if states[i].connection == 0 && states[j].connection == 0 {
        *connection_counter += 1;
        *connection_counter
    } else {
        states[i].connection.max(states[j].connection)
    };
    states[i].connection = merged;
    states[j].connection = merged;

    apply_impact(world, states, i, j, axis, same_chain)?;

    // Re-evaluate stand for both sides, then merge static counters so a
    // collision re-activates a sleeping partner.
    update_stand(world, states, i)?;
    update_stand(world, states, j)?;

    let min_frames = states[i].static_frames.min(states[j].static_frames);
    states[i].static_frames = min_frames;
    states[j].static_frames = min_frames;
    if states[i].is_static || states[j].is_static {
        debug!("collision re-activated a static body pair ({i}, {j})");
    }
    states[i].is_static = false;
    states[j].is_static = false;

    Ok(())
}

/// Exchanges momentum along the collision axis.
fn apply_impact(
    world: &mut World,
    states: &[BodyState],
    i: usize,
    j: usize,
    axis: Axis,
    same_chain: bool,
) -> Result<(), Error> {
    let body_a = world.body(states[i].node)?;
    let body_b = world.body(states[j].node)?;

    let v1 = axis.component(body_a.velocity);
    let v2 = axis.component(body_b.velocity);
    let recovery = (body_a.hit_recovery_factor + body_b.hit_recovery_factor) / 2.0;

    let (new_v1, new_v2) = if same_chain {
        // Redundant re-detection inside an already-resolved stack: snap the
        // pair together instead of injecting energy.
        if !body_a.movable {
            (v1, v1)
        } else if !body_b.movable {
            (v2, v2)
        } else {
            (0.0, 0.0)
        }
    } else {
        match (body_a.movable, body_b.movable) {
            (true, true) => {
                let (m1, m2) = effective_masses(body_a.mass, body_b.mass);
                let v1_new =
                    (m1 * v1 + m2 * v2 - m2 * recovery * (v1 - v2)) / (m1 + m2);
                (v1_new, v1_new + recovery * (v1 - v2))
            }
            // Bounce off a possibly moving platform.
            (true, false) => (v2 - recovery * (v1 - v2), v2),
            (false, true) => (v1, v1 - recovery * (v2 - v1)),
            (false, false) => (v1, v2),
        }
    };

    let va = axis.with_component(body_a.velocity, new_v1);
    let vb = axis.with_component(body_b.velocity, new_v2);
    world.body_mut(states[i].node)?.velocity = va;
    world.body_mut(states[j].node)?.velocity = vb;
    Ok(())
}

/// Zero-mass movable pairs fall back to equal masses so the restitution
/// formula stays finite.
#[inline]
fn effective_masses(m1: f64, m2: f64) -> (f64, f64) {
    if m1 + m2 <= f64::EPSILON {
        (1.0, 1.0)
    } else {
        (m1, m2)
    }
}

/// A body stands when it is movable, has a Down contact, and the support
/// chain below it bottoms out at an immovable body. Standing zeroes the
/// vertical velocity.
fn update_stand(
    world: &mut World,
    states: &mut [BodyState],
    index: usize,
) -> Result<(), Error> {
    if !world.body(states[index].node)?.movable {
        return Ok(());
    }

    let mut visited = vec![false; states.len()];
    let mut current = index;
    let standing = loop {
        if visited[current] {
            break false;
        }
        visited[current] = true;

        let Some(below) = states[current].contiguous[Direction::Down.index()] else {
            break false;
        };
        if !world.body(states[below].node)?.movable || states[below].is_stand {
            break true;
        }
        current = below;
    };

    if standing {
        states[index].is_stand = true;
        let body = world.body_mut(states[index].node)?;
        body.velocity.y = 0.0;
    }
    Ok(())
}
