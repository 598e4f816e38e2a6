//! The frame-stepping engine: registry maintenance, static detection,
//! integration, collision resolution and contact friction, in a fixed
//! per-frame order.

use std::collections::HashMap;

use log::warn;

use crate::collision::resolver::{global_rects, resolve_collisions};
use crate::dynamics::integrator::{apply_contact_friction, integrate_body};
use crate::error::Error;
use crate::geometry::Direction;
use crate::scene::{NodeId, World};

mod config;
mod metadata;

pub use config::EngineConfig;
pub(crate) use metadata::BodyState;

/// Drives the simulation over a [`World`].
///
/// The engine owns per-body metadata (contacts, stand flags, static
/// counters) keyed by registry index. [`PhysicsEngine::update_metadata`]
/// rebuilds that registry from the world's current body set and must be
/// called after the scene is wired and again after every body add or
/// remove; [`PhysicsEngine::step`] refuses to run against a world whose
/// structure has changed since the last rebuild.
pub struct PhysicsEngine {
    config: EngineConfig,
    states: Vec<BodyState>,
    index: HashMap<NodeId, usize>,
    connection_counter: u64,
    seen_revision: Option<u64>,
}

impl Default for PhysicsEngine {
    fn default() -> Self {
        PhysicsEngine::new(EngineConfig::default())
    }
}

impl PhysicsEngine {
    pub fn new(config: EngineConfig) -> Self {
        PhysicsEngine {
            config,
            states: Vec::new(),
            index: HashMap::new(),
            connection_counter: 0,
            seen_revision: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Rebuilds the body registry from the world's current body set and
    /// records the world revision. All per-body metadata is reset.
    pub fn update_metadata(&mut self, world: &World) {
        self.states.clear();
        self.index.clear();
        for node in world.collect_bodies() {
            let position = match world.position(node) {
                Ok(p) => p,
                Err(_) => continue,
            };
            self.index.insert(node, self.states.len());
            self.states.push(BodyState::new(node, position));
        }
        self.seen_revision = Some(world.revision());
    }

    /// Advances the simulation by `frame_time` seconds.
    ///
    /// Non-positive frame times are a no-op. Fails without touching the
    /// world when the registry was never built or is stale.
    pub fn step(&mut self, world: &mut World, frame_time: f64) -> Result<(), Error> {
        let seen = self.seen_revision.ok_or(Error::WorldDetached)?;
        let actual = world.revision();
        if seen != actual {
            return Err(Error::StaleMetadata { seen, actual });
        }
        if frame_time <= 0.0 {
            return Ok(());
        }

        self.detect_static(world, frame_time)?;

        for state in &mut self.states {
            // Chain ids are frame-scoped; a sleeping body keeps its contact
            // slots but must not pull fresh collisions into last frame's
            // chain.
            state.connection = 0;
            if !state.is_static {
                state.reset_contacts();
            }
        }

        for state in &self.states {
            if state.is_static {
                continue;
            }
            let body = world.body_mut(state.node)?;
            if body.movable {
                integrate_body(body, &self.config, frame_time);
            }
        }

        let cap = self.config.pass_cap(self.states.len());
        let outcome = resolve_collisions(
            world,
            &mut self.states,
            &mut self.connection_counter,
            frame_time,
            cap,
        )?;
        if outcome.capped {
            warn!(
                "collision loop hit the pass cap ({cap}) after {} resolved contacts \
                 and ended early for this frame",
                outcome.passes
            );
        }

        self.repair_static_links(world)?;
        apply_contact_friction(world, &self.states, frame_time)?;

        self.validate_overlaps(world)?;
        Ok(())
    }

    /// Step 1 of the frame: bump or reset each body's static counter from
    /// its displacement since last frame, then refresh `last_position`.
    fn detect_static(&mut self, world: &World, dt: f64) -> Result<(), Error> {
        for state in &mut self.states {
            let position = world.position(state.node)?;
            let body = world.body(state.node)?;
            let displacement = (position - state.last_position).length();
            let travel = body.speed() * dt;

            if displacement < self.config.min_distance && travel < self.config.min_distance {
                state.static_frames += 1;
            } else {
                state.static_frames = 0;
                state.is_static = false;
            }
            if state.static_frames >= self.config.static_frame_threshold {
                state.is_static = true;
            }
            state.last_position = position;
        }
        Ok(())
    }

    /// Static bodies skip the per-frame contact reset, so their retained
    /// slots are checked against reality after resolution: a partner that
    /// still touches gets its reciprocal link restored, one that was
    /// knocked away is unlinked. A sleeper that loses its supporting link
    /// wakes and falls.
    fn repair_static_links(&mut self, world: &World) -> Result<(), Error> {
        for i in 0..self.states.len() {
            if !self.states[i].is_static {
                continue;
            }
            for dir in Direction::ALL {
                let Some(j) = self.states[i].contiguous[dir.index()] else {
                    continue;
                };
                let back = dir.opposite().index();
                if self.states[j].contiguous[back] == Some(i) {
                    continue;
                }

                let rects_i = global_rects(world, &self.states[i])?;
                let rects_j = global_rects(world, &self.states[j])?;
                let touching = rects_i
                    .iter()
                    .any(|a| rects_j.iter().any(|b| a.touches(*b)));

                if touching {
                    if self.states[j].contiguous[back].is_none() {
                        self.states[j].contiguous[back] = Some(i);
                    }
                } else {
                    self.states[i].contiguous[dir.index()] = None;
                    if dir == Direction::Down {
                        self.states[i].is_stand = false;
                        self.states[i].is_static = false;
                        self.states[i].static_frames = 0;
                    }
                }
            }
        }
        Ok(())
    }

    /// Step 7 of the frame: any pair still strictly interpenetrating after
    /// resolution is logged; with `rollback_on_overlap` set, both bodies
    /// return to their frame-start positions.
    fn validate_overlaps(&mut self, world: &mut World) -> Result<(), Error> {
        let mut rects = Vec::with_capacity(self.states.len());
        for state in &self.states {
            rects.push(global_rects(world, state)?);
        }

        let mut rolled_back = vec![false; self.states.len()];
        for i in 0..self.states.len() {
            for j in i + 1..self.states.len() {
                let overlapping = rects[i]
                    .iter()
                    .any(|a| rects[j].iter().any(|b| a.overlaps(*b)));
                if overlapping {
                    warn!("bodies {i} and {j} remain overlapping after resolution");
                    if self.config.rollback_on_overlap {
                        rolled_back[i] = true;
                        rolled_back[j] = true;
                    }
                }
            }
        }
        for (state, rolled) in self.states.iter().zip(&rolled_back) {
            if *rolled {
                world.set_position(state.node, state.last_position)?;
            }
        }
        Ok(())
    }

    fn state_of(&self, node: NodeId) -> Result<&BodyState, Error> {
        self.index
            .get(&node)
            .map(|&i| &self.states[i])
            .ok_or(Error::NoSuchNode(node))
    }

    /// True when the body rests on a support chain that bottoms out at an
    /// immovable body.
    pub fn is_standing(&self, node: NodeId) -> Result<bool, Error> {
        Ok(self.state_of(node)?.is_stand)
    }

    /// True when the body has been near-motionless long enough to be
    /// excluded from integration.
    pub fn is_static(&self, node: NodeId) -> Result<bool, Error> {
        Ok(self.state_of(node)?.is_static)
    }

    /// The body touching `node` on the given side this frame, if any.
    pub fn contact(&self, node: NodeId, direction: Direction) -> Result<Option<NodeId>, Error> {
        let state = self.state_of(node)?;
        Ok(state.contact(direction).map(|i| self.states[i].node))
    }

    pub fn num_tracked(&self) -> usize {
        self.states.len()
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec2;

    use crate::geometry::Rect;
    use crate::scene::BodyDesc;

    use super::*;

    fn floor_world() -> (World, NodeId, NodeId) {
        let mut world = World::new();
        let faller = world
            .create_body(
                world.root(),
                BodyDesc::dynamic()
                    .with_rect(Rect::from_xywh(0.0, 0.0, 10.0, 10.0))
                    .with_mass(10.0)
                    .with_position(DVec2::new(0.0, -100.0)),
            )
            .unwrap();
        let floor = world
            .create_body(
                world.root(),
                BodyDesc::platform(Rect::from_xywh(-500.0, 0.0, 1000.0, 10.0)),
            )
            .unwrap();
        (world, faller, floor)
    }

    #[test]
    fn test_step_requires_metadata() {
        let (mut world, _, _) = floor_world();
        let mut engine = PhysicsEngine::default();
        assert!(matches!(
            engine.step(&mut world, 1.0 / 60.0),
            Err(Error::WorldDetached)
        ));
    }

    #[test]
    fn test_step_rejects_stale_metadata() {
        let (mut world, _, _) = floor_world();
        let mut engine = PhysicsEngine::default();
        engine.update_metadata(&world);
        world
            .create_body(world.root(), BodyDesc::dynamic().with_rect(Rect::from_xywh(0.0, 0.0, 1.0, 1.0)))
            .unwrap();
        assert!(matches!(
            engine.step(&mut world, 1.0 / 60.0),
            Err(Error::StaleMetadata { .. })
        ));
    }

    #[test]
    fn test_zero_frame_time_is_a_noop() {
        let (mut world, faller, _) = floor_world();
        let mut engine = PhysicsEngine::default();
        engine.update_metadata(&world);
        let before = world.position(faller).unwrap();
        engine.step(&mut world, 0.0).unwrap();
        assert_eq!(world.position(faller).unwrap(), before);
    }

    #[test]
    fn test_falling_body_lands_and_stands() {
        let (mut world, faller, floor) = floor_world();
        let mut engine = PhysicsEngine::default();
        engine.update_metadata(&world);

        let dt = 1.0 / 60.0;
        for _ in 0..120 {
            engine.step(&mut world, dt).unwrap();
        }

        assert!(engine.is_standing(faller).unwrap());
        assert_eq!(
            engine.contact(faller, Direction::Down).unwrap(),
            Some(floor)
        );
        // Resting with its bottom edge on the floor's top edge.
        let pos = world.position(faller).unwrap();
        assert!((pos.y + 10.0).abs() < 1e-6, "pos.y = {}", pos.y);
        assert_eq!(world.body(faller).unwrap().velocity.y, 0.0);
    }

    #[test]
    fn test_resting_body_goes_static() {
        let (mut world, faller, _) = floor_world();
        let mut engine = PhysicsEngine::default();
        engine.update_metadata(&world);

        let dt = 1.0 / 60.0;
        for _ in 0..300 {
            engine.step(&mut world, dt).unwrap();
        }

        assert!(engine.is_static(faller).unwrap());
        // A static body keeps its position across further steps.
        let settled = world.position(faller).unwrap();
        for _ in 0..30 {
            engine.step(&mut world, dt).unwrap();
        }
        assert_eq!(world.position(faller).unwrap(), settled);
        // And keeps reporting its resting contact.
        assert!(engine.is_standing(faller).unwrap());
    }

    #[test]
    fn test_rollback_restores_overlapping_pair() {
        // Identical velocities produce no contact, so the pair stays
        // interpenetrated and the rollback pass restores both positions.
        let mut world = World::new();
        let a = world
            .create_body(
                world.root(),
                BodyDesc::dynamic()
                    .with_rect(Rect::from_xywh(0.0, 0.0, 10.0, 10.0))
                    .with_velocity(DVec2::new(30.0, 0.0)),
            )
            .unwrap();
        let b = world
            .create_body(
                world.root(),
                BodyDesc::dynamic()
                    .with_rect(Rect::from_xywh(0.0, 0.0, 10.0, 10.0))
                    .with_position(DVec2::new(6.0, 0.0))
                    .with_velocity(DVec2::new(30.0, 0.0)),
            )
            .unwrap();

        let config = EngineConfig {
            gravity: 0.0,
            air_friction: 0.0,
            rollback_on_overlap: true,
            ..EngineConfig::default()
        };
        let mut engine = PhysicsEngine::new(config);
        engine.update_metadata(&world);
        engine.step(&mut world, 1.0 / 60.0).unwrap();

        assert_eq!(world.position(a).unwrap(), DVec2::ZERO);
        assert_eq!(world.position(b).unwrap(), DVec2::new(6.0, 0.0));
    }

    #[test]
    fn test_sleeper_falls_when_support_is_knocked_away() {
        let mut world = World::new();
        // The stack gets its own floor; the projectile approaches along a
        // separate runway so its sliding contacts cannot hold the stack's
        // static counters down before the hit.
        let floor = world
            .create_body(
                world.root(),
                BodyDesc::platform(Rect::from_xywh(-15.0, 0.0, 55.0, 10.0)),
            )
            .unwrap();
        world
            .create_body(
                world.root(),
                BodyDesc::platform(Rect::from_xywh(-520.0, 0.0, 500.0, 10.0)),
            )
            .unwrap();
        let support = world
            .create_body(
                world.root(),
                BodyDesc::dynamic()
                    .with_rect(Rect::from_xywh(0.0, 0.0, 10.0, 10.0))
                    .with_mass(10.0)
                    .with_hit_recovery_factor(1.0)
                    .with_position(DVec2::new(0.0, -10.0)),
            )
            .unwrap();
        let sleeper = world
            .create_body(
                world.root(),
                BodyDesc::dynamic()
                    .with_rect(Rect::from_xywh(0.0, 0.0, 10.0, 10.0))
                    .with_mass(10.0)
                    .with_position(DVec2::new(0.0, -20.0)),
            )
            .unwrap();
        // Arrives after the stack has gone to sleep and bats the support
        // out sideways with an elastic hit.
        world
            .create_body(
                world.root(),
                BodyDesc::dynamic()
                    .with_rect(Rect::from_xywh(0.0, 0.0, 10.0, 10.0))
                    .with_mass(10.0)
                    .with_hit_recovery_factor(1.0)
                    .with_position(DVec2::new(-520.0, -10.0))
                    .with_velocity(DVec2::new(500.0, 0.0)),
            )
            .unwrap();

        let mut engine = PhysicsEngine::default();
        engine.update_metadata(&world);
        for _ in 0..300 {
            engine.step(&mut world, 1.0 / 60.0).unwrap();
        }

        // The support slid far away and the sleeper dropped onto the floor.
        assert!(world.position(support).unwrap().x > 20.0);
        assert!(engine.is_standing(sleeper).unwrap());
        assert_eq!(
            engine.contact(sleeper, Direction::Down).unwrap(),
            Some(floor)
        );
        let rest = world.position(sleeper).unwrap();
        assert!((rest.y + 10.0).abs() < 1e-6, "rest.y = {}", rest.y);
    }

    #[test]
    fn test_unknown_node_is_rejected() {
        let (world, _, _) = floor_world();
        let mut engine = PhysicsEngine::default();
        engine.update_metadata(&world);
        assert!(matches!(
            engine.is_standing(NodeId(99)),
            Err(Error::NoSuchNode(_))
        ));
    }
}
