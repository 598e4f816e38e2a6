//! # rigid2d
//!
//! A 2D rigid body physics core for platformer-style games.
//!
//! ## Features
//!
//! - **Swept AABB Collision**: continuous detection over the frame, so fast
//!   bodies never tunnel through thin platforms
//! - **Ordered Resolution**: collisions resolve strictly in time order, with
//!   uninvolved bodies continuing their free flight
//! - **Momentum Exchange**: 1-D restitution with per-body mass and
//!   hit-recovery factors
//! - **Contact Graph**: per-direction touch links, support chains, and a
//!   stand flag for ground queries
//! - **Static Detection**: near-motionless bodies drop out of integration
//!   until a collision wakes them
//! - **Scene Tree**: bodies live on nodes with parent-relative positions
//!
//! The coordinate system is screen-style: x grows right, y grows down, so
//! gravity is +y.
//!
//! ## Quick Start
//!
//! ```rust
//! use rigid2d::prelude::*;
//! use glam::DVec2;
//!
//! // Build the scene: a floor and a falling crate above it.
//! let mut world = World::new();
//! let _floor = world
//!     .create_body(
//!         world.root(),
//!         BodyDesc::platform(Rect::from_xywh(-500.0, 0.0, 1000.0, 20.0)),
//!     )
//!     .unwrap();
//! let crate_body = world
//!     .create_body(
//!         world.root(),
//!         BodyDesc::dynamic()
//!             .with_rect(Rect::from_xywh(0.0, 0.0, 20.0, 20.0))
//!             .with_mass(10.0)
//!             .with_position(DVec2::new(0.0, -200.0)),
//!     )
//!     .unwrap();
//!
//! // Register the bodies and run the simulation loop.
//! let mut engine = PhysicsEngine::default();
//! engine.update_metadata(&world);
//!
//! let dt = 1.0 / 60.0;
//! for _ in 0..120 {
//!     engine.step(&mut world, dt).unwrap();
//! }
//!
//! assert!(engine.is_standing(crate_body).unwrap());
//! ```

mod collision;
mod dynamics;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod scene;

pub use engine::{EngineConfig, PhysicsEngine};
pub use error::Error;
pub use scene::{Body, BodyDesc, NodeId, World};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::engine::{EngineConfig, PhysicsEngine};
    pub use crate::error::Error;
    pub use crate::geometry::{Axis, Direction, Rect};
    pub use crate::scene::{Body, BodyDesc, NodeId, World};
}
