//! Scene tree: an arena of group and body nodes with parent links used for
//! world-space position accumulation.

mod body;
mod world;

pub use body::{Body, BodyDesc, DEFAULT_FRICTION_FACTOR, DEFAULT_HIT_RECOVERY_FACTOR};
pub use world::{NodeId, World};
