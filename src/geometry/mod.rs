//! Geometry primitives: rectangles and cardinal directions.

mod direction;
mod rect;

pub use direction::{Axis, Direction};
pub use rect::Rect;
