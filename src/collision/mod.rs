//! Swept collision detection and ordered event resolution.

pub(crate) mod resolver;
pub(crate) mod sweep;
