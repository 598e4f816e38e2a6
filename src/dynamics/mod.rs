//! Velocity integration and friction passes.

pub(crate) mod integrator;
