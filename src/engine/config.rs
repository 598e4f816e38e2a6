use serde::{Deserialize, Serialize};

/// Tuning parameters for the physics engine.
///
/// The defaults are calibrated for a platformer world measured in pixels
/// at 60 simulated frames per second.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Gravitational acceleration, applied along +y (downward).
    pub gravity: f64,
    /// Air friction deceleration, opposing the full velocity vector.
    pub air_friction: f64,
    /// Speed cap. Velocities are clamped to this magnitude after
    /// integration, preserving direction.
    pub max_speed: f64,
    /// Displacement threshold for static detection. A body whose frame
    /// displacement and projected travel both stay below this for
    /// `static_frame_threshold` consecutive frames is marked static.
    pub min_distance: f64,
    /// Consecutive near-motionless frames before a body counts as static.
    pub static_frame_threshold: usize,
    /// Collision passes allowed per body per frame. The loop cap is this
    /// times the body count, floored at 16.
    pub max_passes_per_body: usize,
    /// When set, bodies still interpenetrating after resolution are rolled
    /// back to their frame-start positions instead of just being logged.
    pub rollback_on_overlap: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            gravity: 2000.0,
            air_friction: 50.0,
            max_speed: 5000.0,
            min_distance: 0.1,
            static_frame_threshold: 50,
            max_passes_per_body: 4,
            rollback_on_overlap: false,
        }
    }
}

impl EngineConfig {
    pub(crate) fn pass_cap(&self, num_bodies: usize) -> usize {
        (self.max_passes_per_body * num_bodies).max(16)
    }
}
