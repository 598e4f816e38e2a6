use glam::DVec2;

use crate::geometry::Rect;

/// Default surface friction factor for bodies that do not override it.
pub const DEFAULT_FRICTION_FACTOR: f64 = 50.0;

/// Default hit-recovery (restitution) factor: 0 is perfectly inelastic,
/// 1 perfectly elastic.
pub const DEFAULT_HIT_RECOVERY_FACTOR: f64 = 0.5;

/// A physical body attached to a scene node.
///
/// The body carries the simulation-facing properties; its position lives on
/// the owning [`Node`](crate::scene::World) so that traversal-only groups
/// and bodies share one transform model. Geometry is a set of local-space
/// rectangles: the body collides when *any* of its rectangles collides.
#[derive(Debug, Clone)]
pub struct Body {
    /// Current velocity in world units per second.
    pub velocity: DVec2,
    /// Mass. Zero-mass movable bodies are handled as equal-mass partners
    /// during resolution.
    pub mass: f64,
    /// Immovable bodies (platforms, walls) never change velocity, but may
    /// carry one to act as moving platforms.
    pub movable: bool,
    /// Surface friction factor, averaged with the partner's on contact.
    pub friction_factor: f64,
    /// Fraction of relative velocity preserved across a collision.
    pub hit_recovery_factor: f64,
    /// Local-space collision rectangles.
    pub geometry: Vec<Rect>,
}

impl Default for Body {
    fn default() -> Self {
        Self {
            velocity: DVec2::ZERO,
            mass: 0.0,
            movable: true,
            friction_factor: DEFAULT_FRICTION_FACTOR,
            hit_recovery_factor: DEFAULT_HIT_RECOVERY_FACTOR,
            geometry: Vec::new(),
        }
    }
}

impl Body {
    /// Returns the speed (velocity magnitude).
    #[inline]
    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }
}

/// Description for creating a body, in builder style.
#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub position: DVec2,
    pub velocity: DVec2,
    pub mass: f64,
    pub movable: bool,
    pub friction_factor: f64,
    pub hit_recovery_factor: f64,
    pub geometry: Vec<Rect>,
    pub name: String,
}

impl Default for BodyDesc {
    fn default() -> Self {
        Self {
            position: DVec2::ZERO,
            velocity: DVec2::ZERO,
            mass: 10.0,
            movable: true,
            friction_factor: DEFAULT_FRICTION_FACTOR,
            hit_recovery_factor: DEFAULT_HIT_RECOVERY_FACTOR,
            geometry: Vec::new(),
            name: String::from("body"),
        }
    }
}

impl BodyDesc {
    /// Creates a description for a movable body.
    pub fn dynamic() -> Self {
        Self::default()
    }

    /// Creates a description for an immovable platform covering the given
    /// world-space rectangle: the node sits at the rectangle's corner and
    /// the geometry is anchored at the local origin.
    pub fn platform(rect: Rect) -> Self {
        Self {
            position: rect.position,
            mass: 0.0,
            movable: false,
            geometry: vec![Rect::new(DVec2::ZERO, rect.size)],
            name: String::from("platform"),
            ..Self::default()
        }
    }

    pub fn with_position(mut self, position: DVec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_velocity(mut self, velocity: DVec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass.max(0.0);
        self
    }

    pub fn with_friction_factor(mut self, factor: f64) -> Self {
        self.friction_factor = factor.max(0.0);
        self
    }

    pub fn with_hit_recovery_factor(mut self, factor: f64) -> Self {
        self.hit_recovery_factor = factor.clamp(0.0, 1.0);
        self
    }

    /// Adds one local-space rectangle to the body's geometry.
    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.geometry.push(rect);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub(crate) fn into_body(self) -> (Body, DVec2, String) {
        let body = Body {
            velocity: self.velocity,
            mass: self.mass,
            movable: self.movable,
            friction_factor: self.friction_factor,
            hit_recovery_factor: self.hit_recovery_factor,
            geometry: self.geometry,
        };
        (body, self.position, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dynamic_defaults() {
        let desc = BodyDesc::dynamic().with_mass(2.0);
        assert!(desc.movable);
        assert_eq!(desc.mass, 2.0);
        assert_eq!(desc.friction_factor, DEFAULT_FRICTION_FACTOR);
        assert_eq!(desc.hit_recovery_factor, DEFAULT_HIT_RECOVERY_FACTOR);
    }

    #[test]
    fn test_platform_anchors_geometry_at_origin() {
        let desc = BodyDesc::platform(Rect::from_xywh(5.0, 10.0, 100.0, 20.0));
        assert!(!desc.movable);
        assert_eq!(desc.position, DVec2::new(5.0, 10.0));
        assert_eq!(desc.geometry.len(), 1);
        assert_eq!(desc.geometry[0], Rect::from_xywh(0.0, 0.0, 100.0, 20.0));
    }

    #[test]
    fn test_hit_recovery_is_clamped() {
        let desc = BodyDesc::dynamic().with_hit_recovery_factor(1.5);
        assert_eq!(desc.hit_recovery_factor, 1.0);
    }

    #[test]
    fn test_mass_never_negative() {
        let desc = BodyDesc::dynamic().with_mass(-3.0);
        assert_eq!(desc.mass, 0.0);
    }
}
