use std::fmt;

use glam::DVec2;

/// An axis-aligned rectangle defined by its top-left corner and size.
///
/// The y axis grows downward, so `top` is the smallest y and `bottom` the
/// largest. Sizes are expected to be non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Top-left corner.
    pub position: DVec2,
    /// Width and height.
    pub size: DVec2,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and size.
    #[inline]
    pub const fn new(position: DVec2, size: DVec2) -> Self {
        Self { position, size }
    }

    /// Creates a rectangle from scalar corner and size components.
    #[inline]
    pub const fn from_xywh(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            position: DVec2::new(x, y),
            size: DVec2::new(w, h),
        }
    }

    #[inline]
    pub fn left(self) -> f64 {
        self.position.x
    }

    #[inline]
    pub fn right(self) -> f64 {
        self.position.x + self.size.x
    }

    #[inline]
    pub fn top(self) -> f64 {
        self.position.y
    }

    #[inline]
    pub fn bottom(self) -> f64 {
        self.position.y + self.size.y
    }

    #[inline]
    pub fn width(self) -> f64 {
        self.size.x
    }

    #[inline]
    pub fn height(self) -> f64 {
        self.size.y
    }

    /// Returns the center of the rectangle.
    #[inline]
    pub fn center(self) -> DVec2 {
        self.position + self.size * 0.5
    }

    /// Returns the half-extents (half the size in each dimension).
    #[inline]
    pub fn half_extents(self) -> DVec2 {
        self.size * 0.5
    }

    /// Returns this rectangle shifted by an offset.
    #[inline]
    pub fn translated(self, offset: DVec2) -> Self {
        Self {
            position: self.position + offset,
            size: self.size,
        }
    }

    /// Returns true if the point lies inside or on the boundary.
    #[inline]
    pub fn contains_point(self, point: DVec2) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }

    /// Boundary-inclusive collision test: true when the rectangles touch or
    /// overlap. Used for containment and contact tests.
    #[inline]
    pub fn touches(self, other: Self) -> bool {
        !(other.left() > self.right()
            || other.right() < self.left()
            || other.top() > self.bottom()
            || other.bottom() < self.top())
    }

    /// Strict interior overlap test: true only when the rectangles share
    /// interior area. Mere edge contact does not count, so this detects
    /// actual interpenetration rather than resting contact.
    #[inline]
    pub fn overlaps(self, other: Self) -> bool {
        !(other.left() >= self.right()
            || other.right() <= self.left()
            || other.top() >= self.bottom()
            || other.bottom() <= self.top())
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.left(),
            self.top(),
            self.right(),
            self.bottom()
        )
    }
}
