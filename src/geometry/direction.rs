use glam::DVec2;

/// One of the four cardinal contact directions.
///
/// Directions are expressed from the perspective of the body that owns the
/// contact slot: a body resting on a floor holds its support in the `Down`
/// slot, and the floor holds the body in its `Up` slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// The axis a collision resolves along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Direction {
    /// All four directions, in stable slot order.
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Returns the opposite direction.
    #[inline]
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// Returns the axis this direction lies on.
    #[inline]
    pub fn axis(self) -> Axis {
        match self {
            Direction::Left | Direction::Right => Axis::Horizontal,
            Direction::Up | Direction::Down => Axis::Vertical,
        }
    }

    /// Stable index of the contact slot for this direction.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Direction::Left => 0,
            Direction::Right => 1,
            Direction::Up => 2,
            Direction::Down => 3,
        }
    }
}

impl Axis {
    /// Extracts the component of a vector along this axis.
    #[inline]
    pub fn component(self, v: DVec2) -> f64 {
        match self {
            Axis::Horizontal => v.x,
            Axis::Vertical => v.y,
        }
    }

    /// Replaces the component of a vector along this axis.
    #[inline]
    pub fn with_component(self, v: DVec2, value: f64) -> DVec2 {
        match self {
            Axis::Horizontal => DVec2::new(value, v.y),
            Axis::Vertical => DVec2::new(v.x, value),
        }
    }

    /// The perpendicular axis.
    #[inline]
    pub fn other(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposites_are_symmetric() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
        }
    }

    #[test]
    fn test_slot_indices_are_distinct() {
        let mut seen = [false; 4];
        for dir in Direction::ALL {
            assert!(!seen[dir.index()]);
            seen[dir.index()] = true;
        }
    }

    #[test]
    fn test_axis_components() {
        let v = DVec2::new(3.0, -7.0);
        assert_eq!(Axis::Horizontal.component(v), 3.0);
        assert_eq!(Axis::Vertical.component(v), -7.0);
        assert_eq!(
            Axis::Vertical.with_component(v, 2.0),
            DVec2::new(3.0, 2.0)
        );
    }

    #[test]
    fn test_direction_axes() {
        assert_eq!(Direction::Down.axis(), Axis::Vertical);
        assert_eq!(Direction::Right.axis(), Axis::Horizontal);
        assert_eq!(Direction::Up.axis(), Axis::Vertical);
    }
}
