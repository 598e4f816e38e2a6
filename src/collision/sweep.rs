use glam::DVec2;

use crate::geometry::{Axis, Direction, Rect};

/// Tolerance for swept-time candidates slightly behind "now".
pub(crate) const TIME_EPSILON: f64 = 1e-4;

/// Denominator guard for edge pairs with no relative motion.
const MOTION_EPSILON: f64 = 1e-12;

/// A body's view for the swept test: world-space rectangles plus motion.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SweepBody<'a> {
    pub rects: &'a [Rect],
    pub velocity: DVec2,
    pub movable: bool,
}

/// The earliest contact between two swept bodies.
///
/// `time` is the fraction of the remaining frame slice in `[0, 1)`;
/// `direction` is the cardinal side of body A facing body B.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SweptContact {
    pub time: f64,
    pub direction: Direction,
}

/// Time at which a linearly moving gap closes to zero, or `None` when the
/// edges barely move relative to each other.
#[inline]
fn crossing_time(gap: f64, closing: f64) -> Option<f64> {
    if closing.abs() < MOTION_EPSILON {
        None
    } else {
        Some(gap / closing)
    }
}

/// Computes the earliest collision between two rectangle sweeps over one
/// frame slice of `frame_time` seconds.
///
/// Each of the four edge transitions yields the fractional time at which the
/// edges coincide under the current velocities. An axis only produces a
/// candidate when both of its transition times are non-negative (rectangles
/// separated along that axis, one edge approaching), the velocity components
/// differ, and the perpendicular extents actually overlap at the candidate
/// instant.
fn sweep_rects(
    ra: Rect,
    rb: Rect,
    va: DVec2,
    vb: DVec2,
    skip_vertical: bool,
    frame_time: f64,
) -> Option<(f64, Axis)> {
    // Already interpenetrating: resolve immediately along the axis of
    // minimal penetration, provided there is relative motion to resolve.
    if ra.overlaps(rb) {
        return overlap_axis(ra, rb, va, vb);
    }

    let da = va * frame_time;
    let db = vb * frame_time;

    let mut best: Option<(f64, Axis)> = None;

    if !skip_vertical && (va.y - vb.y).abs() >= MOTION_EPSILON {
        // A-bottom meets B-top, and B-bottom meets A-top.
        let t_down = crossing_time(rb.top() - ra.bottom(), da.y - db.y);
        let t_up = crossing_time(ra.top() - rb.bottom(), db.y - da.y);
        if let Some(t) = axis_candidate(t_down, t_up) {
            if cross_axis_overlap(ra, rb, da, db, t, Axis::Vertical) {
                best = Some((t, Axis::Vertical));
            }
        }
    }

    if (va.x - vb.x).abs() >= MOTION_EPSILON {
        // A-right meets B-left, and B-right meets A-left.
        let t_right = crossing_time(rb.left() - ra.right(), da.x - db.x);
        let t_left = crossing_time(ra.left() - rb.right(), db.x - da.x);
        if let Some(t) = axis_candidate(t_right, t_left) {
            if cross_axis_overlap(ra, rb, da, db, t, Axis::Horizontal) {
                // Horizontal wins only a strictly earlier time.
                let earlier = match best {
                    Some((vt, _)) => t < vt,
                    None => true,
                };
                if earlier {
                    best = Some((t, Axis::Horizontal));
                }
            }
        }
    }

    best.map(|(t, axis)| (t.max(0.0), axis))
}

/// Validates a pair of same-axis transition times and returns the earlier
/// one as the axis candidate.
#[inline]
fn axis_candidate(first: Option<f64>, second: Option<f64>) -> Option<f64> {
    let (t1, t2) = (first?, second?);
    if t1 < -TIME_EPSILON || t2 < -TIME_EPSILON {
        return None;
    }
    let t = t1.min(t2);
    (t < 1.0).then_some(t)
}

/// Verifies that the projected centers overlap within summed half-extents
/// along the axis perpendicular to the collision axis.
#[inline]
fn cross_axis_overlap(ra: Rect, rb: Rect, da: DVec2, db: DVec2, t: f64, axis: Axis) -> bool {
    let ca = ra.center() + da * t;
    let cb = rb.center() + db * t;
    let sum = ra.half_extents() + rb.half_extents();
    match axis {
        Axis::Vertical => (ca.x - cb.x).abs() < sum.x,
        Axis::Horizontal => (ca.y - cb.y).abs() < sum.y,
    }
}

/// Picks the resolution axis for rectangles that already overlap: the axis
/// of minimal penetration along which the relative motion still deepens
/// the overlap. Pairs that are already separating fly apart on their own.
fn overlap_axis(ra: Rect, rb: Rect, va: DVec2, vb: DVec2) -> Option<(f64, Axis)> {
    let pen_x = ra.right().min(rb.right()) - ra.left().max(rb.left());
    let pen_y = ra.bottom().min(rb.bottom()) - ra.top().max(rb.top());

    let order = if pen_x < pen_y {
        [Axis::Horizontal, Axis::Vertical]
    } else {
        [Axis::Vertical, Axis::Horizontal]
    };
    for axis in order {
        let relative = axis.component(va) - axis.component(vb);
        let toward = axis.component(rb.center()) - axis.component(ra.center());
        if relative.abs() >= MOTION_EPSILON && relative * toward > 0.0 {
            return Some((0.0, axis));
        }
    }
    None
}

/// Direction of the contact from A's perspective, derived from the relative
/// rectangle centers along the resolved axis.
fn contact_direction(ra: Rect, rb: Rect, axis: Axis) -> Direction {
    match axis {
        Axis::Horizontal => {
            if ra.center().x <= rb.center().x {
                Direction::Right
            } else {
                Direction::Left
            }
        }
        Axis::Vertical => {
            if ra.center().y <= rb.center().y {
                Direction::Down
            } else {
                Direction::Up
            }
        }
    }
}

/// Earliest contact between two bodies over a frame slice, across every
/// combination of their rectangles. `skip_vertical` suppresses vertical
/// candidates for pairs already resting on each other.
pub(crate) fn sweep_pair(
    a: SweepBody<'_>,
    b: SweepBody<'_>,
    skip_vertical: bool,
    frame_time: f64,
) -> Option<SweptContact> {
    if !a.movable && !b.movable {
        return None;
    }

    let mut best: Option<(f64, Direction)> = None;
    for &ra in a.rects {
        for &rb in b.rects {
            if let Some((t, axis)) =
                sweep_rects(ra, rb, a.velocity, b.velocity, skip_vertical, frame_time)
            {
                let earlier = match best {
                    Some((bt, _)) => t < bt,
                    None => true,
                };
                if earlier {
                    best = Some((t, contact_direction(ra, rb, axis)));
                }
            }
        }
    }

    best.map(|(time, direction)| SweptContact { time, direction })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(rects: &[Rect], velocity: DVec2, movable: bool) -> SweepBody<'_> {
        SweepBody {
            rects,
            velocity,
            movable,
        }
    }

    #[test]
    fn test_head_on_horizontal_time() {
        // A's right edge at 10, B's left edge at 20, closing at 100/s.
        let ra = [Rect::from_xywh(0.0, 0.0, 10.0, 10.0)];
        let rb = [Rect::from_xywh(20.0, 0.0, 10.0, 10.0)];
        let a = body(&ra, DVec2::new(50.0, 0.0), true);
        let b = body(&rb, DVec2::new(-50.0, 0.0), true);

        let contact = sweep_pair(a, b, false, 0.2).unwrap();
        assert!((contact.time - 0.5).abs() < 1e-9);
        assert_eq!(contact.direction, Direction::Right);
    }

    #[test]
    fn test_falling_onto_platform() {
        let ra = [Rect::from_xywh(0.0, -20.0, 10.0, 10.0)];
        let rb = [Rect::from_xywh(-50.0, 0.0, 100.0, 10.0)];
        let a = body(&ra, DVec2::new(0.0, 100.0), true);
        let b = body(&rb, DVec2::ZERO, false);

        // Gap of 10, closing at 100/s over a 0.2 s slice = 20 units.
        let contact = sweep_pair(a, b, false, 0.2).unwrap();
        assert!((contact.time - 0.5).abs() < 1e-9);
        assert_eq!(contact.direction, Direction::Down);
    }

    #[test]
    fn test_identical_velocity_axis_is_discarded() {
        let ra = [Rect::from_xywh(0.0, 0.0, 10.0, 10.0)];
        let rb = [Rect::from_xywh(10.0, 0.0, 10.0, 10.0)];
        // Touching and drifting together: no closing motion anywhere.
        let v = DVec2::new(30.0, 0.0);
        assert!(sweep_pair(body(&ra, v, true), body(&rb, v, true), false, 1.0).is_none());
    }

    #[test]
    fn test_separating_touch_is_not_a_collision() {
        let ra = [Rect::from_xywh(0.0, 0.0, 10.0, 10.0)];
        let rb = [Rect::from_xywh(10.0, 0.0, 10.0, 10.0)];
        let a = body(&ra, DVec2::new(-50.0, 0.0), true);
        let b = body(&rb, DVec2::new(50.0, 0.0), true);

        assert!(sweep_pair(a, b, false, 1.0).is_none());
    }

    #[test]
    fn test_resting_touch_under_gravity_collides_at_zero() {
        let ra = [Rect::from_xywh(0.0, -10.0, 10.0, 10.0)];
        let rb = [Rect::from_xywh(-50.0, 0.0, 100.0, 10.0)];
        let a = body(&ra, DVec2::new(0.0, 5.0), true);
        let b = body(&rb, DVec2::ZERO, false);

        let contact = sweep_pair(a, b, false, 1.0 / 60.0).unwrap();
        assert_eq!(contact.time, 0.0);
        assert_eq!(contact.direction, Direction::Down);
    }

    #[test]
    fn test_skip_vertical_suppresses_resting_redetection() {
        let ra = [Rect::from_xywh(0.0, -10.0, 10.0, 10.0)];
        let rb = [Rect::from_xywh(-50.0, 0.0, 100.0, 10.0)];
        let a = body(&ra, DVec2::new(0.0, 5.0), true);
        let b = body(&rb, DVec2::ZERO, false);

        assert!(sweep_pair(a, b, true, 1.0 / 60.0).is_none());
    }

    #[test]
    fn test_cross_axis_guard_rejects_passing_bodies() {
        // B is far below A; their x extents would cross but never while the
        // y extents overlap.
        let ra = [Rect::from_xywh(0.0, 0.0, 10.0, 10.0)];
        let rb = [Rect::from_xywh(30.0, 100.0, 10.0, 10.0)];
        let a = body(&ra, DVec2::new(100.0, 0.0), true);
        let b = body(&rb, DVec2::new(-100.0, 0.0), true);

        assert!(sweep_pair(a, b, false, 1.0).is_none());
    }

    #[test]
    fn test_immovable_pair_is_skipped() {
        let ra = [Rect::from_xywh(0.0, 0.0, 10.0, 10.0)];
        let rb = [Rect::from_xywh(5.0, 0.0, 10.0, 10.0)];
        let a = body(&ra, DVec2::new(10.0, 0.0), false);
        let b = body(&rb, DVec2::ZERO, false);

        assert!(sweep_pair(a, b, false, 1.0).is_none());
    }

    #[test]
    fn test_overlapping_pair_resolves_immediately() {
        let ra = [Rect::from_xywh(0.0, 0.0, 10.0, 10.0)];
        let rb = [Rect::from_xywh(8.0, 0.0, 10.0, 10.0)];
        let a = body(&ra, DVec2::new(20.0, 0.0), true);
        let b = body(&rb, DVec2::ZERO, false);

        let contact = sweep_pair(a, b, false, 1.0).unwrap();
        assert_eq!(contact.time, 0.0);
        assert_eq!(contact.direction, Direction::Right);
    }

    #[test]
    fn test_overlapping_separating_pair_is_left_alone() {
        // Still interpenetrated but moving apart: no contact, so the pair
        // resolves its own overlap through free flight.
        let ra = [Rect::from_xywh(0.0, 0.0, 10.0, 10.0)];
        let rb = [Rect::from_xywh(8.0, 0.0, 10.0, 10.0)];
        let a = body(&ra, DVec2::new(-20.0, 0.0), true);
        let b = body(&rb, DVec2::ZERO, false);

        assert!(sweep_pair(a, b, false, 1.0).is_none());
    }

    #[test]
    fn test_earliest_rectangle_pair_wins() {
        // Two rectangles on A: the lower one reaches the platform first.
        let ra = [
            Rect::from_xywh(0.0, -40.0, 10.0, 10.0),
            Rect::from_xywh(0.0, -20.0, 10.0, 10.0),
        ];
        let rb = [Rect::from_xywh(-50.0, 0.0, 100.0, 10.0)];
        let a = body(&ra, DVec2::new(0.0, 100.0), true);
        let b = body(&rb, DVec2::ZERO, false);

        let contact = sweep_pair(a, b, false, 1.0).unwrap();
        assert!((contact.time - 0.1).abs() < 1e-9);
    }
}
