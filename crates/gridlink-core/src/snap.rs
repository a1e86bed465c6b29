//! Grid snapping for node placement.

use kurbo::{Point, Vec2};

/// Default grid spacing (half the default distance between grid nodes).
pub const GRID_SPACING: f64 = 25.0;

/// Snap a point to the nearest grid intersection.
///
/// Non-positive spacing leaves the point untouched.
pub fn snap_to_grid(point: Point, spacing: f64) -> Point {
    if spacing <= 0.0 {
        return point;
    }
    Point::new(
        (point.x / spacing).round() * spacing,
        (point.y / spacing).round() * spacing,
    )
}

/// Adjust a drag displacement so that `reference + delta` lands on the grid.
///
/// Applying the returned delta to a whole set of nodes keeps their relative
/// layout while the reference node snaps.
pub fn snap_delta(reference: Point, delta: Vec2, spacing: f64) -> Vec2 {
    snap_to_grid(reference + delta, spacing) - reference
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_to_grid() {
        let p = snap_to_grid(Point::new(37.0, 12.0), GRID_SPACING);
        assert!((p.x - 25.0).abs() < f64::EPSILON);
        assert!((p.y - 0.0).abs() < f64::EPSILON);

        let p = snap_to_grid(Point::new(38.0, 13.0), GRID_SPACING);
        assert!((p.x - 50.0).abs() < f64::EPSILON);
        assert!((p.y - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_spacing_is_identity() {
        let p = Point::new(3.3, 4.4);
        assert_eq!(snap_to_grid(p, 0.0), p);
    }

    #[test]
    fn test_snap_delta_moves_reference_onto_grid() {
        let reference = Point::new(100.0, 100.0);
        let delta = snap_delta(reference, Vec2::new(13.0, -11.0), GRID_SPACING);
        assert_eq!(reference + delta, Point::new(125.0, 100.0));
    }
}
