//! Geometry kernel: distances, segment intersection, containment and
//! nearest-segment lookup. Everything here is pure.

use kurbo::{Line, Point, Rect, Vec2};

/// Distance from `point` to the closest point of segment `line`.
///
/// A degenerate segment (both ends equal) is treated as a single point.
pub fn point_to_segment_distance(point: Point, line: Line) -> f64 {
    let d = line.p1 - line.p0;
    let len2 = d.hypot2();
    if len2 == 0.0 {
        return point.distance(line.p0);
    }
    let t = ((point - line.p0).dot(d) / len2).clamp(0.0, 1.0);
    point.distance(line.p0 + d * t)
}

/// Returns true if the two closed segments intersect.
///
/// Parallel and collinear segments never count as intersecting.
pub fn segments_intersect(a: Line, b: Line) -> bool {
    let (x1, y1, x2, y2) = (a.p0.x, a.p0.y, a.p1.x, a.p1.y);
    let (x3, y3, x4, y4) = (b.p0.x, b.p0.y, b.p1.x, b.p1.y);

    let denom = (y4 - y3) * (x2 - x1) - (x4 - x3) * (y2 - y1);
    if denom.abs() < f64::EPSILON {
        return false;
    }

    let ua = ((x4 - x3) * (y1 - y3) - (y4 - y3) * (x1 - x3)) / denom;
    let ub = ((x2 - x1) * (y1 - y3) - (y2 - y1) * (x1 - x3)) / denom;

    (0.0..=1.0).contains(&ua) && (0.0..=1.0).contains(&ub)
}

/// Returns true if any consecutive pair of `path` points crosses `line`.
///
/// Paths with fewer than two points cross nothing.
pub fn path_crosses_segment(path: &[Point], line: Line) -> bool {
    path.windows(2)
        .any(|pair| segments_intersect(Line::new(pair[0], pair[1]), line))
}

/// Finds the candidate whose segment lies closest to `point`, if that
/// distance is within `tolerance`. Ties keep the earliest candidate.
pub fn nearest_segment<T>(
    candidates: impl IntoIterator<Item = (T, Line)>,
    point: Point,
    tolerance: f64,
) -> Option<T> {
    let mut best: Option<(T, f64)> = None;
    for (item, line) in candidates {
        let distance = point_to_segment_distance(point, line);
        if distance > tolerance {
            continue;
        }
        if best.as_ref().is_none_or(|(_, d)| distance < *d) {
            best = Some((item, distance));
        }
    }
    best.map(|(item, _)| item)
}

/// Shortens a center-to-center segment so each end stops at the node
/// boundary (half the node size along the segment direction).
pub fn trimmed_segment(from: Point, to: Point, from_size: f64, to_size: f64) -> Line {
    let d = to - from;
    let length = d.hypot();
    if length == 0.0 {
        return Line::new(from, to);
    }
    let unit = d / length;
    Line::new(from + unit * (from_size / 2.0), to - unit * (to_size / 2.0))
}

/// Returns true if `point` lies inside `rect`, edges included.
pub fn rect_contains_point(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// Returns true if `inner` lies entirely inside `outer`, edges included.
pub fn rect_contains_rect(outer: Rect, inner: Rect) -> bool {
    inner.x0 >= outer.x0 && inner.x1 <= outer.x1 && inner.y0 >= outer.y0 && inner.y1 <= outer.y1
}

/// Returns true if the rectangles share at least one point.
pub fn rects_intersect(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

/// Smallest rectangle containing every point, or `None` for no points.
pub fn bounding_rect(points: impl IntoIterator<Item = Point>) -> Option<Rect> {
    points
        .into_iter()
        .map(|p| Rect::from_points(p, p))
        .reduce(|acc, r| acc.union(r))
}

/// Rotates `point` a quarter turn about `center`.
///
/// With y pointing down this is a clockwise turn on screen.
pub fn rotate_quarter_turn(point: Point, center: Point) -> Point {
    let rel: Vec2 = point - center;
    Point::new(center.x - rel.y, center.y + rel.x)
}

/// Manhattan length of a displacement.
pub fn manhattan_length(delta: Vec2) -> f64 {
    delta.x.abs() + delta.y.abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_to_segment_distance_interior() {
        let line = Line::new((0.0, 0.0), (10.0, 0.0));
        let d = point_to_segment_distance(Point::new(5.0, 3.0), line);
        assert!((d - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_point_to_segment_distance_clamps_to_endpoint() {
        let line = Line::new((0.0, 0.0), (10.0, 0.0));
        let d = point_to_segment_distance(Point::new(13.0, 4.0), line);
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_segment_distance() {
        let line = Line::new((2.0, 2.0), (2.0, 2.0));
        let d = point_to_segment_distance(Point::new(5.0, 6.0), line);
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_crossing_segments_intersect() {
        let a = Line::new((0.0, 0.0), (10.0, 10.0));
        let b = Line::new((0.0, 10.0), (10.0, 0.0));
        assert!(segments_intersect(a, b));
    }

    #[test]
    fn test_touching_endpoints_intersect() {
        let a = Line::new((0.0, 0.0), (5.0, 0.0));
        let b = Line::new((5.0, -5.0), (5.0, 5.0));
        assert!(segments_intersect(a, b));
    }

    #[test]
    fn test_parallel_segments_do_not_intersect() {
        let a = Line::new((0.0, 0.0), (10.0, 0.0));
        let b = Line::new((0.0, 1.0), (10.0, 1.0));
        assert!(!segments_intersect(a, b));
        // Collinear overlap is still reported as no intersection.
        let c = Line::new((5.0, 0.0), (15.0, 0.0));
        assert!(!segments_intersect(a, c));
    }

    #[test]
    fn test_disjoint_segments() {
        let a = Line::new((0.0, 0.0), (1.0, 1.0));
        let b = Line::new((3.0, 0.0), (2.0, 1.5));
        assert!(!segments_intersect(a, b));
    }

    #[test]
    fn test_short_path_crosses_nothing() {
        let line = Line::new((0.0, 0.0), (10.0, 0.0));
        assert!(!path_crosses_segment(&[], line));
        assert!(!path_crosses_segment(&[Point::new(5.0, 0.0)], line));
        assert!(path_crosses_segment(
            &[Point::new(5.0, -5.0), Point::new(5.0, 5.0)],
            line
        ));
    }

    #[test]
    fn test_nearest_segment_prefers_closest() {
        let candidates = vec![
            ("far", Line::new((0.0, 4.0), (10.0, 4.0))),
            ("near", Line::new((0.0, 1.0), (10.0, 1.0))),
        ];
        let hit = nearest_segment(candidates.clone(), Point::new(5.0, 0.0), 5.0);
        assert_eq!(hit, Some("near"));
        let miss = nearest_segment(candidates, Point::new(5.0, -10.0), 5.0);
        assert_eq!(miss, None);
    }

    #[test]
    fn test_trimmed_segment() {
        let line = trimmed_segment(Point::new(0.0, 0.0), Point::new(100.0, 0.0), 30.0, 20.0);
        assert!((line.p0.x - 15.0).abs() < f64::EPSILON);
        assert!((line.p1.x - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rect_containment_is_inclusive() {
        let outer = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect_contains_point(outer, Point::new(10.0, 10.0)));
        assert!(rect_contains_rect(outer, Rect::new(0.0, 0.0, 10.0, 5.0)));
        assert!(!rect_contains_rect(outer, Rect::new(5.0, 5.0, 11.0, 6.0)));
        assert!(rects_intersect(outer, Rect::new(10.0, 10.0, 20.0, 20.0)));
        assert!(!rects_intersect(outer, Rect::new(10.5, 0.0, 20.0, 20.0)));
    }

    #[test]
    fn test_bounding_rect() {
        assert!(bounding_rect(Vec::new()).is_none());
        let rect = bounding_rect([Point::new(1.0, 5.0), Point::new(-2.0, 3.0)]).unwrap();
        assert_eq!(rect, Rect::new(-2.0, 3.0, 1.0, 5.0));
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let p = rotate_quarter_turn(Point::new(10.0, 0.0), Point::ZERO);
        assert!((p.x - 0.0).abs() < f64::EPSILON);
        assert!((p.y - 10.0).abs() < f64::EPSILON);
    }
}
