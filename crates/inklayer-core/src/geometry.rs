//! Geometry helpers shared by the eraser, the store and the renderer.
//!
//! Everything here is a pure function over `kurbo` types. Intersection tests
//! are closed (touching counts as intersecting).

use kurbo::{Point, Rect, Vec2};

/// Default weight of the single Laplacian smoothing pass.
pub const DEFAULT_SMOOTHING_FACTOR: f64 = 0.3;

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    (b - a).hypot()
}

/// Test whether the segment `a → b` touches the circle at `center` with `radius`.
///
/// The segment is parametrized as `a + t·(b - a)` and substituted into the
/// circle equation, giving a quadratic in `t`. The segment intersects when a
/// root lies in `[0, 1]`, or when both roots straddle the segment (the segment
/// lies entirely inside the circle).
pub fn segment_intersects_circle(a: Point, b: Point, center: Point, radius: f64) -> bool {
    let d = b - a;
    let f = a - center;

    let qa = d.hypot2();
    let qc = f.hypot2() - radius * radius;

    if qa < f64::EPSILON {
        // Degenerate segment: a single point
        return qc <= 0.0;
    }

    let qb = 2.0 * f.dot(d);
    let discriminant = qb * qb - 4.0 * qa * qc;
    if discriminant < 0.0 {
        return false;
    }

    let root = discriminant.sqrt();
    let t1 = (-qb - root) / (2.0 * qa);
    let t2 = (-qb + root) / (2.0 * qa);

    if (0.0..=1.0).contains(&t1) || (0.0..=1.0).contains(&t2) {
        return true;
    }

    // Circle swallows the whole segment
    t1 < 0.0 && t2 > 1.0
}

/// Test whether a circle touches an axis-aligned rectangle.
///
/// Uses the closest point of the rectangle to the circle center (per-axis clamp).
pub fn rect_intersects_circle(rect: Rect, center: Point, radius: f64) -> bool {
    let rect = rect.abs();
    let closest = Point::new(
        center.x.clamp(rect.x0, rect.x1),
        center.y.clamp(rect.y0, rect.y1),
    );
    distance(center, closest) <= radius
}

/// Conservative ellipse-vs-circle test.
///
/// Treats the ellipse as its bounding box expanded by the circle radius on each
/// axis, so it reports false positives near the corners of the box.
pub fn ellipse_intersects_circle(ellipse_center: Point, radii: Vec2, center: Point, radius: f64) -> bool {
    (center.x - ellipse_center.x).abs() <= radii.x.abs() + radius
        && (center.y - ellipse_center.y).abs() <= radii.y.abs() + radius
}

/// Test whether any segment of a polyline, or any of its vertices, touches a circle.
pub fn polyline_intersects_circle(points: &[Point], center: Point, radius: f64) -> bool {
    if points.iter().any(|p| distance(*p, center) <= radius) {
        return true;
    }
    points
        .windows(2)
        .any(|w| segment_intersects_circle(w[0], w[1], center, radius))
}

/// Closed overlap test between two rectangles.
///
/// Unlike `Rect::intersect(..).area() > 0.0`, zero-area rectangles (a horizontal
/// line, a single dot) still overlap what they touch.
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    let (a, b) = (a.abs(), b.abs());
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

/// Axis-aligned bounding box of a drag from `start` to `end`.
///
/// The origin is always the top-left corner and the size is never negative,
/// whatever the drag direction.
pub fn rect_from_corners(start: Point, end: Point) -> Rect {
    let min_x = start.x.min(end.x);
    let min_y = start.y.min(end.y);
    let width = (end.x - start.x).abs();
    let height = (end.y - start.y).abs();
    Rect::new(min_x, min_y, min_x + width, min_y + height)
}

/// Bounding box of a point set, or `None` when empty.
pub fn points_bounds(points: impl IntoIterator<Item = Point>) -> Option<Rect> {
    let mut iter = points.into_iter();
    let first = iter.next()?;
    Some(iter.fold(Rect::from_points(first, first), |acc, p| acc.union_pt(p)))
}

/// One pass of Laplacian smoothing over a polyline.
///
/// Every interior point moves towards the midpoint of its neighbours by
/// `factor`; neighbours are read from the input, not from already-smoothed
/// output. The first and last points are copied exactly. Inputs shorter than
/// three points are returned unchanged.
pub fn smooth_polyline(points: &[Point], factor: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut out = Vec::with_capacity(points.len());
    out.push(points[0]);
    for w in points.windows(3) {
        let (prev, cur, next) = (w[0], w[1], w[2]);
        let laplacian = prev.to_vec2() + next.to_vec2() - cur.to_vec2() * 2.0;
        out.push(cur + laplacian * factor);
    }
    out.push(points[points.len() - 1]);
    out
}
