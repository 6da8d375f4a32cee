//! Line-segment geometry for swept collision tests

use glam::DVec2;

/// Intersection point of segments `a1→a2` and `b1→b2`
///
/// Parallel and coincident segments never intersect (the denominator is
/// zero), which also covers zero-length segments. Touching at an endpoint
/// counts as an intersection. The point is taken from the `b` segment's
/// parametrization.
pub fn segments_intersect(a1: DVec2, a2: DVec2, b1: DVec2, b2: DVec2) -> Option<DVec2> {
    let r = a2 - a1;
    let s = b2 - b1;
    let d = r.y * s.x - r.x * s.y;
    if d == 0.0 {
        return None;
    }

    let q = b1 - a1;
    let ua = (q.y * s.x - q.x * s.y) / d;
    let ub = (q.y * r.x - q.x * r.y) / d;

    if (0.0..=1.0).contains(&ua) && (0.0..=1.0).contains(&ub) {
        Some(b1 + s * ub)
    } else {
        None
    }
}

/// Euclidean distance between two points
#[inline]
pub fn distance(p1: DVec2, p2: DVec2) -> f64 {
    ((p1.x - p2.x).powi(2) + (p1.y - p2.y).powi(2)).sqrt()
}
