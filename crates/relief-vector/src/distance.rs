//! Signed distance queries against feature geometry.
//!
//! Distances are computed on demand per query point; nothing is
//! precomputed into a dense field, so memory stays bounded for
//! arbitrarily large coverage areas.

use glam::DVec2;

use crate::feature::Geometry;

/// Segments shorter than this (squared) are treated as degenerate
/// and skipped rather than failing the query.
const DEGENERATE_SEGMENT_SQ: f64 = 1e-24;

/// Distance from `p` to the segment `a`-`b`.
fn segment_distance(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let u = ((p - a).dot(ab) / ab.length_squared()).clamp(0.0, 1.0);
    (a + ab * u - p).length()
}

/// Unsigned distance from `p` to a point chain. `closed` includes
/// the implicit edge from the last point back to the first.
fn chain_distance(p: DVec2, points: &[DVec2], closed: bool) -> f64 {
    if points.is_empty() {
        return f64::INFINITY;
    }
    if points.len() == 1 {
        return (points[0] - p).length();
    }

    let mut minimum = f64::INFINITY;
    let n = points.len();
    let edges = if closed { n } else { n - 1 };
    for i in 0..edges {
        let a = points[i];
        let b = points[(i + 1) % n];
        if (b - a).length_squared() < DEGENERATE_SEGMENT_SQ {
            continue;
        }
        minimum = minimum.min(segment_distance(p, a, b));
    }
    minimum
}

/// Even-odd crossing test. Tolerates self-intersecting rings by
/// treating overlap regions as alternating.
fn point_in_polygon(p: DVec2, points: &[DVec2]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let a = points[i];
        let b = points[j];
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Signed distance from `p` to the feature boundary: unsigned for
/// polylines; for polygons, negative inside and positive outside.
pub fn signed_distance(geometry: &Geometry, p: DVec2) -> f64 {
    match geometry {
        Geometry::Polyline(points) => chain_distance(p, points, false),
        Geometry::Polygon(points) => {
            let d = chain_distance(p, points, true);
            if point_in_polygon(p, points) {
                -d
            } else {
                d
            }
        }
    }
}
