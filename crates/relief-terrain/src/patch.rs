//! Exact ray intersection against a bilinear surface patch.
//!
//! Each finest-level grid cell interpolates its four corner
//! elevations as z(u,v) over the unit square; the surface is ruled,
//! not planar. The intersection follows the "Ray Bilinear Patch
//! Intersections" (2004) formulation: substituting the ray into the
//! patch equation and eliminating u yields a quadratic in v.

use glam::DVec3;
use relief_core::{Intersection, Ray};

/// A bilinear patch spanned by four corner points. `u` runs from
/// `p00` toward `p10`, `v` from `p00` toward `p01`.
#[derive(Debug, Clone, Copy)]
pub struct BilinearPatch {
    p00: DVec3,
    p10: DVec3,
    p01: DVec3,
    p11: DVec3,
}

/// Ray-relative coefficients shared by the quadratic and the
/// u-recovery step.
#[derive(Clone, Copy)]
struct Coefficients {
    a1: f64,
    a2: f64,
    b1: f64,
    b2: f64,
    c1: f64,
    c2: f64,
    d1: f64,
    d2: f64,
}

/// Slack admitted on the unit-square parameter bounds so hits on
/// shared cell edges are not lost to rounding.
const UV_EPSILON: f64 = 1e-9;

impl BilinearPatch {
    pub fn new(p00: DVec3, p10: DVec3, p01: DVec3, p11: DVec3) -> Self {
        Self { p00, p10, p01, p11 }
    }

    /// Patch over a grid cell footprint `[x0, x0+size] x [y0, y0+size]`
    /// with the given corner elevations.
    pub fn from_cell(x0: f64, y0: f64, size: f64, z00: f64, z10: f64, z01: f64, z11: f64) -> Self {
        Self::new(
            DVec3::new(x0, y0, z00),
            DVec3::new(x0 + size, y0, z10),
            DVec3::new(x0, y0 + size, z01),
            DVec3::new(x0 + size, y0 + size, z11),
        )
    }

    /// Surface point at (u, v).
    pub fn position(&self, u: f64, v: f64) -> DVec3 {
        self.p00 * ((1.0 - u) * (1.0 - v))
            + self.p10 * (u * (1.0 - v))
            + self.p01 * ((1.0 - u) * v)
            + self.p11 * (u * v)
    }

    /// Surface tangent along u at the given v.
    fn tangent_u(&self, v: f64) -> DVec3 {
        (self.p10 - self.p00) * (1.0 - v) + (self.p11 - self.p01) * v
    }

    /// Surface tangent along v at the given u.
    fn tangent_v(&self, u: f64) -> DVec3 {
        (self.p01 - self.p00) * (1.0 - u) + (self.p11 - self.p10) * u
    }

    /// Unit normal at (u, v): the partial-derivative cross product,
    /// evaluated at the solved parameters rather than once per cell.
    pub fn normal(&self, u: f64, v: f64) -> DVec3 {
        self.tangent_u(v).cross(self.tangent_v(u)).normalize()
    }

    /// Recover u for a solved v, picking the better-conditioned of
    /// the two available denominators.
    fn compute_u(&self, v: f64, k: Coefficients) -> f64 {
        let denom1 = v * (k.a2 - k.a1) + k.b2 - k.b1;
        let denom2 = v * k.a2 + k.b2;
        if denom1.abs() > denom2.abs() {
            (v * (k.c1 - k.c2) + k.d1 - k.d2) / denom1
        } else {
            -(v * k.c2 + k.d2) / denom2
        }
    }

    /// Parameter along the ray for a surface position. Projection
    /// onto the direction is exact for unit directions and avoids
    /// dividing by near-zero direction components.
    fn compute_t(ray: &Ray, position: DVec3) -> f64 {
        (position - ray.origin).dot(ray.direction) / ray.direction.length_squared()
    }

    /// Real roots of `a v^2 + b v + c = 0` in stable form. A leading
    /// coefficient within `planar_tolerance` of zero (relative to the
    /// other coefficients) means the patch is numerically planar for
    /// this ray and the reduced linear equation is solved instead.
    fn solve_quadratic(a: f64, b: f64, c: f64, planar_tolerance: f64) -> [Option<f64>; 2] {
        let scale = b.abs().max(c.abs());
        if a.abs() <= planar_tolerance * scale.max(1.0) {
            if b == 0.0 {
                return [None, None];
            }
            return [Some(-c / b), None];
        }

        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return [None, None];
        }
        if disc == 0.0 {
            return [Some(-b / (2.0 * a)), None];
        }

        // Numerically stable form: compute the larger-magnitude root
        // first, derive the other from the product of roots.
        let q = -0.5 * (b + b.signum() * disc.sqrt());
        if q == 0.0 {
            return [Some(0.0), None];
        }
        [Some(q / a), Some(c / q)]
    }

    /// Accept a candidate v: recover (u, t), bounds-check everything,
    /// and produce the hit.
    fn accept(&self, ray: &Ray, v: f64, k: Coefficients) -> Option<(f64, f64, f64)> {
        if !(-UV_EPSILON..=1.0 + UV_EPSILON).contains(&v) {
            return None;
        }
        let u = self.compute_u(v, k);
        if !(-UV_EPSILON..=1.0 + UV_EPSILON).contains(&u) {
            return None;
        }
        let u = u.clamp(0.0, 1.0);
        let v = v.clamp(0.0, 1.0);
        let t = Self::compute_t(ray, self.position(u, v));
        if !t.is_finite() || t < ray.t_min || t > ray.t_max {
            return None;
        }
        Some((t, u, v))
    }

    /// Closest valid intersection of the ray with the patch, or None.
    ///
    /// Of two valid roots only the smaller t is reported; the far
    /// root is the backside of the single-sided surface.
    pub fn intersect(&self, ray: &Ray, planar_tolerance: f64) -> Option<Intersection> {
        let a = self.p11 - self.p10 - self.p01 + self.p00;
        let b = self.p10 - self.p00;
        let c = self.p01 - self.p00;
        let d = self.p00 - ray.origin;
        let dir = ray.direction;

        // Two independent linear functionals that annihilate the ray
        // direction, chosen around its dominant component so the
        // system stays well-conditioned for any orientation.
        let (i1, j1, i2, j2) = if dir.z.abs() >= dir.x.abs() && dir.z.abs() >= dir.y.abs() {
            (0, 2, 1, 2)
        } else if dir.x.abs() >= dir.y.abs() {
            (1, 0, 2, 0)
        } else {
            (0, 1, 2, 1)
        };
        let proj = |w: DVec3, i: usize, j: usize| w[i] * dir[j] - w[j] * dir[i];

        let k = Coefficients {
            a1: proj(a, i1, j1),
            a2: proj(a, i2, j2),
            b1: proj(b, i1, j1),
            b2: proj(b, i2, j2),
            c1: proj(c, i1, j1),
            c2: proj(c, i2, j2),
            d1: proj(d, i1, j1),
            d2: proj(d, i2, j2),
        };

        let qa = k.a2 * k.c1 - k.a1 * k.c2;
        let qb = k.a2 * k.d1 - k.a1 * k.d2 + k.b2 * k.c1 - k.b1 * k.c2;
        let qc = k.b2 * k.d1 - k.b1 * k.d2;

        let mut best: Option<(f64, f64, f64)> = None;
        for root in Self::solve_quadratic(qa, qb, qc, planar_tolerance)
            .into_iter()
            .flatten()
        {
            if let Some(hit) = self.accept(ray, root, k) {
                if best.is_none_or(|(bt, _, _)| hit.0 < bt) {
                    best = Some(hit);
                }
            }
        }

        best.map(|(t, u, v)| Intersection {
            t,
            point: ray.point_at(t),
            normal: self.normal(u, v),
            cell: (0, 0),
        })
    }
}
