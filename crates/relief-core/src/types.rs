//! Fundamental geometric types for ray casting.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// A parametric ray in world space (x = East, y = North, z = Up).
///
/// Camera rays carry a normalized direction so `t` measures world
/// distance. The valid interval `[t_min, t_max]` bounds accepted
/// intersections.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: DVec3,
    pub direction: DVec3,
    /// Smallest accepted parametric distance.
    pub t_min: f64,
    /// Largest accepted parametric distance.
    pub t_max: f64,
}

impl Ray {
    /// Ray with the default interval `[0, +inf)`.
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Self {
            origin,
            direction,
            t_min: 0.0,
            t_max: f64::INFINITY,
        }
    }

    /// Ray restricted to an explicit parametric interval.
    pub fn with_interval(origin: DVec3, direction: DVec3, t_min: f64, t_max: f64) -> Self {
        Self {
            origin,
            direction,
            t_min,
            t_max,
        }
    }

    /// Position along the ray at parameter `t`.
    pub fn point_at(&self, t: f64) -> DVec3 {
        self.origin + self.direction * t
    }
}

/// A terrain surface hit. Each ray reports at most one intersection:
/// the one with the globally smallest valid `t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Parametric distance along the ray.
    pub t: f64,
    /// World-space hit point.
    pub point: DVec3,
    /// Unit surface normal at the hit point (z-up for terrain).
    pub normal: DVec3,
    /// Grid cell (col, row) owning the intersected patch.
    pub cell: (usize, usize),
}
