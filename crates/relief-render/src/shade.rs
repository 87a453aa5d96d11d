//! Per-sample shading: terrain intersection, lighting, and draping.

use glam::{DVec2, DVec3};

use relief_core::{Color, Ray, RenderSettings};
use relief_terrain::{accel, HeightField};
use relief_vector::DrapeEngine;

/// Everything one sample produces: its color plus the depth/normal
/// values the outline pass consumes.
#[derive(Debug, Clone, Copy)]
pub struct SampleResult {
    pub color: Color,
    pub depth: f64,
    pub normal: DVec3,
}

impl SampleResult {
    fn miss(background: Color) -> Self {
        Self {
            color: background,
            depth: f64::INFINITY,
            normal: DVec3::ZERO,
        }
    }
}

/// Lambertian diffuse term with an ambient floor.
fn lambert(normal: DVec3, light_direction: DVec3, ambient: f64) -> f64 {
    let diffuse = normal.dot(light_direction).max(0.0);
    ambient + (1.0 - ambient) * diffuse
}

/// Trace one camera ray and shade the result. A miss renders the
/// background; a hit gets the lighting term applied to the surface
/// color, then drape styling from the vector layers.
pub fn trace_sample(
    field: &HeightField,
    drape: &DrapeEngine,
    light_direction: DVec3,
    settings: &RenderSettings,
    ray: &Ray,
) -> SampleResult {
    let Some(hit) = accel::intersect_terrain(field, ray, settings.planar_tolerance) else {
        return SampleResult::miss(settings.background);
    };

    let lit = settings.surface_color * lambert(hit.normal, light_direction, settings.ambient);
    let color = drape.style_at(DVec2::new(hit.point.x, hit.point.y), lit);

    SampleResult {
        color,
        depth: hit.t,
        normal: hit.normal,
    }
}
