//! The drape engine: styling terrain surface points from vector
//! layers.
//!
//! For a world (x, y) the engine queries signed distance against
//! each feature (bounding-box culled first) and converts it into a
//! blend weight over a configurable feather band, compositing stroke
//! and fill colors over the shaded base color.

use glam::DVec2;

use relief_core::Color;

use crate::distance::signed_distance;
use crate::feature::{VectorFeature, VectorLayer};

/// Smooth 0→1 ramp with zero derivative at both ends.
fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Coverage of a stroke centered on the feature boundary: 1 inside
/// the half-width, falling smoothly to 0 across the feather band.
fn stroke_coverage(boundary_distance: f64, half_width: f64, feather: f64) -> f64 {
    if boundary_distance <= half_width {
        return 1.0;
    }
    if feather <= 0.0 {
        return 0.0;
    }
    1.0 - smoothstep((boundary_distance - half_width) / feather)
}

/// Immutable set of vector layers consulted during shading. Shared
/// read-only by every render worker.
#[derive(Debug, Clone, Default)]
pub struct DrapeEngine {
    layers: Vec<VectorLayer>,
}

impl DrapeEngine {
    pub fn new(layers: Vec<VectorLayer>) -> Self {
        Self { layers }
    }

    pub fn layers(&self) -> &[VectorLayer] {
        &self.layers
    }

    /// Signed distance from `point` to the nearest feature of the
    /// named layer, or None if the layer is absent or empty.
    pub fn layer_distance(&self, name: &str, point: DVec2) -> Option<f64> {
        let layer = self.layers.iter().find(|l| l.name == name)?;
        layer
            .features
            .iter()
            .map(|f| signed_distance(&f.geometry, point))
            .min_by(f64::total_cmp)
    }

    /// Apply every layer's styling to a terrain surface point,
    /// compositing over `base` in layer order.
    pub fn style_at(&self, point: DVec2, base: Color) -> Color {
        let mut color = base;
        for layer in &self.layers {
            for feature in &layer.features {
                color = Self::apply_feature(feature, point, color);
            }
        }
        color
    }

    fn apply_feature(feature: &VectorFeature, point: DVec2, base: Color) -> Color {
        // Cheap rejection before any segment walk.
        if !feature.bbox().offset(feature.paint_radius()).contains(point) {
            return base;
        }

        let style = &feature.style;
        let d = signed_distance(&feature.geometry, point);
        let mut color = base;

        // Fill first, so the stroke draws on top of its own fill.
        if let Some(fill) = style.fill_color {
            // Negative distance is interior; fade the fill out over
            // the feather band just outside the boundary.
            let coverage = stroke_coverage(d.max(0.0), 0.0, style.feather);
            color = color.blend(fill, coverage * style.opacity);
        }

        let coverage = stroke_coverage(d.abs(), style.stroke_width * 0.5, style.feather);
        color.blend(style.stroke_color, coverage * style.opacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{Geometry, Style};

    fn road(stroke_width: f64, feather: f64) -> VectorLayer {
        let style = Style {
            stroke_width,
            stroke_color: Color::WHITE,
            fill_color: None,
            feather,
            opacity: 1.0,
        };
        let line = Geometry::Polyline(vec![DVec2::new(0.0, 0.0), DVec2::new(100.0, 0.0)]);
        VectorLayer::new("roads", vec![VectorFeature::new(line, style)])
    }

    #[test]
    fn test_point_on_stroke_takes_stroke_color() {
        let engine = DrapeEngine::new(vec![road(10.0, 2.0)]);
        let color = engine.style_at(DVec2::new(50.0, 3.0), Color::BLACK);
        assert_eq!(color, Color::WHITE, "3m off-axis is inside a 10m stroke");
    }

    #[test]
    fn test_point_beyond_feather_keeps_base() {
        let engine = DrapeEngine::new(vec![road(10.0, 2.0)]);
        let color = engine.style_at(DVec2::new(50.0, 20.0), Color::BLACK);
        assert_eq!(color, Color::BLACK);
    }

    #[test]
    fn test_feather_band_blends() {
        let engine = DrapeEngine::new(vec![road(10.0, 2.0)]);
        // 6m off-axis: 1m into the 2m feather band.
        let color = engine.style_at(DVec2::new(50.0, 6.0), Color::BLACK);
        assert!(
            color.r > 0.0 && color.r < 1.0,
            "feather band must partially blend, got {color:?}"
        );
    }

    #[test]
    fn test_polygon_fill_inside() {
        let style = Style {
            stroke_width: 0.0,
            stroke_color: Color::BLACK,
            fill_color: Some(Color::new(0.0, 0.0, 1.0)),
            feather: 1.0,
            opacity: 1.0,
        };
        let lake = Geometry::Polygon(vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(40.0, 0.0),
            DVec2::new(40.0, 40.0),
            DVec2::new(0.0, 40.0),
        ]);
        let engine = DrapeEngine::new(vec![VectorLayer::new(
            "lakes",
            vec![VectorFeature::new(lake, style)],
        )]);

        let inside = engine.style_at(DVec2::new(20.0, 20.0), Color::WHITE);
        assert_eq!(inside.b, 1.0);
        assert_eq!(inside.r, 0.0);

        let outside = engine.style_at(DVec2::new(80.0, 20.0), Color::WHITE);
        assert_eq!(outside, Color::WHITE);
    }

    #[test]
    fn test_later_layer_draws_on_top() {
        let mut bottom = road(10.0, 0.0);
        bottom.features[0].style.stroke_color = Color::new(1.0, 0.0, 0.0);
        let mut top = road(10.0, 0.0);
        top.features[0].style.stroke_color = Color::new(0.0, 1.0, 0.0);

        let engine = DrapeEngine::new(vec![bottom, top]);
        let color = engine.style_at(DVec2::new(50.0, 0.0), Color::BLACK);
        assert_eq!(color, Color::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_layer_distance_lookup() {
        let engine = DrapeEngine::new(vec![road(10.0, 2.0)]);
        assert_eq!(engine.layer_distance("roads", DVec2::new(50.0, 4.0)), Some(4.0));
        assert_eq!(engine.layer_distance("rivers", DVec2::ZERO), None);
    }
}
