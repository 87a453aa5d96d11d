//! Vector feature geometry and styling.
//!
//! Features live in the same projected coordinate system as the
//! height field (x = East, y = North, meters). Layers are built once
//! by an external loader and are immutable for the render's lifetime.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use relief_core::Color;

/// Axis-aligned bounding box in the horizontal plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: DVec2,
    pub max: DVec2,
}

impl BoundingBox {
    /// Tightest box around a point sequence. Empty input yields an
    /// inverted box that contains nothing.
    pub fn from_points(points: &[DVec2]) -> Self {
        let mut min = DVec2::splat(f64::INFINITY);
        let mut max = DVec2::splat(f64::NEG_INFINITY);
        for p in points {
            min = min.min(*p);
            max = max.max(*p);
        }
        Self { min, max }
    }

    /// Box grown outward by `amount` on every side.
    pub fn offset(&self, amount: f64) -> Self {
        Self {
            min: self.min - DVec2::splat(amount),
            max: self.max + DVec2::splat(amount),
        }
    }

    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// Style attributes for drawing a feature onto the terrain.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    /// Total stroke width in world units (meters on the ground).
    pub stroke_width: f64,
    pub stroke_color: Color,
    /// Interior fill for polygons; None draws the outline only.
    pub fill_color: Option<Color>,
    /// Width of the smooth antialiasing falloff band outside the
    /// stroke, in world units.
    pub feather: f64,
    /// Overall opacity in `[0, 1]`.
    pub opacity: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            stroke_width: 10.0,
            stroke_color: Color::BLACK,
            fill_color: None,
            feather: 5.0,
            opacity: 1.0,
        }
    }
}

/// Feature geometry: an open polyline or a closed polygon. Polygon
/// point lists need not repeat the first point; the closing edge is
/// implicit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Geometry {
    Polyline(Vec<DVec2>),
    Polygon(Vec<DVec2>),
}

impl Geometry {
    pub fn points(&self) -> &[DVec2] {
        match self {
            Geometry::Polyline(points) | Geometry::Polygon(points) => points,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Geometry::Polygon(_))
    }
}

/// One styled map feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorFeature {
    pub geometry: Geometry,
    pub style: Style,
    bbox: BoundingBox,
}

impl VectorFeature {
    pub fn new(geometry: Geometry, style: Style) -> Self {
        let bbox = BoundingBox::from_points(geometry.points());
        Self {
            geometry,
            style,
            bbox,
        }
    }

    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    /// Horizontal reach of the feature's drawn ink: half the stroke
    /// plus the feather band.
    pub fn paint_radius(&self) -> f64 {
        self.style.stroke_width * 0.5 + self.style.feather
    }
}

/// An ordered set of features sharing a drawing pass. Layers draw in
/// order, later layers on top.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorLayer {
    pub name: String,
    pub features: Vec<VectorFeature>,
}

impl VectorLayer {
    pub fn new(name: impl Into<String>, features: Vec<VectorFeature>) -> Self {
        Self {
            name: name.into(),
            features,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_from_points() {
        let bbox = BoundingBox::from_points(&[
            DVec2::new(3.0, -1.0),
            DVec2::new(-2.0, 4.0),
            DVec2::new(0.0, 0.0),
        ]);
        assert_eq!(bbox.min, DVec2::new(-2.0, -1.0));
        assert_eq!(bbox.max, DVec2::new(3.0, 4.0));
        assert!(bbox.contains(DVec2::ZERO));
        assert!(!bbox.contains(DVec2::new(5.0, 0.0)));
    }

    #[test]
    fn test_bbox_offset() {
        let bbox = BoundingBox::from_points(&[DVec2::ZERO, DVec2::new(1.0, 1.0)]);
        let grown = bbox.offset(2.0);
        assert!(grown.contains(DVec2::new(-1.5, 2.5)));
        assert!(!grown.contains(DVec2::new(-2.5, 0.0)));
    }

    #[test]
    fn test_empty_bbox_contains_nothing() {
        let bbox = BoundingBox::from_points(&[]);
        assert!(!bbox.contains(DVec2::ZERO));
    }

    #[test]
    fn test_paint_radius() {
        let style = Style {
            stroke_width: 8.0,
            feather: 3.0,
            ..Style::default()
        };
        let feature = VectorFeature::new(Geometry::Polyline(vec![DVec2::ZERO, DVec2::X]), style);
        assert_eq!(feature.paint_radius(), 7.0);
    }
}
