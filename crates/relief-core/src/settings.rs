//! Render settings and tuning parameters.
//!
//! Everything here is deliberately configuration rather than a
//! hardcoded constant at the use site: tolerance and threshold
//! choices are tunable per scene.

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Outline (non-photorealistic feature line) extraction parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineSettings {
    /// Run the outline pass at all.
    pub enabled: bool,
    /// Relative depth step marking a silhouette edge. A pixel is an
    /// outline pixel when a 4-neighbor is farther by more than
    /// `depth_threshold * max(depth, 1)`.
    pub depth_threshold: f64,
    /// Grazing-angle band in radians: pixels whose normal is within
    /// this angle of perpendicular to the view ray are marked.
    pub grazing_threshold: f64,
    /// Stroke color composited over outline pixels.
    pub stroke: Color,
    /// Stroke opacity in `[0, 1]`.
    pub strength: f64,
}

impl Default for OutlineSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            depth_threshold: 0.015,
            grazing_threshold: 0.12,
            stroke: Color::gray(0.05),
            strength: 0.85,
        }
    }
}

/// Top-level render settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Square tile edge in pixels. Tiles are the unit of work
    /// claimed by render workers and of abort/fault granularity.
    pub tile_size: usize,
    /// Number of render worker threads.
    pub workers: usize,
    /// Sub-pixel sample grid side; samples per pixel is the square.
    pub samples_per_axis: usize,
    /// Color written where a ray leaves the terrain without a hit.
    pub background: Color,
    /// Color filling a tile whose shading produced a numerical fault.
    pub sentinel: Color,
    /// Base terrain surface color fed to lighting and draping.
    pub surface_color: Color,
    /// Ambient lighting floor in `[0, 1]`.
    pub ambient: f64,
    /// Relative tolerance below which a patch's quadratic leading
    /// coefficient is treated as zero (numerically planar patch).
    pub planar_tolerance: f64,
    pub outline: OutlineSettings,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            tile_size: 64,
            workers: 4,
            samples_per_axis: 2,
            background: Color::new(0.87, 0.91, 0.96),
            sentinel: Color::new(1.0, 0.0, 1.0),
            surface_color: Color::new(0.78, 0.74, 0.66),
            ambient: 0.15,
            planar_tolerance: 1e-12,
            outline: OutlineSettings::default(),
        }
    }
}
