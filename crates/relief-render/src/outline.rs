//! Outline extraction: screen-space feature lines from depth and
//! normal discontinuities.
//!
//! Runs strictly after all tile workers have finished. The pass
//! reads the depth/normal planes, never rewrites them, and
//! composites a darkened stroke into the color plane only.

use relief_core::OutlineSettings;

use crate::camera::Camera;
use crate::framebuffer::Framebuffer;

/// Feature-line detector over a completed framebuffer.
#[derive(Debug, Clone)]
pub struct OutlineExtractor {
    settings: OutlineSettings,
}

impl OutlineExtractor {
    pub fn new(settings: OutlineSettings) -> Self {
        Self { settings }
    }

    /// Outline mask: true where a pixel lies on a silhouette or
    /// grazing-angle feature line.
    ///
    /// Silhouettes are attributed to the nearer surface: a pixel is
    /// marked when a 4-neighbor is *farther* by more than the
    /// depth-proportional threshold, which keeps the stroke one
    /// pixel wide instead of marking both sides of the edge.
    pub fn mask(&self, fb: &Framebuffer, camera: &Camera) -> Vec<bool> {
        let width = fb.width();
        let height = fb.height();
        let mut mask = vec![false; width * height];

        for y in 0..height {
            for x in 0..width {
                let depth = fb.depth(x, y);
                if !depth.is_finite() {
                    continue;
                }

                // (a) depth discontinuity against any 4-neighbor.
                let limit = self.settings.depth_threshold * depth.max(1.0);
                let mut edge = false;
                for (nx, ny) in neighbors4(x, y, width, height) {
                    let neighbor = fb.depth(nx, ny);
                    // An infinite neighbor is the terrain/background
                    // silhouette; otherwise compare the depth step.
                    if neighbor - depth > limit {
                        edge = true;
                        break;
                    }
                }

                // (b) grazing view angle: normal nearly perpendicular
                // to the view ray.
                if !edge {
                    let view = camera.cast_ray(x as f64 + 0.5, y as f64 + 0.5).direction;
                    let normal = fb.normal(x, y);
                    if normal != glam::DVec3::ZERO {
                        let cos = normal.dot(view).abs();
                        edge = cos < self.settings.grazing_threshold.sin();
                    }
                }

                mask[y * width + x] = edge;
            }
        }

        mask
    }

    /// Composite the outline stroke over the shaded color plane.
    pub fn apply(&self, fb: &mut Framebuffer, camera: &Camera) {
        if !self.settings.enabled {
            return;
        }
        let mask = self.mask(fb, camera);
        let width = fb.width();
        for y in 0..fb.height() {
            for x in 0..width {
                if mask[y * width + x] {
                    let shaded = fb.color(x, y);
                    fb.set_color(x, y, shaded.blend(self.settings.stroke, self.settings.strength));
                }
            }
        }
    }
}

/// In-bounds 4-neighborhood of a pixel.
fn neighbors4(
    x: usize,
    y: usize,
    width: usize,
    height: usize,
) -> impl Iterator<Item = (usize, usize)> {
    let mut out = [(0usize, 0usize); 4];
    let mut n = 0;
    if x > 0 {
        out[n] = (x - 1, y);
        n += 1;
    }
    if x + 1 < width {
        out[n] = (x + 1, y);
        n += 1;
    }
    if y > 0 {
        out[n] = (x, y - 1);
        n += 1;
    }
    if y + 1 < height {
        out[n] = (x, y + 1);
        n += 1;
    }
    out.into_iter().take(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;
    use relief_core::Color;

    use crate::camera::{Camera, CameraPose, Projection};
    use crate::framebuffer::{Tile, TileBuffer};

    fn top_down_camera(size: usize) -> Camera {
        let pose = CameraPose::new(
            DVec3::new(0.0, 0.0, 100.0),
            DVec3::new(0.0, 0.0, 0.0),
        );
        Camera::new(
            size,
            size,
            pose,
            Projection::Orthographic {
                half_extent: size as f64 / 2.0,
            },
        )
        .unwrap()
    }

    /// A framebuffer where columns left of `split` sit at depth
    /// `left` and the rest at `right`, all normals straight up.
    fn step_buffer(size: usize, split: usize, left: f64, right: f64) -> Framebuffer {
        let mut fb = Framebuffer::new(size, size, Color::BLACK);
        let mut buf = TileBuffer::new(Tile {
            x: 0,
            y: 0,
            width: size,
            height: size,
        });
        for y in 0..size {
            for x in 0..size {
                let depth = if x < split { left } else { right };
                buf.set(x, y, Color::gray(0.5), depth, DVec3::Z);
            }
        }
        fb.blit(&buf);
        fb
    }

    /// A step discontinuity marks an outline exactly at the border
    /// column, on the nearer side.
    #[test]
    fn test_depth_step_marks_border_column() {
        let size = 16;
        let split = 8;
        // Left half at depth 100, right half at 50.
        let fb = step_buffer(size, split, 100.0, 50.0);
        let camera = top_down_camera(size);
        let extractor = OutlineExtractor::new(OutlineSettings::default());
        let mask = extractor.mask(&fb, &camera);

        for y in 0..size {
            for x in 0..size {
                let expected = x == split;
                assert_eq!(
                    mask[y * size + x],
                    expected,
                    "pixel ({x},{y}) outline mark mismatch"
                );
            }
        }
    }

    #[test]
    fn test_uniform_depth_marks_nothing() {
        let size = 8;
        let fb = step_buffer(size, 0, 60.0, 60.0);
        let camera = top_down_camera(size);
        let extractor = OutlineExtractor::new(OutlineSettings::default());
        assert!(extractor.mask(&fb, &camera).iter().all(|m| !m));
    }

    #[test]
    fn test_grazing_normal_marks_pixel() {
        let size = 8;
        let mut fb = Framebuffer::new(size, size, Color::BLACK);
        let mut buf = TileBuffer::new(Tile {
            x: 0,
            y: 0,
            width: size,
            height: size,
        });
        for y in 0..size {
            for x in 0..size {
                // One pixel's normal is almost perpendicular to the
                // vertical view rays.
                let normal = if (x, y) == (4, 4) {
                    DVec3::new(1.0, 0.0, 0.02).normalize()
                } else {
                    DVec3::Z
                };
                buf.set(x, y, Color::gray(0.5), 60.0, normal);
            }
        }
        fb.blit(&buf);

        let camera = top_down_camera(size);
        let extractor = OutlineExtractor::new(OutlineSettings::default());
        let mask = extractor.mask(&fb, &camera);
        assert!(mask[4 * size + 4], "grazing normal must be marked");
        assert!(!mask[4 * size + 5]);
    }

    #[test]
    fn test_apply_darkens_only_marked_pixels() {
        let size = 16;
        let fb0 = step_buffer(size, 8, 100.0, 50.0);
        let mut fb = fb0.clone();
        let camera = top_down_camera(size);
        let extractor = OutlineExtractor::new(OutlineSettings::default());
        extractor.apply(&mut fb, &camera);

        let marked = fb.color(8, 4);
        let unmarked = fb.color(2, 4);
        assert!(marked.r < 0.5, "outline pixel must darken");
        assert_eq!(unmarked, Color::gray(0.5));
        // Depth and normal inputs are never rewritten.
        assert_eq!(fb.depth(8, 4), fb0.depth(8, 4));
        assert_eq!(fb.normal(8, 4), fb0.normal(8, 4));
    }

    #[test]
    fn test_disabled_pass_is_noop() {
        let size = 8;
        let fb0 = step_buffer(size, 4, 100.0, 50.0);
        let mut fb = fb0.clone();
        let camera = top_down_camera(size);
        let extractor = OutlineExtractor::new(OutlineSettings {
            enabled: false,
            ..OutlineSettings::default()
        });
        extractor.apply(&mut fb, &camera);
        for y in 0..size {
            for x in 0..size {
                assert_eq!(fb.color(x, y), fb0.color(x, y));
            }
        }
    }
}
