//! Renderer: parallel tile orchestration.
//!
//! The height field, vector layers, camera and settings are built
//! once and shared read-only by a fixed pool of worker threads.
//! Workers claim tiles from an atomic counter, render into a
//! thread-local tile buffer, and blit the finished tile into the
//! shared framebuffer. No hot-path I/O, no locking beyond the blit.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use glam::DVec3;

use relief_core::RenderSettings;
use relief_terrain::HeightField;
use relief_vector::DrapeEngine;

use crate::camera::Camera;
use crate::framebuffer::{tiles, Framebuffer, Tile, TileBuffer};
use crate::outline::OutlineExtractor;
use crate::sampler::RegularGridSampler;
use crate::shade::{trace_sample, SampleResult};

/// An offline terrain render job. Everything here is immutable for
/// the render's lifetime; per-pixel state is stack-scoped inside the
/// workers.
pub struct Renderer {
    field: HeightField,
    drape: DrapeEngine,
    camera: Camera,
    light_direction: DVec3,
    settings: RenderSettings,
}

impl Renderer {
    pub fn new(
        field: HeightField,
        drape: DrapeEngine,
        camera: Camera,
        light_direction: DVec3,
        settings: RenderSettings,
    ) -> Self {
        Self {
            field,
            drape,
            camera,
            light_direction: light_direction.normalize(),
            settings,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Shade one pixel: average the sub-sample colors; depth and
    /// normal come from the nearest sub-sample so the outline pass
    /// sees the occluding surface.
    fn pixel(&self, x: usize, y: usize, sampler: &RegularGridSampler) -> SampleResult {
        let weight = 1.0 / sampler.amount() as f64;
        let mut color = relief_core::Color::BLACK;
        let mut nearest = SampleResult {
            color,
            depth: f64::INFINITY,
            normal: DVec3::ZERO,
        };

        for &(sx, sy) in sampler.offsets() {
            let ray = self.camera.cast_ray(x as f64 + sx, y as f64 + sy);
            let sample = trace_sample(
                &self.field,
                &self.drape,
                self.light_direction,
                &self.settings,
                &ray,
            );
            color = color + sample.color * weight;
            if sample.depth < nearest.depth {
                nearest = sample;
            }
        }

        SampleResult {
            color,
            depth: nearest.depth,
            normal: nearest.normal,
        }
    }

    /// Render one tile into a local buffer. A numerical fault
    /// anywhere in the tile is contained: the tile is filled with
    /// the sentinel color and the render carries on.
    fn render_tile(&self, tile: Tile, sampler: &RegularGridSampler) -> TileBuffer {
        let mut buf = TileBuffer::new(tile);
        for row in 0..tile.height {
            for col in 0..tile.width {
                let result = self.pixel(tile.x + col, tile.y + row, sampler);
                if !result.color.is_finite() {
                    log::warn!(
                        "numerical fault in tile at ({}, {}); filling with sentinel color",
                        tile.x,
                        tile.y
                    );
                    buf.fill(self.settings.sentinel);
                    return buf;
                }
                buf.set(col, row, result.color, result.depth, result.normal);
            }
        }
        buf
    }

    /// Render the full image.
    pub fn render(&self) -> Framebuffer {
        self.render_with_abort(&AtomicBool::new(false))
    }

    /// Render with a cooperative abort flag. The flag is checked at
    /// tile claims only, so in-flight tiles complete and no tile is
    /// ever torn mid-write. An aborted render returns the partial
    /// framebuffer (remaining tiles keep the background color).
    pub fn render_with_abort(&self, abort: &AtomicBool) -> Framebuffer {
        let width = self.camera.width();
        let height = self.camera.height();
        let work: Vec<Tile> = tiles(width, height, self.settings.tile_size);
        let next = AtomicUsize::new(0);
        let shared = Mutex::new(Framebuffer::new(width, height, self.settings.background));
        let sampler = RegularGridSampler::new(self.settings.samples_per_axis);
        let workers = self.settings.workers.max(1);

        log::debug!(
            "rendering {}x{} in {} tiles with {} workers",
            width,
            height,
            work.len(),
            workers
        );

        std::thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| loop {
                    if abort.load(Ordering::Relaxed) {
                        break;
                    }
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    let Some(&tile) = work.get(index) else {
                        break;
                    };
                    let buf = self.render_tile(tile, &sampler);
                    shared.lock().unwrap().blit(&buf);
                });
            }
        });

        let mut fb = shared.into_inner().unwrap();

        // The outline pass needs the complete depth/normal planes;
        // the scope join above is its barrier.
        if !abort.load(Ordering::Relaxed) {
            OutlineExtractor::new(self.settings.outline.clone()).apply(&mut fb, &self.camera);
        }
        fb
    }
}
