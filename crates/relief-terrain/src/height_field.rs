//! HeightField: elevation grid with a min/max mipmap pyramid.
//!
//! The grid stores elevation samples; the surface between four
//! neighboring samples is a bilinear patch, so a grid of `w`×`h`
//! samples carries `(w-1)`×`(h-1)` surface cells. The pyramid stores
//! per-cell `[min, max]` elevation intervals at every resolution and
//! is what lets ray traversal skip empty space.

use glam::DVec2;
use relief_core::RenderError;

/// One pyramid level of `[min, max]` elevation intervals per cell.
#[derive(Debug, Clone)]
struct PyramidLevel {
    cells_x: usize,
    cells_y: usize,
    data: Vec<(f64, f64)>,
}

impl PyramidLevel {
    /// Range query with boundary clamping (duplicated-boundary
    /// padding for non-power-of-two grids).
    fn range(&self, col: usize, row: usize) -> (f64, f64) {
        let c = col.min(self.cells_x - 1);
        let r = row.min(self.cells_y - 1);
        self.data[r * self.cells_x + c]
    }
}

/// Regular elevation grid in a projected coordinate system.
///
/// World frame: x = East, y = North, z = Up (meters). Sample
/// `(col, row)` sits at `origin + (col, row) * cell_size`, so row 0
/// is the southern edge. Immutable once built; shared read-only by
/// all render workers.
#[derive(Debug, Clone)]
pub struct HeightField {
    width: usize,
    height: usize,
    cell_size: f64,
    origin: DVec2,
    samples: Vec<f64>,
    pyramid: Vec<PyramidLevel>,
}

impl HeightField {
    /// Build a height field and its pyramid from row-major samples.
    ///
    /// Fails with `InvalidGrid` if either dimension is below 2 (no
    /// surface cell can form) or the sample count does not match.
    pub fn new(
        width: usize,
        height: usize,
        cell_size: f64,
        origin: DVec2,
        samples: Vec<f64>,
    ) -> Result<Self, RenderError> {
        if width < 2 || height < 2 {
            return Err(RenderError::InvalidGrid {
                width,
                height,
                reason: "both dimensions must be at least 2".into(),
            });
        }
        if samples.len() != width * height {
            return Err(RenderError::InvalidGrid {
                width,
                height,
                reason: format!("expected {} samples, got {}", width * height, samples.len()),
            });
        }
        if !(cell_size > 0.0) {
            return Err(RenderError::InvalidGrid {
                width,
                height,
                reason: format!("cell size must be positive, got {cell_size}"),
            });
        }

        let mut field = Self {
            width,
            height,
            cell_size,
            origin,
            samples,
            pyramid: Vec::new(),
        };
        field.build_pyramid();
        log::debug!(
            "height field {}x{} samples, {} pyramid levels",
            width,
            height,
            field.pyramid.len()
        );
        Ok(field)
    }

    /// Bottom-up pyramid build. Level 0 holds the per-cell min/max of
    /// the four corner samples; level k+1 cell (i,j) aggregates level
    /// k cells (2i,2j)..(2i+1,2j+1) component-wise, clamping child
    /// indices at the boundary so odd level sizes halve cleanly.
    fn build_pyramid(&mut self) {
        let cells_x = self.width - 1;
        let cells_y = self.height - 1;

        let mut base = PyramidLevel {
            cells_x,
            cells_y,
            data: Vec::with_capacity(cells_x * cells_y),
        };
        for row in 0..cells_y {
            for col in 0..cells_x {
                let (z00, z10, z01, z11) = self.cell_corners(col, row);
                let min = z00.min(z10).min(z01).min(z11);
                let max = z00.max(z10).max(z01).max(z11);
                base.data.push((min, max));
            }
        }
        self.pyramid.push(base);

        while {
            let top = self.pyramid.last().unwrap();
            top.cells_x > 1 || top.cells_y > 1
        } {
            let prev = self.pyramid.last().unwrap();
            let cells_x = prev.cells_x.div_ceil(2);
            let cells_y = prev.cells_y.div_ceil(2);
            let mut level = PyramidLevel {
                cells_x,
                cells_y,
                data: Vec::with_capacity(cells_x * cells_y),
            };
            for row in 0..cells_y {
                for col in 0..cells_x {
                    let mut min = f64::INFINITY;
                    let mut max = f64::NEG_INFINITY;
                    for (dc, dr) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                        let (lo, hi) = prev.range(2 * col + dc, 2 * row + dr);
                        min = min.min(lo);
                        max = max.max(hi);
                    }
                    level.data.push((min, max));
                }
            }
            self.pyramid.push(level);
        }
    }

    /// Samples per row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Surface cells along x.
    pub fn cells_x(&self) -> usize {
        self.width - 1
    }

    /// Surface cells along y.
    pub fn cells_y(&self) -> usize {
        self.height - 1
    }

    /// World-space edge length of one cell (meters).
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// World position of sample (0, 0) (south-west corner).
    pub fn origin(&self) -> DVec2 {
        self.origin
    }

    /// Number of pyramid levels, including the finest level 0.
    pub fn num_levels(&self) -> usize {
        self.pyramid.len()
    }

    /// Cell counts (x, y) at a pyramid level.
    pub fn level_cells(&self, level: usize) -> (usize, usize) {
        let l = &self.pyramid[level];
        (l.cells_x, l.cells_y)
    }

    /// O(1) `[min, max]` elevation interval for a (level, cell) pair.
    /// Out-of-range cell indices clamp to the boundary.
    pub fn range(&self, level: usize, col: usize, row: usize) -> (f64, f64) {
        self.pyramid[level].range(col, row)
    }

    /// Global elevation bounds from the pyramid apex.
    pub fn elevation_bounds(&self) -> (f64, f64) {
        self.pyramid.last().unwrap().range(0, 0)
    }

    /// Raw sample with boundary clamping.
    pub fn sample(&self, col: usize, row: usize) -> f64 {
        let c = col.min(self.width - 1);
        let r = row.min(self.height - 1);
        self.samples[r * self.width + c]
    }

    /// Corner elevations of cell (col, row) as (z00, z10, z01, z11),
    /// where the first index runs along +x and the second along +y.
    pub fn cell_corners(&self, col: usize, row: usize) -> (f64, f64, f64, f64) {
        (
            self.sample(col, row),
            self.sample(col + 1, row),
            self.sample(col, row + 1),
            self.sample(col + 1, row + 1),
        )
    }

    /// World (x, y) to fractional raster (col, row).
    pub fn world_to_raster(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.origin.x) / self.cell_size,
            (y - self.origin.y) / self.cell_size,
        )
    }

    /// Fractional raster (col, row) back to world (x, y).
    pub fn raster_to_world(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.origin.x + col * self.cell_size,
            self.origin.y + row * self.cell_size,
        )
    }

    /// Bilinearly interpolated elevation at a world (x, y).
    /// Returns None outside the grid's horizontal extent.
    pub fn elevation_at(&self, x: f64, y: f64) -> Option<f64> {
        let (col, row) = self.world_to_raster(x, y);
        if col < 0.0 || row < 0.0 || col > self.cells_x() as f64 || row > self.cells_y() as f64 {
            return None;
        }
        Some(self.bilinear(col, row))
    }

    /// Bilinear interpolation at a fractional raster position.
    fn bilinear(&self, col: f64, row: f64) -> f64 {
        let c0 = (col.floor() as usize).min(self.width - 2);
        let r0 = (row.floor() as usize).min(self.height - 2);
        let fc = col - c0 as f64;
        let fr = row - r0 as f64;

        let z00 = self.sample(c0, r0);
        let z10 = self.sample(c0 + 1, r0);
        let z01 = self.sample(c0, r0 + 1);
        let z11 = self.sample(c0 + 1, r0 + 1);

        let south = z00 * (1.0 - fc) + z10 * fc;
        let north = z01 * (1.0 - fc) + z11 * fc;
        south * (1.0 - fr) + north * fr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn make_field(width: usize, height: usize, samples: Vec<f64>) -> HeightField {
        HeightField::new(width, height, 1.0, DVec2::ZERO, samples).unwrap()
    }

    #[test]
    fn test_invalid_grid_dimensions() {
        let err = HeightField::new(1, 5, 1.0, DVec2::ZERO, vec![0.0; 5]);
        assert!(matches!(err, Err(RenderError::InvalidGrid { .. })));
        let err = HeightField::new(5, 0, 1.0, DVec2::ZERO, vec![]);
        assert!(matches!(err, Err(RenderError::InvalidGrid { .. })));
    }

    #[test]
    fn test_invalid_sample_count() {
        let err = HeightField::new(3, 3, 1.0, DVec2::ZERO, vec![0.0; 8]);
        assert!(matches!(err, Err(RenderError::InvalidGrid { .. })));
    }

    #[test]
    fn test_bilinear_interpolation() {
        #[rustfmt::skip]
        let field = make_field(3, 3, vec![
            0.0, 0.0, 0.0,
            0.0, 4.0, 0.0,
            0.0, 0.0, 0.0,
        ]);
        // At the center sample itself.
        assert_eq!(field.elevation_at(1.0, 1.0), Some(4.0));
        // Halfway between center (4) and an edge sample (0).
        assert_eq!(field.elevation_at(1.0, 0.5), Some(2.0));
        // Outside the horizontal extent.
        assert_eq!(field.elevation_at(5.0, 1.0), None);
        assert_eq!(field.elevation_at(-0.1, 1.0), None);
    }

    #[test]
    fn test_world_raster_roundtrip() {
        let field = HeightField::new(
            4,
            4,
            30.0,
            DVec2::new(500_000.0, 4_200_000.0),
            vec![0.0; 16],
        )
        .unwrap();
        let (col, row) = field.world_to_raster(500_060.0, 4_200_090.0);
        assert_eq!((col, row), (2.0, 3.0));
        assert_eq!(field.raster_to_world(col, row), (500_060.0, 4_200_090.0));
    }

    #[test]
    fn test_pyramid_apex_is_single_cell() {
        // 6x4 samples -> 5x3 cells -> non-power-of-two halving.
        let field = make_field(6, 4, (0..24).map(f64::from).collect());
        let (cx, cy) = field.level_cells(field.num_levels() - 1);
        assert_eq!((cx, cy), (1, 1), "Apex level must be a single cell");
    }

    /// Mipmap monotonic containment: every level-k interval contains
    /// the min/max of all level-0 cells it covers.
    #[test]
    fn test_pyramid_monotonic_containment() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let width = 13;
        let height = 9;
        let samples: Vec<f64> = (0..width * height)
            .map(|_| rng.gen_range(-500.0..3000.0))
            .collect();
        let field = make_field(width, height, samples);

        for level in 0..field.num_levels() {
            let (cx, cy) = field.level_cells(level);
            let span = 1usize << level;
            for row in 0..cy {
                for col in 0..cx {
                    let (lo, hi) = field.range(level, col, row);
                    // Every finest-level descendant must fit inside.
                    for r0 in (row * span)..((row + 1) * span).min(field.cells_y()) {
                        for c0 in (col * span)..((col + 1) * span).min(field.cells_x()) {
                            let (clo, chi) = field.range(0, c0, r0);
                            assert!(
                                lo <= clo && hi >= chi,
                                "level {level} cell ({col},{row}) [{lo},{hi}] \
                                 does not contain level 0 cell ({c0},{r0}) [{clo},{chi}]"
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_range_query_clamps_padding() {
        #[rustfmt::skip]
        let field = make_field(3, 2, vec![
            1.0, 2.0, 8.0,
            1.0, 2.0, 8.0,
        ]);
        // 2x1 cells at level 0; a query past the edge repeats the
        // boundary cell instead of inventing an interval.
        assert_eq!(field.range(0, 1, 0), (2.0, 8.0));
        assert_eq!(field.range(0, 7, 0), (2.0, 8.0));
    }

    #[test]
    fn test_elevation_bounds() {
        let field = make_field(3, 3, vec![0.0, 1.0, 2.0, 3.0, -4.0, 5.0, 6.0, 7.0, 8.0]);
        assert_eq!(field.elevation_bounds(), (-4.0, 8.0));
    }
}
