//! Render target: color, depth and normal planes plus tiling.
//!
//! The depth and normal planes exist for the outline extraction
//! post-pass; misses carry infinite depth and a zero normal.

use glam::DVec3;

use relief_core::Color;

/// A rectangular region of the image claimed by one render worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

/// Partition an image into row-major tiles of at most `tile_size`
/// on each edge; boundary tiles shrink to fit.
pub fn tiles(width: usize, height: usize, tile_size: usize) -> Vec<Tile> {
    let tile_size = tile_size.max(1);
    let mut out = Vec::new();
    let mut y = 0;
    while y < height {
        let th = tile_size.min(height - y);
        let mut x = 0;
        while x < width {
            let tw = tile_size.min(width - x);
            out.push(Tile {
                x,
                y,
                width: tw,
                height: th,
            });
            x += tw;
        }
        y += th;
    }
    out
}

/// Thread-local buffer a worker renders one tile into before the
/// blit back to the shared framebuffer.
#[derive(Debug, Clone)]
pub struct TileBuffer {
    pub tile: Tile,
    pub color: Vec<Color>,
    pub depth: Vec<f64>,
    pub normal: Vec<DVec3>,
}

impl TileBuffer {
    pub fn new(tile: Tile) -> Self {
        let len = tile.width * tile.height;
        Self {
            tile,
            color: vec![Color::BLACK; len],
            depth: vec![f64::INFINITY; len],
            normal: vec![DVec3::ZERO; len],
        }
    }

    pub fn set(&mut self, x: usize, y: usize, color: Color, depth: f64, normal: DVec3) {
        let i = y * self.tile.width + x;
        self.color[i] = color;
        self.depth[i] = depth;
        self.normal[i] = normal;
    }

    /// Overwrite every pixel with a flat color (fault sentinel fill).
    pub fn fill(&mut self, color: Color) {
        self.color.fill(color);
        self.depth.fill(f64::INFINITY);
        self.normal.fill(DVec3::ZERO);
    }
}

/// The full render target.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    color: Vec<Color>,
    depth: Vec<f64>,
    normal: Vec<DVec3>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize, background: Color) -> Self {
        Self {
            width,
            height,
            color: vec![background; width * height],
            depth: vec![f64::INFINITY; width * height],
            normal: vec![DVec3::ZERO; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y * self.width + x
    }

    pub fn color(&self, x: usize, y: usize) -> Color {
        self.color[self.index(x, y)]
    }

    pub fn depth(&self, x: usize, y: usize) -> f64 {
        self.depth[self.index(x, y)]
    }

    pub fn normal(&self, x: usize, y: usize) -> DVec3 {
        self.normal[self.index(x, y)]
    }

    pub fn set_color(&mut self, x: usize, y: usize, color: Color) {
        let i = self.index(x, y);
        self.color[i] = color;
    }

    /// Copy a completed tile buffer into place.
    pub fn blit(&mut self, buf: &TileBuffer) {
        let t = buf.tile;
        for row in 0..t.height {
            let src = row * t.width;
            let dst = (t.y + row) * self.width + t.x;
            self.color[dst..dst + t.width].copy_from_slice(&buf.color[src..src + t.width]);
            self.depth[dst..dst + t.width].copy_from_slice(&buf.depth[src..src + t.width]);
            self.normal[dst..dst + t.width].copy_from_slice(&buf.normal[src..src + t.width]);
        }
    }

    /// Flatten to 8-bit sRGB, row-major RGB triplets, for external
    /// image encoding.
    pub fn to_srgb8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.color.len() * 3);
        for c in &self.color {
            out.extend_from_slice(&c.to_srgb8());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiles_cover_image_exactly() {
        let ts = tiles(100, 70, 32);
        let area: usize = ts.iter().map(|t| t.width * t.height).sum();
        assert_eq!(area, 100 * 70, "tiles must cover every pixel once");
        // Boundary tiles shrink.
        assert!(ts.iter().all(|t| t.x + t.width <= 100 && t.y + t.height <= 70));
        assert_eq!(ts.len(), 4 * 3);
    }

    #[test]
    fn test_blit_places_tile() {
        let mut fb = Framebuffer::new(8, 8, Color::BLACK);
        let tile = Tile {
            x: 4,
            y: 2,
            width: 3,
            height: 2,
        };
        let mut buf = TileBuffer::new(tile);
        buf.set(0, 0, Color::WHITE, 5.0, DVec3::Z);
        buf.set(2, 1, Color::WHITE, 7.0, DVec3::Z);
        fb.blit(&buf);

        assert_eq!(fb.color(4, 2), Color::WHITE);
        assert_eq!(fb.depth(4, 2), 5.0);
        assert_eq!(fb.normal(4, 2), DVec3::Z);
        assert_eq!(fb.color(6, 3), Color::WHITE);
        assert_eq!(fb.color(0, 0), Color::BLACK);
        assert!(fb.depth(0, 0).is_infinite());
    }

    #[test]
    fn test_srgb8_layout() {
        let mut fb = Framebuffer::new(2, 1, Color::BLACK);
        fb.set_color(1, 0, Color::WHITE);
        assert_eq!(fb.to_srgb8(), vec![0, 0, 0, 255, 255, 255]);
    }
}
