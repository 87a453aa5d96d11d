//! Linear RGB color with f64 channels.

use serde::{Deserialize, Serialize};

/// A color in linear RGB space. Channels are nominally in `[0, 1]`
/// but intermediate shading math may exceed that range; `clamp` and
/// `to_srgb8` are applied at output time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Uniform gray.
    pub const fn gray(v: f64) -> Self {
        Self::new(v, v, v)
    }

    /// Linear interpolation toward `other` by `t` in `[0, 1]`.
    pub fn lerp(self, other: Color, t: f64) -> Color {
        Color::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }

    /// Composite `top` over this color with the given alpha.
    pub fn blend(self, top: Color, alpha: f64) -> Color {
        self.lerp(top, alpha.clamp(0.0, 1.0))
    }

    /// Clamp all channels to `[0, 1]`.
    pub fn clamp(self) -> Color {
        Color::new(
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
        )
    }

    /// True if no channel is NaN or infinite.
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite()
    }

    /// Gamma-encode to 8-bit sRGB (simple 1/2.2 curve).
    pub fn to_srgb8(self) -> [u8; 3] {
        let enc = |v: f64| (v.clamp(0.0, 1.0).powf(1.0 / 2.2) * 255.0).round() as u8;
        [enc(self.r), enc(self.g), enc(self.b)]
    }
}

impl std::ops::Add for Color {
    type Output = Color;

    fn add(self, rhs: Color) -> Color {
        Color::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl std::ops::Mul<f64> for Color {
    type Output = Color;

    fn mul(self, rhs: f64) -> Color {
        Color::new(self.r * rhs, self.g * rhs, self.b * rhs)
    }
}
