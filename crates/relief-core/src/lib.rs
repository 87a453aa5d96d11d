//! Core vocabulary for the RELIEF terrain renderer.
//!
//! This crate defines the types shared across all other crates:
//! rays, intersections, colors, errors, and render settings.
//! It has no dependency on any other workspace crate.

pub mod color;
pub mod error;
pub mod settings;
pub mod types;

// Re-export key types for convenience.
pub use color::Color;
pub use error::RenderError;
pub use settings::{OutlineSettings, RenderSettings};
pub use types::{Intersection, Ray};
