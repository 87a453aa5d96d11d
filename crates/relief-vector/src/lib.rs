//! Vector map features for RELIEF.
//!
//! Polyline and polygon layers in the horizontal plane, signed
//! distance queries, and the drape engine that styles terrain
//! surface points during shading.

pub use relief_core as core;

pub mod distance;
pub mod drape;
pub mod feature;

// Re-export key types for convenience.
pub use drape::DrapeEngine;
pub use feature::{BoundingBox, Geometry, Style, VectorFeature, VectorLayer};
