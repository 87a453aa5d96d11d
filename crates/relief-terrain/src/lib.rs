//! Terrain geometry for RELIEF.
//!
//! Elevation grid with a min/max mipmap pyramid, hierarchical ray
//! traversal, and exact ray/bilinear-patch intersection.

pub use relief_core as core;

pub mod accel;
pub mod height_field;
pub mod patch;

// Re-export key types for convenience.
pub use accel::intersect_terrain;
pub use height_field::HeightField;
pub use patch::BilinearPatch;
