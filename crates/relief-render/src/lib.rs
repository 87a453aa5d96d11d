//! Rendering orchestration for RELIEF.
//!
//! Camera ray generation, parallel tile rendering, shading with
//! vector draping, and the outline extraction post-pass.

pub use relief_core as core;
pub use relief_terrain as terrain;
pub use relief_vector as vector;

pub mod camera;
pub mod framebuffer;
pub mod outline;
pub mod renderer;
pub mod sampler;
pub mod shade;


// Re-export key types for convenience.
pub use camera::{Camera, CameraPose, Projection};
pub use framebuffer::{Framebuffer, Tile};
pub use outline::OutlineExtractor;
pub use renderer::Renderer;
