//! Structural render errors.
//!
//! Only faults that make the whole run impossible live here. A ray
//! that misses the terrain is not an error (it is an `Option::None`),
//! and per-tile numerical faults are contained by the renderer.

use thiserror::Error;

/// Fatal construction-time errors.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The elevation grid cannot form a single cell.
    #[error("invalid elevation grid ({width}x{height}): {reason}")]
    InvalidGrid {
        width: usize,
        height: usize,
        reason: String,
    },

    /// The camera parameters describe no usable projection.
    #[error("invalid camera: {0}")]
    InvalidCamera(String),
}
