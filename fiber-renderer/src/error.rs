//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The pixmap could not be allocated.
    #[error("Failed to allocate {width}x{height} pixmap")]
    Allocation {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// The surface has no pixels to encode.
    #[error("Surface is empty")]
    EmptySurface,

    /// A color string could not be parsed.
    #[error("Invalid color \"{input}\": {reason}")]
    Color {
        /// The rejected input.
        input: String,
        /// What was wrong.
        reason: String,
    },

    /// PNG encoding failed.
    #[error("PNG encoding failed: {0}")]
    Encode(String),

    /// Writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
