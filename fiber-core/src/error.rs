//! Error types for engine operations.

use thiserror::Error;

use crate::host::HostState;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while driving the engine.
///
/// None of these are fatal to the embedding page: callers log them and
/// carry on without an animated background.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// No drawing surface could be acquired.
    #[error("Drawing surface unavailable")]
    SurfaceUnavailable,

    /// The frame clock refused to schedule a frame.
    #[error("Frame clock unavailable")]
    FrameClockUnavailable,

    /// A lifecycle call was made in the wrong state.
    #[error("Cannot {action} while {from:?}")]
    InvalidTransition {
        /// State the host was in.
        from: HostState,
        /// Operation that was attempted.
        action: &'static str,
    },
}
