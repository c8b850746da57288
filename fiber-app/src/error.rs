//! Error types for the browser binding.

use fiber_core::{ConfigError, EngineError};
use thiserror::Error;
use wasm_bindgen::JsValue;

/// Result type for browser operations.
pub type AppResult<T> = Result<T, AppError>;

/// Reasons the background could not start.
#[derive(Debug, Error)]
pub enum AppError {
    /// No global `window`.
    #[error("No window object")]
    NoWindow,

    /// No `document` on the window.
    #[error("No document object")]
    NoDocument,

    /// No element with the requested id.
    #[error("Canvas element '{0}' not found")]
    CanvasNotFound(String),

    /// The element exists but is not a `<canvas>`.
    #[error("Element '{0}' is not a canvas")]
    NotACanvas(String),

    /// The browser refused a 2D context.
    #[error("2D context not available")]
    NoContext,

    /// The config JSON was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The engine refused to start.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A DOM call threw.
    #[error("JavaScript error: {0}")]
    Js(String),
}

impl AppError {
    /// Wrap a thrown JS value.
    #[must_use]
    #[allow(clippy::needless_pass_by_value)]
    pub fn js(value: JsValue) -> Self {
        Self::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<AppError> for JsValue {
    fn from(error: AppError) -> Self {
        JsValue::from_str(&error.to_string())
    }
}
