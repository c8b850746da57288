//! # Fiber Renderer
//!
//! CPU rasterization for the fiber network. [`PixmapSurface`] implements
//! [`fiber_core::RenderSurface`] on a `tiny-skia` pixmap, so the same host
//! that drives a browser canvas can render frames offline.
//!
//! ```text
//! CanvasHost ──► PixmapSurface ──► FrameExporter ──► frame-00000.png
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod color;
pub mod error;
pub mod export;
pub mod surface;

pub use color::parse_css_color;
pub use error::{RenderError, RenderResult};
pub use export::FrameExporter;
pub use surface::PixmapSurface;

/// Renderer version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
