//! Drawing surface abstraction.
//!
//! The engine only needs a handful of 2D primitives. Browsers provide them
//! through the canvas 2D context, native previews through a raster pixmap,
//! and tests through [`HeadlessSurface`].

use crate::{Point, Rect, Viewport};

/// Stroke parameters for a polyline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle<'a> {
    /// CSS color string.
    pub color: &'a str,
    /// Line width in pixels.
    pub width: f64,
    /// Global alpha multiplier (0.0 to 1.0).
    pub alpha: f64,
    /// Glow blur radius in pixels; zero disables glow.
    pub glow: f64,
}

/// A resizable 2D drawing surface.
pub trait RenderSurface {
    /// Current pixel dimensions.
    fn size(&self) -> Viewport;

    /// Resize in place.
    fn resize(&mut self, viewport: Viewport);

    /// Fill a rectangle with a CSS color.
    fn fill_rect(&mut self, rect: Rect, color: &str);

    /// Stroke an open polyline through `points`.
    fn stroke_polyline(&mut self, points: &[Point], style: &StrokeStyle<'_>);
}

/// A recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Rectangle fill.
    Fill {
        /// Filled area.
        rect: Rect,
        /// Fill color.
        color: String,
    },
    /// Polyline stroke.
    Stroke {
        /// Number of points stroked.
        points: usize,
        /// Stroke color.
        color: String,
        /// Line width.
        width: f64,
        /// Alpha.
        alpha: f64,
        /// Glow radius.
        glow: f64,
    },
}

/// Surface that records commands instead of rasterizing.
///
/// Used for headless runs and tests.
#[derive(Debug, Clone, Default)]
pub struct HeadlessSurface {
    viewport: Viewport,
    commands: Vec<DrawCommand>,
    resizes: u32,
}

impl HeadlessSurface {
    /// Create a surface of the given size.
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            commands: Vec::new(),
            resizes: 0,
        }
    }

    /// Commands recorded since the last [`take_commands`](Self::take_commands).
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drain recorded commands.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of resize calls received.
    #[must_use]
    pub fn resize_count(&self) -> u32 {
        self.resizes
    }

    /// Number of recorded strokes.
    #[must_use]
    pub fn stroke_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Stroke { .. }))
            .count()
    }
}

impl RenderSurface for HeadlessSurface {
    fn size(&self) -> Viewport {
        self.viewport
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.resizes += 1;
        tracing::debug!("Headless surface resized to {viewport}");
    }

    fn fill_rect(&mut self, rect: Rect, color: &str) {
        self.commands.push(DrawCommand::Fill {
            rect,
            color: color.to_string(),
        });
    }

    fn stroke_polyline(&mut self, points: &[Point], style: &StrokeStyle<'_>) {
        tracing::trace!(
            "Stroke {} points color={} width={} alpha={:.2} glow={:.1}",
            points.len(),
            style.color,
            style.width,
            style.alpha,
            style.glow
        );
        self.commands.push(DrawCommand::Stroke {
            points: points.len(),
            color: style.color.to_string(),
            width: style.width,
            alpha: style.alpha,
            glow: style.glow,
        });
    }
}
