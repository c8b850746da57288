//! Canvas 2D implementation of [`RenderSurface`].

use fiber_core::{Point, Rect, RenderSurface, StrokeStyle, Viewport};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::error::{AppError, AppResult};

/// A `<canvas>` element and its 2D context.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// Acquire the 2D context of `canvas`.
    ///
    /// # Errors
    ///
    /// Returns an error if the browser refuses a 2D context.
    pub fn from_canvas(canvas: HtmlCanvasElement) -> AppResult<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(AppError::js)?
            .ok_or(AppError::NoContext)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| AppError::NoContext)?;
        ctx.set_line_cap("round");
        ctx.set_line_join("round");
        Ok(Self { canvas, ctx })
    }

    /// The underlying element.
    #[must_use]
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn reset_effects(&self) {
        self.ctx.set_global_alpha(1.0);
        self.ctx.set_shadow_blur(0.0);
        self.ctx.set_shadow_color("transparent");
    }
}

impl RenderSurface for CanvasSurface {
    fn size(&self) -> Viewport {
        Viewport::new(self.canvas.width(), self.canvas.height())
    }

    fn resize(&mut self, viewport: Viewport) {
        self.canvas.set_width(viewport.width);
        self.canvas.set_height(viewport.height);
        // Resizing resets context state.
        self.ctx.set_line_cap("round");
        self.ctx.set_line_join("round");
    }

    fn fill_rect(&mut self, rect: Rect, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(rect.x, rect.y, rect.width, rect.height);
    }

    fn stroke_polyline(&mut self, points: &[Point], style: &StrokeStyle<'_>) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        if rest.is_empty() {
            return;
        }

        self.ctx.set_global_alpha(style.alpha.clamp(0.0, 1.0));
        self.ctx.set_stroke_style_str(style.color);
        self.ctx.set_line_width(style.width);
        if style.glow > 0.0 {
            self.ctx.set_shadow_blur(style.glow);
            self.ctx.set_shadow_color(style.color);
        }

        self.ctx.begin_path();
        self.ctx.move_to(first.x, first.y);
        for p in rest {
            self.ctx.line_to(p.x, p.y);
        }
        self.ctx.stroke();
        self.reset_effects();
    }
}
