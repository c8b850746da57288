//! `tiny-skia` implementation of [`RenderSurface`].

use fiber_core::{Point, Rect, RenderSurface, StrokeStyle, Viewport};
use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::color::{parse_css_color, with_alpha};
use crate::error::{RenderError, RenderResult};

/// Extra strokes drawn under a glowing segment.
const GLOW_PASSES: u8 = 3;

/// Alpha of the innermost glow pass relative to the stroke.
const GLOW_ALPHA: f64 = 0.35;

/// A CPU pixmap the fiber host can draw into.
///
/// An empty viewport holds no pixmap; drawing into it is a no-op.
pub struct PixmapSurface {
    viewport: Viewport,
    pixmap: Option<Pixmap>,
}

impl PixmapSurface {
    /// Allocate a transparent surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the pixmap cannot be allocated.
    pub fn new(viewport: Viewport) -> RenderResult<Self> {
        Ok(Self {
            viewport,
            pixmap: allocate(viewport)?,
        })
    }

    /// The backing pixmap, if the viewport is non-empty.
    #[must_use]
    pub fn pixmap(&self) -> Option<&Pixmap> {
        self.pixmap.as_ref()
    }

    /// Fill every pixel with `color`, replacing what was there.
    ///
    /// # Errors
    ///
    /// Returns an error if `color` cannot be parsed.
    pub fn clear(&mut self, color: &str) -> RenderResult<()> {
        let color = parse_css_color(color)?;
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill(color);
        }
        Ok(())
    }

    /// Straight-alpha RGBA of one pixel.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let c = self.pixmap.as_ref()?.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }

    /// Whether every pixel is fully transparent.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match &self.pixmap {
            Some(pixmap) => pixmap.pixels().iter().all(|c| c.alpha() == 0),
            None => true,
        }
    }

    /// Encode the current contents as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface is empty or encoding fails.
    pub fn encode_png(&self) -> RenderResult<Vec<u8>> {
        self.pixmap
            .as_ref()
            .ok_or(RenderError::EmptySurface)?
            .encode_png()
            .map_err(|e| RenderError::Encode(e.to_string()))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn stroke(&mut self, path: &tiny_skia::Path, color: tiny_skia::Color, width: f64) {
        let Some(pixmap) = self.pixmap.as_mut() else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(color);
        paint.anti_alias = true;
        let stroke = Stroke {
            width: width.max(0.0) as f32,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        pixmap.stroke_path(path, &paint, &stroke, Transform::identity(), None);
    }
}

fn allocate(viewport: Viewport) -> RenderResult<Option<Pixmap>> {
    if viewport.is_empty() {
        return Ok(None);
    }
    Pixmap::new(viewport.width, viewport.height)
        .map(Some)
        .ok_or(RenderError::Allocation {
            width: viewport.width,
            height: viewport.height,
        })
}

#[allow(clippy::cast_possible_truncation)]
fn build_path(points: &[Point]) -> Option<tiny_skia::Path> {
    let (first, rest) = points.split_first()?;
    let mut builder = PathBuilder::new();
    builder.move_to(first.x as f32, first.y as f32);
    for p in rest {
        builder.line_to(p.x as f32, p.y as f32);
    }
    builder.finish()
}

impl RenderSurface for PixmapSurface {
    fn size(&self) -> Viewport {
        self.viewport
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.pixmap = match allocate(viewport) {
            Ok(pixmap) => pixmap,
            Err(e) => {
                tracing::warn!("Resize to {viewport} failed: {e}");
                None
            }
        };
    }

    #[allow(clippy::cast_possible_truncation)]
    fn fill_rect(&mut self, rect: Rect, color: &str) {
        let Some(pixmap) = self.pixmap.as_mut() else {
            return;
        };
        let color = match parse_css_color(color) {
            Ok(color) => color,
            Err(e) => {
                tracing::warn!("Skipping fill: {e}");
                return;
            }
        };
        let Some(rect) = tiny_skia::Rect::from_xywh(
            rect.x as f32,
            rect.y as f32,
            rect.width as f32,
            rect.height as f32,
        ) else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(color);
        pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }

    fn stroke_polyline(&mut self, points: &[Point], style: &StrokeStyle<'_>) {
        if self.pixmap.is_none() || points.len() < 2 {
            return;
        }
        let base = match parse_css_color(style.color) {
            Ok(color) => color,
            Err(e) => {
                tracing::warn!("Skipping stroke: {e}");
                return;
            }
        };
        let Some(path) = build_path(points) else {
            return;
        };

        if style.glow > 0.0 {
            for pass in (1..=GLOW_PASSES).rev() {
                let t = f64::from(pass) / f64::from(GLOW_PASSES);
                let color = with_alpha(base, style.alpha * GLOW_ALPHA * (1.0 - t * 0.7));
                self.stroke(&path, color, style.width + style.glow * t);
            }
        }
        self.stroke(&path, with_alpha(base, style.alpha), style.width);

        tracing::trace!(
            points = points.len(),
            width = style.width,
            glow = style.glow,
            "Rasterized stroke"
        );
    }
}

impl std::fmt::Debug for PixmapSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixmapSurface")
            .field("viewport", &self.viewport)
            .field("allocated", &self.pixmap.is_some())
            .finish()
    }
}
