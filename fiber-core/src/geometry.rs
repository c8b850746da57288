//! Canvas-space geometry primitives.

use serde::{Deserialize, Serialize};

/// A point in canvas pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X position in pixels.
    pub x: f64,
    /// Y position in pixels.
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Clamp this point into `[0, width] x [0, height]`.
    #[must_use]
    pub fn clamped(self, width: f64, height: f64) -> Self {
        Self {
            x: clamp_axis(self.x, width),
            y: clamp_axis(self.y, height),
        }
    }
}

/// Clamp a coordinate into `[0, extent]`, mapping NaN to 0.
pub(crate) fn clamp_axis(value: f64, extent: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.max(0.0).min(extent.max(0.0))
}

/// Pixel dimensions of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Viewport {
    /// Create a new viewport.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// The full-surface rectangle.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect {
            x: 0.0,
            y: 0.0,
            width: f64::from(self.width),
            height: f64::from(self.height),
        }
    }
}

impl std::fmt::Display for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_inside_and_outside() {
        let p = Point::new(-5.0, 900.0).clamped(1200.0, 800.0);
        assert_eq!(p, Point::new(0.0, 800.0));

        let q = Point::new(10.0, 20.0).clamped(1200.0, 800.0);
        assert_eq!(q, Point::new(10.0, 20.0));
    }

    #[test]
    fn test_clamp_degenerate_extent() {
        let p = Point::new(f64::NAN, 5.0).clamped(-10.0, 0.0);
        assert_eq!(p, Point::new(0.0, 0.0));
    }

    #[test]
    fn test_viewport_bounds() {
        let vp = Viewport::new(640, 480);
        assert!(!vp.is_empty());
        assert_eq!(vp.bounds().width, 640.0);
        assert!(Viewport::new(0, 480).is_empty());
        assert_eq!(vp.to_string(), "640x480");
    }
}
