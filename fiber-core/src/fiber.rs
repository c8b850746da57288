//! Animated fiber entity.
//!
//! A [`Fiber`] owns one [`PathDescriptor`] and is the only thing that mutates
//! its animation state. All mutation happens in [`Fiber::update`];
//! [`Fiber::draw`] only reads.

use std::f64::consts::TAU;

use crate::path::PathDescriptor;
use crate::surface::{RenderSurface, StrokeStyle};
use crate::{Point, QualityTier};

/// Pulse phase advance per frame, in radians.
pub const PULSE_STEP: f64 = 0.08;

/// Distance in nodes over which light fades outside the active segment.
pub const FALLOFF_NODES: f64 = 4.0;

/// Glow blur radius at full intensity, in pixels.
pub const GLOW_RADIUS: f64 = 24.0;

/// Alpha of the unlit path relative to its opacity. The whole path is
/// stroked at `opacity * BASE_ALPHA` beneath the lit segment, which uses the
/// full opacity.
const BASE_ALPHA: f64 = 0.25;

/// Brightness of the segment tail relative to its head.
const TAIL_FLOOR: f64 = 0.35;

/// Brightness of the halo just outside the segment.
const HALO: f64 = 0.3;

/// One animated strand.
#[derive(Debug, Clone, PartialEq)]
pub struct Fiber {
    path: PathDescriptor,
    points: Vec<Point>,
    progress: f64,
}

impl Fiber {
    /// Wrap a generated path.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(path: PathDescriptor) -> Self {
        let points = path.points().collect();
        let progress = path.active_segment_index as f64;
        Self {
            path,
            points,
            progress,
        }
    }

    /// The owned descriptor.
    #[must_use]
    pub fn path(&self) -> &PathDescriptor {
        &self.path
    }

    /// Fractional position of the active segment start.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Node index range of the lit segment.
    #[must_use]
    pub fn active_window(&self) -> std::ops::Range<usize> {
        let start = self.path.active_segment_index;
        let end = (start + self.path.segment_length).min(self.path.nodes.len());
        start.min(end)..end
    }

    /// Position of the segment head as a fraction of the path, zero for
    /// paths with fewer than two nodes.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn head_fraction(&self) -> f64 {
        let n = self.path.nodes.len();
        if n <= 1 {
            return 0.0;
        }
        let head = self.active_window().end.saturating_sub(1);
        head as f64 / (n - 1) as f64
    }

    /// Mean intensity of the nodes in the lit segment.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_active_intensity(&self) -> f64 {
        let window = self.active_window();
        if window.is_empty() {
            return 0.0;
        }
        let len = window.len() as f64;
        let sum: f64 = self.path.nodes[window].iter().map(|n| n.intensity).sum();
        sum / len
    }

    /// Advance the lit segment and pulse by one frame.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn update(&mut self) {
        let n = self.path.nodes.len();
        if n == 0 {
            return;
        }

        let range = self.path.segment_range();
        let advanced = self.progress + self.path.speed;
        self.progress = if advanced.is_finite() {
            advanced.rem_euclid(range as f64)
        } else {
            0.0
        };
        self.path.active_segment_index = (self.progress.floor() as usize).min(range - 1);

        let window = self.active_window();
        let seg = self.path.segment_length.max(1) as f64;

        for (i, node) in self.path.nodes.iter_mut().enumerate() {
            node.pulse_phase = (node.pulse_phase + PULSE_STEP).rem_euclid(TAU);
            let pulse = 0.5 + 0.5 * node.pulse_phase.sin();

            if window.contains(&i) {
                let along = (i - window.start + 1) as f64 / seg;
                let ramp = TAIL_FLOOR + (1.0 - TAIL_FLOOR) * along;
                node.is_active = true;
                node.intensity =
                    (ramp * (0.75 + 0.25 * pulse) * node.connection_strength).clamp(0.0, 1.0);
            } else {
                let distance = if i < window.start {
                    window.start - i
                } else {
                    i + 1 - window.end
                };
                let falloff = (1.0 - distance as f64 / FALLOFF_NODES).max(0.0);
                node.is_active = false;
                node.intensity =
                    (falloff * HALO * pulse * node.connection_strength).clamp(0.0, 1.0);
            }
        }
    }

    /// Stroke the path and its lit segment.
    pub fn draw<S: RenderSurface + ?Sized>(&self, surface: &mut S, tier: QualityTier) {
        if self.points.len() < 2 {
            return;
        }

        surface.stroke_polyline(
            &self.points,
            &StrokeStyle {
                color: &self.path.color,
                width: self.path.width,
                alpha: self.path.opacity * BASE_ALPHA,
                glow: 0.0,
            },
        );

        let window = self.active_window();
        if window.len() < 2 {
            return;
        }
        let glow = GLOW_RADIUS
            * self.path.glow_intensity
            * self.mean_active_intensity()
            * tier.glow_scale();
        surface.stroke_polyline(
            &self.points[window],
            &StrokeStyle {
                color: &self.path.color,
                width: self.path.width,
                alpha: self.path.opacity,
                glow,
            },
        );
    }
}

impl From<PathDescriptor> for Fiber {
    fn from(path: PathDescriptor) -> Self {
        Self::new(path)
    }
}
