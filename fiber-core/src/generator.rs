//! Deterministic path generation.
//!
//! Every function here is pure: the same index, color and [`PathConfig`]
//! always produce a bit-identical [`PathDescriptor`]. Per-path parameters are
//! derived from `index mod k` cycles rather than randomness so that distinct
//! indices look different but reproduce exactly.
//!
//! Degenerate viewports (zero, negative or non-finite dimensions) produce a
//! single-node path. Nothing here logs or panics.

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use crate::path::{segment_range, Node, PathDescriptor, PathKind, PathLayout};
use crate::{Point, QualityTier, Viewport};

/// Upper bound on nodes per path.
pub const MAX_NODES: usize = 4096;

/// Rows keep this far from the top and bottom edges when there is room.
const EDGE_MARGIN: f64 = 50.0;

/// Colors used when the caller supplies an empty palette.
pub const DEFAULT_PALETTE: [&str; 8] = [
    "rgba(255, 50, 50, 1)",
    "rgba(255, 100, 100, 0.9)",
    "rgba(220, 30, 30, 0.8)",
    "rgba(187, 0, 0, 0.9)",
    "rgba(255, 80, 80, 0.7)",
    "rgba(200, 20, 20, 0.85)",
    "rgba(255, 120, 120, 0.8)",
    "rgba(180, 10, 10, 0.9)",
];

/// The default palette as owned strings.
#[must_use]
pub fn default_palette() -> Vec<String> {
    DEFAULT_PALETTE.iter().map(|c| (*c).to_string()).collect()
}

/// Inputs to the generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathConfig {
    /// Viewport width in pixels.
    pub container_width: f64,
    /// Viewport height in pixels.
    pub container_height: f64,
    /// Mobile devices get fewer, farther-apart nodes.
    pub is_mobile: bool,
    /// Density tier; lower tiers space nodes further apart.
    #[serde(default)]
    pub tier: QualityTier,
}

impl PathConfig {
    /// Config at full density.
    #[must_use]
    pub fn new(container_width: f64, container_height: f64, is_mobile: bool) -> Self {
        Self {
            container_width,
            container_height,
            is_mobile,
            tier: QualityTier::High,
        }
    }

    /// Config sized to a viewport.
    #[must_use]
    pub fn from_viewport(viewport: Viewport, is_mobile: bool, tier: QualityTier) -> Self {
        Self::new(
            f64::from(viewport.width),
            f64::from(viewport.height),
            is_mobile,
        )
        .with_tier(tier)
    }

    /// Set the density tier.
    #[must_use]
    pub fn with_tier(mut self, tier: QualityTier) -> Self {
        self.tier = tier;
        self
    }

    /// Width and height with invalid values mapped to zero.
    fn extent(&self) -> (f64, f64) {
        (
            sanitize(self.container_width),
            sanitize(self.container_height),
        )
    }

    fn is_degenerate(&self) -> bool {
        let (w, h) = self.extent();
        w <= 0.0 || h <= 0.0
    }

    fn spacing(&self, desktop: f64, mobile: f64) -> f64 {
        let base = if self.is_mobile { mobile } else { desktop };
        base * self.tier.node_spacing_scale()
    }

    fn pick<T>(&self, desktop: T, mobile: T) -> T {
        if self.is_mobile {
            mobile
        } else {
            desktop
        }
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// `floor(span / spacing)`, at least one and at most [`MAX_NODES`].
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn node_count(span: f64, spacing: f64) -> usize {
    let n = (span / spacing).floor();
    if n.is_finite() && n >= 1.0 {
        (n as usize).min(MAX_NODES)
    } else {
        1
    }
}

/// `i / (n - 1)`, zero for single-node paths.
#[allow(clippy::cast_precision_loss)]
fn progress(i: usize, n: usize) -> f64 {
    if n <= 1 {
        0.0
    } else {
        i as f64 / (n - 1) as f64
    }
}

/// Keep `value` at least `margin` from both ends of `[0, extent]` when it fits.
fn keep_margin(value: f64, margin: f64, extent: f64) -> f64 {
    if extent >= 2.0 * margin {
        value.max(margin).min(extent - margin)
    } else {
        value
    }
}

struct PathParams {
    speed: f64,
    width: f64,
    opacity: f64,
    glow_intensity: f64,
    layer: u8,
    segment_length: usize,
    stagger: usize,
}

fn assemble(
    id: String,
    kind: PathKind,
    layout: PathLayout,
    nodes: Vec<Node>,
    color: &str,
    params: &PathParams,
) -> PathDescriptor {
    let segment_length = params.segment_length.min(nodes.len());
    let active_segment_index = params.stagger % segment_range(nodes.len(), segment_length);
    PathDescriptor {
        id,
        nodes,
        direction: layout.direction(),
        layout,
        speed: params.speed,
        color: color.to_string(),
        width: params.width,
        active_segment_index,
        segment_length,
        kind,
        layer: params.layer,
        opacity: params.opacity,
        glow_intensity: params.glow_intensity,
    }
}

/// Generate main path `index`.
///
/// The layout class is chosen by `index % 3`: horizontal, diagonal, curved.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn generate_main_path(index: usize, color: &str, config: &PathConfig) -> PathDescriptor {
    let (w, h) = config.extent();
    let cycle = index as f64;

    let (layout, mut nodes) = match index % 3 {
        0 => horizontal_nodes(index, cycle, w, h, config),
        1 => diagonal_nodes(index, w, h, config),
        _ => curved_nodes(index, cycle, w, h, config),
    };
    if config.is_degenerate() {
        nodes.truncate(1);
    }

    let params = PathParams {
        speed: 0.6 + (index % 3) as f64 * 0.3,
        width: config.pick(7.0, 5.0),
        opacity: 0.8 + (index % 2) as f64 * 0.1,
        glow_intensity: 0.7 + (index % 3) as f64 * 0.2,
        layer: (index % 3) as u8,
        segment_length: config.pick(18, 12),
        stagger: index.wrapping_mul(5),
    };

    assemble(
        format!("enhanced-main-{index}"),
        PathKind::Main,
        layout,
        nodes,
        color,
        &params,
    )
}

#[allow(clippy::cast_precision_loss)]
fn horizontal_nodes(
    index: usize,
    cycle: f64,
    w: f64,
    h: f64,
    config: &PathConfig,
) -> (PathLayout, Vec<Node>) {
    let baseline_y = h / 7.0 * (1 + index % 5) as f64;
    let wave_phase = cycle * 0.8;
    let amplitude = config.pick(60.0, 30.0);
    let n = node_count(w, config.spacing(60.0, 45.0));

    let nodes = (0..n)
        .map(|i| {
            let t = progress(i, n);
            let wave = (t * TAU + wave_phase).sin() * amplitude;
            let y = keep_margin(baseline_y + wave, EDGE_MARGIN, h);
            Node::new(
                format!("main-horizontal-{index}-{i}"),
                Point::new(t * w, y).clamped(w, h),
                (i as f64 * 0.3).rem_euclid(TAU),
                0.8 + (i % 3) as f64 * 0.1,
            )
        })
        .collect();

    (
        PathLayout::Horizontal {
            baseline_y,
            wave_phase,
            amplitude,
        },
        nodes,
    )
}

#[allow(clippy::cast_precision_loss)]
fn diagonal_nodes(index: usize, w: f64, h: f64, config: &PathConfig) -> (PathLayout, Vec<Node>) {
    let start = Point::new((index % 4) as f64 * (w / 4.0), h * 0.2);
    let end = Point::new(w - start.x, h * 0.8);
    let n = node_count((end.x - start.x).abs(), config.spacing(70.0, 50.0));

    let nodes = (0..n)
        .map(|i| {
            let t = progress(i, n);
            let p = Point::new(
                start.x + (end.x - start.x) * t,
                start.y + (end.y - start.y) * t,
            );
            Node::new(
                format!("main-diagonal-{index}-{i}"),
                p.clamped(w, h),
                (i as f64 * 0.4).rem_euclid(TAU),
                0.7 + (i % 2) as f64 * 0.2,
            )
        })
        .collect();

    (PathLayout::Diagonal { start, end }, nodes)
}

#[allow(clippy::cast_precision_loss)]
fn curved_nodes(
    index: usize,
    cycle: f64,
    w: f64,
    h: f64,
    config: &PathConfig,
) -> (PathLayout, Vec<Node>) {
    let center = Point::new(w / 2.0, h / 2.0);
    let radius = w.min(h) * 0.3;
    let angular_offset = cycle * 0.5;
    let n = node_count(PI * radius, config.spacing(55.0, 40.0));

    let nodes = (0..n)
        .map(|i| {
            let angle = (i as f64 / n as f64) * TAU + angular_offset;
            let p = Point::new(
                center.x + angle.cos() * radius,
                center.y + angle.sin() * radius,
            );
            Node::new(
                format!("main-curved-{index}-{i}"),
                p.clamped(w, h),
                (angle + cycle).rem_euclid(TAU),
                0.6 + angle.sin().abs() * 0.3,
            )
        })
        .collect();

    (
        PathLayout::Curved {
            center,
            radius,
            angular_offset,
        },
        nodes,
    )
}

/// Generate branch path `index`: a short ray at `index * π/3`.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn generate_branch_path(index: usize, color: &str, config: &PathConfig) -> PathDescriptor {
    let (w, h) = config.extent();
    let cycle = index as f64;

    let n = if config.is_degenerate() {
        1
    } else {
        config.pick(15, 10)
    };
    let origin = Point::new((index % 6) as f64 * (w / 6.0), (index % 4) as f64 * (h / 4.0));
    let angle = cycle * PI / 3.0;
    let length = config.pick(300.0, 200.0);

    let nodes = (0..n)
        .map(|i| {
            let reach = length * progress(i, n);
            let p = Point::new(
                origin.x + angle.cos() * reach,
                origin.y + angle.sin() * reach,
            );
            Node::new(
                format!("branch-{index}-{i}"),
                p.clamped(w, h),
                (i as f64 * 0.5 + cycle).rem_euclid(TAU),
                0.5 + (i % 2) as f64 * 0.3,
            )
        })
        .collect();

    let params = PathParams {
        speed: 1.0 + (index % 2) as f64 * 0.4,
        width: config.pick(4.0, 3.0),
        opacity: 0.6 + (index % 3) as f64 * 0.2,
        glow_intensity: 0.5 + (index % 2) as f64 * 0.3,
        layer: (index % 2) as u8 + 1,
        segment_length: config.pick(12, 8),
        stagger: index.wrapping_mul(3),
    };

    assemble(
        format!("enhanced-branch-{index}"),
        PathKind::Branch,
        PathLayout::Branch {
            origin,
            angle,
            length,
        },
        nodes,
        color,
        &params,
    )
}

/// Generate `main_count` main paths followed by `branch_count` branches.
///
/// Colors cycle through `palette`; an empty palette falls back to
/// [`DEFAULT_PALETTE`].
#[must_use]
pub fn generate_network(
    config: &PathConfig,
    palette: &[String],
    main_count: usize,
    branch_count: usize,
) -> Vec<PathDescriptor> {
    let mains =
        (0..main_count).map(|i| generate_main_path(i, palette_color(palette, i), config));
    let branches = (0..branch_count).map(|j| {
        generate_branch_path(j, palette_color(palette, main_count + j), config)
    });
    mains.chain(branches).collect()
}

fn palette_color(palette: &[String], slot: usize) -> &str {
    if palette.is_empty() {
        DEFAULT_PALETTE[slot % DEFAULT_PALETTE.len()]
    } else {
        &palette[slot % palette.len()]
    }
}
