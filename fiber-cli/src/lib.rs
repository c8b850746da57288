//! # Fiber Preview
//!
//! Native preview tool for the fiber network background.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p fiber-cli -- paths --width 1200 --height 800 --mobile
//! cargo run -p fiber-cli -- render --out frames --frames 60 --every 5
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - [`run_paths`] - generates the network and serializes it
//! - [`run_render`] - drives a `CanvasHost<PixmapSurface, ManualClock>` with
//!   simulated frame timestamps and battery, exporting PNG frames

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use fiber_core::{
    generate_network, BatterySource, BatteryStatus, CanvasHost, ConfigError, EngineConfig,
    EngineError, ManualClock, PathConfig, PerformanceMonitor, QualityTier, Subscription,
    Viewport,
};
use fiber_renderer::{FrameExporter, PixmapSurface, RenderError};
use serde::Serialize;
use thiserror::Error;

/// Page color behind the canvas in rendered frames.
const BACKGROUND: &str = "#000000";

/// Command-line arguments for fiber-preview.
#[derive(Debug, Clone, Parser)]
#[command(name = "fiber-preview")]
#[command(about = "Preview the fiber network background")]
#[command(version)]
pub struct CliArgs {
    /// Engine config JSON file
    #[arg(long, global = true, env = "FIBER_CONFIG")]
    pub config: Option<PathBuf>,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the generated path descriptors as JSON
    Paths(PathsArgs),
    /// Render a frame sequence to PNG files
    Render(RenderArgs),
}

/// Viewport and device options shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct ViewArgs {
    /// Viewport width in pixels
    #[arg(long, default_value = "1200")]
    pub width: u32,

    /// Viewport height in pixels
    #[arg(long, default_value = "800")]
    pub height: u32,

    /// Use mobile spacing and segment lengths
    #[arg(long)]
    pub mobile: bool,

    /// Starting quality tier (high, medium, low)
    #[arg(long)]
    pub tier: Option<QualityTier>,
}

impl ViewArgs {
    fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }
}

/// Options for `paths`.
#[derive(Debug, Clone, Args)]
pub struct PathsArgs {
    /// Viewport and device options
    #[command(flatten)]
    pub view: ViewArgs,

    /// Number of main paths (overrides config)
    #[arg(long)]
    pub main: Option<usize>,

    /// Number of branch paths (overrides config)
    #[arg(long)]
    pub branch: Option<usize>,
}

/// Options for `render`.
#[derive(Debug, Clone, Args)]
pub struct RenderArgs {
    /// Viewport and device options
    #[command(flatten)]
    pub view: ViewArgs,

    /// Frames to simulate
    #[arg(long, default_value = "120")]
    pub frames: u64,

    /// Write every N-th frame
    #[arg(long, default_value = "10")]
    pub every: u64,

    /// Output directory
    #[arg(long, default_value = "frames")]
    pub out: PathBuf,

    /// Simulated battery level (0.0 to 1.0); omitted means no battery
    #[arg(long)]
    pub battery_level: Option<f64>,

    /// Simulated battery is charging
    #[arg(long)]
    pub charging: bool,

    /// Simulated time between frames in milliseconds
    #[arg(long, default_value = "16.7")]
    pub frame_ms: f64,
}

/// Errors from the preview commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// The engine refused to start.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Rasterizing or writing a frame failed.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Serializing output failed.
    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load the config file, or defaults when none is given.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig, ConfigError> {
    match path {
        Some(path) => EngineConfig::from_path(path),
        None => Ok(EngineConfig::default()),
    }
}

/// Generate the network and return it as pretty JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn run_paths(config: &EngineConfig, args: &PathsArgs) -> Result<String, CliError> {
    let tier = args.view.tier.unwrap_or(config.monitor.default_tier);
    let path_config = PathConfig::from_viewport(args.view.viewport(), args.view.mobile, tier);
    let main = args.main.unwrap_or(config.host.main_paths);
    let branch = args.branch.unwrap_or(config.host.branch_paths);

    let paths = generate_network(&path_config, &config.host.palette, main, branch);
    tracing::debug!(paths = paths.len(), %tier, "Generated network");
    Ok(serde_json::to_string_pretty(&paths)?)
}

/// Outcome of a render run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSummary {
    /// Frames rendered.
    pub frames: u64,
    /// PNG files written.
    pub written: usize,
    /// Tier when the run ended.
    pub tier: QualityTier,
    /// Output directory.
    pub out: PathBuf,
}

/// Drive the host for `args.frames` simulated frames and export PNGs.
///
/// # Errors
///
/// Returns an error if the surface cannot be allocated, the host refuses to
/// start or a frame cannot be written.
pub fn run_render(mut config: EngineConfig, args: &RenderArgs) -> Result<RenderSummary, CliError> {
    if let Some(tier) = args.view.tier {
        config.monitor.default_tier = tier;
    }

    let mut monitor = PerformanceMonitor::new(config.monitor);
    if let Some(level) = args.battery_level {
        monitor.attach_battery(FixedBattery::new(BatteryStatus::new(level, args.charging)));
    }

    let mut surface = PixmapSurface::new(args.view.viewport())?;
    surface.clear(BACKGROUND)?;

    let mut host = CanvasHost::new(config.host, ManualClock::new(), monitor.handle());
    host.start(Some(surface), args.view.mobile)?;
    let mut exporter = FrameExporter::new(&args.out, args.every)?;

    let mut timestamp_ms = 0.0;
    for _ in 0..args.frames {
        timestamp_ms += args.frame_ms;
        monitor.record_frame(timestamp_ms);
        let Some(report) = host.tick(timestamp_ms) else {
            break;
        };
        if let Some(surface) = host.surface() {
            exporter.capture(report.frame - 1, surface)?;
        }
    }

    let summary = RenderSummary {
        frames: host.frame_count(),
        written: exporter.written().len(),
        tier: monitor.tier(),
        out: exporter.dir().to_path_buf(),
    };
    host.dispose();
    monitor.dispose();

    tracing::info!(
        frames = summary.frames,
        written = summary.written,
        tier = %summary.tier,
        "Render finished"
    );
    Ok(summary)
}

/// A battery whose reading never changes.
#[derive(Debug, Clone, Copy)]
pub struct FixedBattery {
    status: BatteryStatus,
}

impl FixedBattery {
    /// Battery stuck at `status`.
    #[must_use]
    pub fn new(status: BatteryStatus) -> Self {
        Self { status }
    }
}

struct NoChanges;

impl Subscription for NoChanges {
    fn unsubscribe(&mut self) {}
}

impl BatterySource for FixedBattery {
    fn status(&self) -> BatteryStatus {
        self.status
    }

    fn on_change(&self, _callback: Box<dyn FnMut(BatteryStatus)>) -> Box<dyn Subscription> {
        Box::new(NoChanges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_args(out: &Path, extra: &[&str]) -> RenderArgs {
        let mut argv = vec![
            "fiber-preview",
            "render",
            "--width",
            "320",
            "--height",
            "200",
            "--out",
            out.to_str().expect("utf-8 path"),
        ];
        argv.extend_from_slice(extra);
        match CliArgs::try_parse_from(argv).expect("parse").command {
            Command::Render(args) => args,
            Command::Paths(_) => panic!("expected render"),
        }
    }

    #[test]
    fn test_parse_paths() {
        let args = CliArgs::try_parse_from([
            "fiber-preview",
            "paths",
            "--mobile",
            "--tier",
            "low",
            "--main",
            "1",
        ])
        .expect("parse");
        let Command::Paths(paths) = args.command else {
            panic!("expected paths");
        };
        assert!(paths.view.mobile);
        assert_eq!(paths.view.tier, Some(QualityTier::Low));
        assert_eq!(paths.main, Some(1));
        assert_eq!(paths.view.width, 1200);
    }

    #[test]
    fn test_rejects_unknown_tier() {
        assert!(CliArgs::try_parse_from(["fiber-preview", "paths", "--tier", "ultra"]).is_err());
    }

    #[test]
    fn test_paths_json() {
        let args = CliArgs::try_parse_from(["fiber-preview", "paths", "--branch", "4"])
            .expect("parse");
        let Command::Paths(paths) = args.command else {
            panic!("expected paths");
        };
        let json = run_paths(&EngineConfig::default(), &paths).expect("run");
        let value: serde_json::Value = serde_json::from_str(&json).expect("json");
        let list = value.as_array().expect("array");
        assert_eq!(list.len(), 7);
        assert_eq!(list[0]["direction"], "horizontal");
        assert_eq!(list[0]["nodes"].as_array().map(Vec::len), Some(20));
        assert_eq!(list[6]["kind"], "branch");
    }

    #[test]
    fn test_render_writes_frames() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("frames");
        let args = render_args(&out, &["--frames", "20", "--every", "5"]);

        let summary = run_render(EngineConfig::default(), &args).expect("render");
        assert_eq!(summary.frames, 20);
        assert_eq!(summary.written, 4);
        assert_eq!(summary.tier, QualityTier::High);
        assert!(out.join("frame-00003.png").exists());
    }

    #[test]
    fn test_low_battery_render() {
        let dir = tempfile::tempdir().expect("tempdir");
        let args = render_args(dir.path(), &["--frames", "3", "--battery-level", "0.1"]);
        let summary = run_render(EngineConfig::default(), &args).expect("render");
        assert_eq!(summary.tier, QualityTier::Medium);
    }

    #[test]
    fn test_charging_keeps_quality() {
        let dir = tempfile::tempdir().expect("tempdir");
        let args = render_args(
            dir.path(),
            &["--frames", "3", "--battery-level", "0.1", "--charging"],
        );
        let summary = run_render(EngineConfig::default(), &args).expect("render");
        assert_eq!(summary.tier, QualityTier::High);
    }

    #[test]
    fn test_slow_frames_demote() {
        let dir = tempfile::tempdir().expect("tempdir");
        let args = render_args(
            dir.path(),
            &["--frames", "100", "--every", "50", "--frame-ms", "40"],
        );
        let summary = run_render(EngineConfig::default(), &args).expect("render");
        assert_eq!(summary.tier, QualityTier::Medium);
        assert_eq!(summary.written, 2);
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("engine.json");
        std::fs::write(&path, r#"{"host":{"main_paths":1,"branch_paths":0}}"#).expect("write");

        let config = load_config(Some(path.as_path())).expect("load");
        assert_eq!(config.host.fiber_count(), 1);
        assert_eq!(load_config(None).expect("default"), EngineConfig::default());
    }
}
