//! # Fiber Core
//!
//! Engine for the animated fiber network background.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              CanvasHost                     │
//! │  Uninitialized → Running → Disposed         │
//! ├──────────────────────┬──────────────────────┤
//! │  Path Generator      │  Performance Monitor │
//! │  - main / branch     │  - battery policy    │
//! │  - deterministic     │  - frame-time window │
//! ├──────────────────────┼──────────────────────┤
//! │  Fiber               │  QualityHandle       │
//! │  - update / draw     │  - shared tier       │
//! └──────────────────────┴──────────────────────┘
//!          │ RenderSurface        │ FrameClock
//! ```
//!
//! Platform code supplies a [`RenderSurface`], a [`FrameClock`] and an
//! optional [`BatterySource`]; everything else lives here.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod fiber;
pub mod generator;
pub mod geometry;
pub mod host;
pub mod monitor;
pub mod path;
pub mod quality;
pub mod surface;

pub use clock::{FrameClock, FrameRequest, ManualClock};
pub use config::{ConfigError, EngineConfig};
pub use error::{EngineError, EngineResult};
pub use event::{EngineEvent, EngineObserver, QualityReason, Subscription, TracingObserver};
pub use fiber::Fiber;
pub use generator::{
    default_palette, generate_branch_path, generate_main_path, generate_network, PathConfig,
    DEFAULT_PALETTE,
};
pub use geometry::{Point, Rect, Viewport};
pub use host::{CanvasHost, HostConfig, HostState, TickReport};
pub use monitor::{BatterySource, MonitorConfig, PerformanceMonitor};
pub use path::{Direction, Node, PathDescriptor, PathKind, PathLayout};
pub use quality::{BatteryStatus, PerformanceState, QualityHandle, QualityTier};
pub use surface::{DrawCommand, HeadlessSurface, RenderSurface, StrokeStyle};

/// Fiber core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
