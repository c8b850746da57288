//! Canvas host: owns the surface, the fibers and the frame loop.
//!
//! ```text
//! Uninitialized ──start──▶ Running ──dispose──▶ Disposed
//!       │                                ▲
//!       └────────────dispose─────────────┘
//! ```
//!
//! Each [`tick`](CanvasHost::tick) clears the surface with a translucent
//! trail fill, updates then draws every fiber within the current tier's
//! budget, and requests the next frame. Disposal cancels the outstanding
//! request so no callback ever runs against a released surface.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::clock::{FrameClock, FrameRequest};
use crate::error::{EngineError, EngineResult};
use crate::event::{EngineEvent, EngineObserver, Subscription, TracingObserver};
use crate::fiber::Fiber;
use crate::generator::{generate_network, PathConfig};
use crate::quality::{QualityHandle, QualityTier};
use crate::surface::RenderSurface;
use crate::Viewport;

/// Host tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Number of main paths.
    pub main_paths: usize,
    /// Number of branch paths.
    pub branch_paths: usize,
    /// Fill applied each frame to fade previous frames.
    pub trail_color: String,
    /// Rebuild paths for the new size on resize.
    pub regenerate_on_resize: bool,
    /// Stroke colors; empty selects the default palette.
    pub palette: Vec<String>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            main_paths: 3,
            branch_paths: 2,
            trail_color: "rgba(0, 0, 0, 0.05)".to_string(),
            regenerate_on_resize: false,
            palette: Vec::new(),
        }
    }
}

impl HostConfig {
    /// Total fibers the host builds.
    #[must_use]
    pub fn fiber_count(&self) -> usize {
        self.main_paths + self.branch_paths
    }
}

/// Host lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostState {
    /// Constructed, not yet started.
    Uninitialized,
    /// Animating.
    Running,
    /// Torn down; terminal.
    Disposed,
}

/// Summary of one rendered frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Frame number, starting at 1.
    pub frame: u64,
    /// Tier read at the start of the tick.
    pub tier: QualityTier,
    /// Fibers updated and drawn.
    pub animated: usize,
    /// Timestamp passed to the tick.
    pub timestamp_ms: f64,
}

/// Owns the drawing surface, the fibers and the frame scheduling.
pub struct CanvasHost<S: RenderSurface, C: FrameClock> {
    config: HostConfig,
    state: HostState,
    surface: Option<S>,
    clock: C,
    quality: QualityHandle,
    observer: Rc<dyn EngineObserver>,
    fibers: Vec<Fiber>,
    pending: Option<FrameRequest>,
    subscriptions: Vec<Box<dyn Subscription>>,
    is_mobile: bool,
    frame_count: u64,
}

impl<S: RenderSurface, C: FrameClock> CanvasHost<S, C> {
    /// Create a host that reports lifecycle events through `tracing`.
    #[must_use]
    pub fn new(config: HostConfig, clock: C, quality: QualityHandle) -> Self {
        Self::with_observer(config, clock, quality, Rc::new(TracingObserver))
    }

    /// Create a host with a custom event observer.
    #[must_use]
    pub fn with_observer(
        config: HostConfig,
        clock: C,
        quality: QualityHandle,
        observer: Rc<dyn EngineObserver>,
    ) -> Self {
        Self {
            config,
            state: HostState::Uninitialized,
            surface: None,
            clock,
            quality,
            observer,
            fibers: Vec::new(),
            pending: None,
            subscriptions: Vec::new(),
            is_mobile: false,
            frame_count: 0,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> HostState {
        self.state
    }

    /// Fibers in construction order.
    #[must_use]
    pub fn fibers(&self) -> &[Fiber] {
        &self.fibers
    }

    /// The drawing surface, while running.
    #[must_use]
    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    /// Mutable access to the drawing surface, while running.
    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    /// The frame clock.
    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Outstanding frame request.
    #[must_use]
    pub fn pending_frame(&self) -> Option<FrameRequest> {
        self.pending
    }

    /// Frames rendered so far.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Host configuration.
    #[must_use]
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Acquire the surface, build the fibers and schedule the first frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is not `Uninitialized`, if `surface` is
    /// `None`, or if the clock cannot schedule. The host stays
    /// `Uninitialized` (or `Disposed`) in every error case.
    pub fn start(&mut self, surface: Option<S>, is_mobile: bool) -> EngineResult<()> {
        if self.state != HostState::Uninitialized {
            return Err(EngineError::InvalidTransition {
                from: self.state,
                action: "start",
            });
        }
        let surface = surface.ok_or(EngineError::SurfaceUnavailable)?;
        let request = self
            .clock
            .request_frame()
            .ok_or(EngineError::FrameClockUnavailable)?;

        let viewport = surface.size();
        let tier = self.quality.tier();
        self.is_mobile = is_mobile;
        self.fibers = self.build_fibers(viewport, tier);
        self.surface = Some(surface);
        self.pending = Some(request);
        self.state = HostState::Running;

        self.observer.on_event(&EngineEvent::Started {
            viewport,
            fibers: self.fibers.len(),
            tier,
        });
        Ok(())
    }

    fn build_fibers(&self, viewport: Viewport, tier: QualityTier) -> Vec<Fiber> {
        let config = PathConfig::from_viewport(viewport, self.is_mobile, tier);
        generate_network(
            &config,
            &self.config.palette,
            self.config.main_paths,
            self.config.branch_paths,
        )
        .into_iter()
        .map(Fiber::new)
        .collect()
    }

    /// Render one frame and schedule the next.
    ///
    /// Does nothing unless the host is `Running`.
    pub fn tick(&mut self, timestamp_ms: f64) -> Option<TickReport> {
        if self.state != HostState::Running {
            return None;
        }
        self.pending = None;
        let surface = self.surface.as_mut()?;

        let tier = self.quality.tier();
        let bounds = surface.size().bounds();
        surface.fill_rect(bounds, &self.config.trail_color);

        let budget = tier.fiber_budget(self.fibers.len());
        for fiber in self.fibers.iter_mut().take(budget) {
            fiber.update();
            fiber.draw(surface, tier);
        }

        self.frame_count += 1;
        self.pending = self.clock.request_frame();
        if self.pending.is_none() {
            tracing::warn!("Frame clock stopped scheduling; animation halted");
        }

        tracing::trace!(frame = self.frame_count, %tier, animated = budget, "Tick");
        Some(TickReport {
            frame: self.frame_count,
            tier,
            animated: budget,
            timestamp_ms,
        })
    }

    /// Resize the surface in place.
    ///
    /// Fibers keep their positions unless `regenerate_on_resize` is set.
    pub fn resize(&mut self, viewport: Viewport) {
        if self.state != HostState::Running {
            return;
        }
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        surface.resize(viewport);

        let regenerated = self.config.regenerate_on_resize;
        if regenerated {
            let tier = self.quality.tier();
            self.fibers = self.build_fibers(viewport, tier);
        }
        self.observer.on_event(&EngineEvent::Resized {
            viewport,
            regenerated,
        });
    }

    /// Hand over an external listener to detach on disposal.
    ///
    /// A subscription attached after disposal is detached immediately.
    pub fn attach(&mut self, mut subscription: Box<dyn Subscription>) {
        if self.state == HostState::Disposed {
            subscription.unsubscribe();
            return;
        }
        self.subscriptions.push(subscription);
    }

    /// Cancel the pending frame, detach listeners and release the surface.
    ///
    /// Safe to call any number of times.
    pub fn dispose(&mut self) {
        if let Some(request) = self.pending.take() {
            self.clock.cancel_frame(request);
        }
        for mut subscription in self.subscriptions.drain(..) {
            subscription.unsubscribe();
        }
        if self.state == HostState::Disposed {
            return;
        }

        self.clock.release();
        self.fibers.clear();
        self.surface = None;
        self.state = HostState::Disposed;
        self.observer.on_event(&EngineEvent::Disposed {
            frames: self.frame_count,
        });
    }
}

impl<S: RenderSurface, C: FrameClock> Drop for CanvasHost<S, C> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<S: RenderSurface, C: FrameClock> std::fmt::Debug for CanvasHost<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasHost")
            .field("state", &self.state)
            .field("fibers", &self.fibers.len())
            .field("pending", &self.pending)
            .field("frame_count", &self.frame_count)
            .finish_non_exhaustive()
    }
}
