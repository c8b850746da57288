//! Performance monitor: turns device signals into a quality tier.
//!
//! Two signals demote the tier one step at a time:
//!
//! - **Battery**: level below the threshold while not charging. Evaluated once
//!   when a [`BatterySource`] is attached and again on every change
//!   notification. Charging restores the steps lost to low battery.
//! - **Frame time**: mean frame delta over a full rolling window above the
//!   frame budget. Never undone automatically.
//!
//! The tier is published through a [`QualityHandle`] that the render loop
//! reads once per tick.

use std::collections::VecDeque;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::event::{EngineEvent, EngineObserver, QualityReason, Subscription, TracingObserver};
use crate::quality::{BatteryStatus, PerformanceState, QualityHandle, QualityTier};

/// Monitor tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Tier before any signal arrives; also the promotion ceiling.
    pub default_tier: QualityTier,
    /// Battery level below which the tier is demoted.
    pub low_battery_threshold: f64,
    /// Restore battery demotions once charging starts.
    pub promote_on_charge: bool,
    /// Mean frame time above which the tier is demoted, in milliseconds.
    pub frame_budget_ms: f64,
    /// Number of frame deltas averaged.
    pub frame_window: usize,
    /// Deltas longer than this are treated as pauses and discarded.
    pub idle_gap_ms: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            default_tier: QualityTier::High,
            low_battery_threshold: 0.2,
            promote_on_charge: true,
            frame_budget_ms: 1000.0 / 40.0,
            frame_window: 90,
            idle_gap_ms: 250.0,
        }
    }
}

/// A device battery that reports charge and change notifications.
pub trait BatterySource {
    /// Current reading.
    fn status(&self) -> BatteryStatus;

    /// Register `callback` for level and charging changes.
    fn on_change(&self, callback: Box<dyn FnMut(BatteryStatus)>) -> Box<dyn Subscription>;
}

/// Policy shared between the monitor and its battery callback.
#[derive(Clone)]
struct QualityController {
    handle: QualityHandle,
    config: MonitorConfig,
    observer: Rc<dyn EngineObserver>,
}

impl QualityController {
    fn evaluate_battery(&self, status: BatteryStatus) -> QualityTier {
        let prev = self.handle.snapshot();
        let mut next = prev;
        next.battery = Some(status);

        let mut reason = QualityReason::LowBattery;
        if status.level < self.config.low_battery_threshold && !status.charging {
            let demoted = prev.tier.demote();
            if demoted != prev.tier {
                next.tier = demoted;
                next.battery_demotions = prev.battery_demotions.saturating_add(1);
            }
        } else if status.charging && self.config.promote_on_charge && prev.battery_demotions > 0 {
            let mut tier = prev.tier;
            for _ in 0..prev.battery_demotions {
                tier = tier.promote();
            }
            next.tier = tier.min(self.config.default_tier.max(prev.tier));
            next.battery_demotions = 0;
            reason = QualityReason::Charging;
        }

        self.handle.publish(next);
        self.report(prev.tier, next.tier, reason);
        next.tier
    }

    fn evaluate_frames(&self, mean_frame_ms: f64) -> bool {
        let prev = self.handle.snapshot();
        let mut next = prev;
        next.mean_frame_ms = Some(mean_frame_ms);

        let over_budget = mean_frame_ms > self.config.frame_budget_ms;
        if over_budget {
            next.tier = prev.tier.demote();
        }

        self.handle.publish(next);
        self.report(prev.tier, next.tier, QualityReason::SlowFrames);
        over_budget
    }

    fn report(&self, from: QualityTier, to: QualityTier, reason: QualityReason) {
        if from != to {
            self.observer
                .on_event(&EngineEvent::QualityChanged { from, to, reason });
        }
    }
}

/// Rolling window of frame deltas.
#[derive(Debug, Clone)]
struct FrameWindow {
    last_timestamp: Option<f64>,
    deltas: VecDeque<f64>,
    capacity: usize,
    idle_gap_ms: f64,
}

impl FrameWindow {
    fn new(capacity: usize, idle_gap_ms: f64) -> Self {
        let capacity = capacity.max(1);
        Self {
            last_timestamp: None,
            deltas: VecDeque::with_capacity(capacity),
            capacity,
            idle_gap_ms,
        }
    }

    /// Record a timestamp; returns the window mean once the window is full.
    #[allow(clippy::cast_precision_loss)]
    fn push(&mut self, timestamp_ms: f64) -> Option<f64> {
        let last = self.last_timestamp.replace(timestamp_ms)?;
        let delta = timestamp_ms - last;
        if !delta.is_finite() || delta <= 0.0 || delta > self.idle_gap_ms {
            return None;
        }

        self.deltas.push_back(delta);
        if self.deltas.len() > self.capacity {
            self.deltas.pop_front();
        }
        if self.deltas.len() < self.capacity {
            return None;
        }
        Some(self.deltas.iter().sum::<f64>() / self.deltas.len() as f64)
    }

    fn clear(&mut self) {
        self.deltas.clear();
    }
}

/// Observes battery and frame timing and publishes the quality tier.
///
/// The attached battery source is owned by the monitor and released by
/// [`dispose`](Self::dispose) or on drop.
pub struct PerformanceMonitor {
    controller: QualityController,
    battery: Option<Box<dyn BatterySource>>,
    subscription: Option<Box<dyn Subscription>>,
    frames: FrameWindow,
}

impl PerformanceMonitor {
    /// Create a monitor that reports transitions through `tracing`.
    #[must_use]
    pub fn new(config: MonitorConfig) -> Self {
        Self::with_observer(config, Rc::new(TracingObserver))
    }

    /// Create a monitor with a custom event observer.
    #[must_use]
    pub fn with_observer(config: MonitorConfig, observer: Rc<dyn EngineObserver>) -> Self {
        Self {
            controller: QualityController {
                handle: QualityHandle::new(config.default_tier),
                config,
                observer,
            },
            battery: None,
            subscription: None,
            frames: FrameWindow::new(config.frame_window, config.idle_gap_ms),
        }
    }

    /// Shared read handle for the render loop.
    #[must_use]
    pub fn handle(&self) -> QualityHandle {
        self.controller.handle.clone()
    }

    /// Current tier.
    #[must_use]
    pub fn tier(&self) -> QualityTier {
        self.controller.handle.tier()
    }

    /// Current published state.
    #[must_use]
    pub fn snapshot(&self) -> PerformanceState {
        self.controller.handle.snapshot()
    }

    /// Monitor configuration.
    #[must_use]
    pub fn config(&self) -> &MonitorConfig {
        &self.controller.config
    }

    /// Whether a battery source is attached.
    #[must_use]
    pub fn has_battery(&self) -> bool {
        self.battery.is_some()
    }

    /// Take ownership of a battery source, subscribe to its changes and
    /// evaluate it once immediately. Replaces any previous source.
    pub fn attach_battery<B: BatterySource + 'static>(&mut self, source: B) {
        self.detach_battery();

        let controller = self.controller.clone();
        let subscription = source.on_change(Box::new(move |status| {
            controller.evaluate_battery(status);
        }));
        let status = source.status();
        tracing::debug!(
            level = status.level,
            charging = status.charging,
            "Battery monitor attached"
        );

        self.subscription = Some(subscription);
        self.battery = Some(Box::new(source));
        self.controller.evaluate_battery(status);
    }

    /// Apply the battery policy to one reading.
    pub fn evaluate_battery(&self, status: BatteryStatus) -> QualityTier {
        self.controller.evaluate_battery(status)
    }

    /// Record the timestamp of a rendered frame.
    ///
    /// Returns true when this frame caused a demotion.
    pub fn record_frame(&mut self, timestamp_ms: f64) -> bool {
        let Some(mean) = self.frames.push(timestamp_ms) else {
            return false;
        };
        let demoted = self.controller.evaluate_frames(mean);
        if demoted {
            tracing::debug!(mean_frame_ms = mean, "Frame budget exceeded");
            self.frames.clear();
        }
        demoted
    }

    /// Detach listeners and release the battery source. Idempotent.
    pub fn dispose(&mut self) {
        self.detach_battery();
    }

    fn detach_battery(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        if self.battery.take().is_some() {
            tracing::debug!("Battery monitor detached");
        }
    }
}

impl Drop for PerformanceMonitor {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for PerformanceMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerformanceMonitor")
            .field("state", &self.snapshot())
            .field("config", &self.controller.config)
            .field("has_battery", &self.has_battery())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    type Callback = Box<dyn FnMut(BatteryStatus)>;

    #[derive(Default)]
    struct BatteryInner {
        status: Option<BatteryStatus>,
        callbacks: Vec<Option<Callback>>,
    }

    #[derive(Clone, Default)]
    struct SimulatedBattery(Rc<RefCell<BatteryInner>>);

    impl SimulatedBattery {
        fn new(level: f64, charging: bool) -> Self {
            let battery = Self::default();
            battery.0.borrow_mut().status = Some(BatteryStatus::new(level, charging));
            battery
        }

        fn set(&self, level: f64, charging: bool) {
            let status = BatteryStatus::new(level, charging);
            let mut callbacks = {
                let mut inner = self.0.borrow_mut();
                inner.status = Some(status);
                std::mem::take(&mut inner.callbacks)
            };
            for callback in callbacks.iter_mut().flatten() {
                callback(status);
            }
            self.0.borrow_mut().callbacks = callbacks;
        }

        fn listeners(&self) -> usize {
            self.0.borrow().callbacks.iter().flatten().count()
        }
    }

    struct SlotSubscription {
        battery: SimulatedBattery,
        slot: usize,
    }

    impl Subscription for SlotSubscription {
        fn unsubscribe(&mut self) {
            if let Some(slot) = self.battery.0.borrow_mut().callbacks.get_mut(self.slot) {
                *slot = None;
            }
        }
    }

    impl BatterySource for SimulatedBattery {
        fn status(&self) -> BatteryStatus {
            self.0
                .borrow()
                .status
                .unwrap_or(BatteryStatus::new(1.0, true))
        }

        fn on_change(&self, callback: Box<dyn FnMut(BatteryStatus)>) -> Box<dyn Subscription> {
            let mut inner = self.0.borrow_mut();
            inner.callbacks.push(Some(callback));
            Box::new(SlotSubscription {
                battery: self.clone(),
                slot: inner.callbacks.len() - 1,
            })
        }
    }

    #[derive(Default)]
    struct RecordingObserver(RefCell<Vec<EngineEvent>>);

    impl EngineObserver for RecordingObserver {
        fn on_event(&self, event: &EngineEvent) {
            self.0.borrow_mut().push(event.clone());
        }
    }

    #[test]
    fn test_low_battery_demotes_one_step_per_evaluation() {
        let monitor = PerformanceMonitor::new(MonitorConfig::default());
        assert_eq!(monitor.tier(), QualityTier::High);

        let low = BatteryStatus::new(0.1, false);
        assert_eq!(monitor.evaluate_battery(low), QualityTier::Medium);
        assert_eq!(monitor.evaluate_battery(low), QualityTier::Low);
        assert_eq!(monitor.evaluate_battery(low), QualityTier::Low);
        assert_eq!(monitor.snapshot().battery_demotions, 2);
    }

    #[test]
    fn test_healthy_battery_keeps_tier() {
        let monitor = PerformanceMonitor::new(MonitorConfig::default());
        monitor.evaluate_battery(BatteryStatus::new(0.1, false));
        assert_eq!(monitor.tier(), QualityTier::Medium);

        assert_eq!(
            monitor.evaluate_battery(BatteryStatus::new(0.5, false)),
            QualityTier::Medium
        );
        assert_eq!(
            monitor.snapshot().battery,
            Some(BatteryStatus::new(0.5, false))
        );
    }

    #[test]
    fn test_low_but_charging_keeps_tier() {
        let monitor = PerformanceMonitor::new(MonitorConfig::default());
        assert_eq!(
            monitor.evaluate_battery(BatteryStatus::new(0.05, true)),
            QualityTier::High
        );
    }

    #[test]
    fn test_attach_evaluates_eagerly_and_on_change() {
        let battery = SimulatedBattery::new(0.1, false);
        let mut monitor = PerformanceMonitor::new(MonitorConfig::default());
        monitor.attach_battery(battery.clone());

        assert!(monitor.has_battery());
        assert_eq!(monitor.tier(), QualityTier::Medium);
        assert_eq!(battery.listeners(), 1);

        battery.set(0.09, false);
        assert_eq!(monitor.tier(), QualityTier::Low);
    }

    #[test]
    fn test_charging_restores_battery_demotions() {
        let battery = SimulatedBattery::new(0.1, false);
        let mut monitor = PerformanceMonitor::new(MonitorConfig::default());
        monitor.attach_battery(battery.clone());
        battery.set(0.1, false);
        assert_eq!(monitor.tier(), QualityTier::Low);

        battery.set(0.1, true);
        assert_eq!(monitor.tier(), QualityTier::High);
        assert_eq!(monitor.snapshot().battery_demotions, 0);
    }

    #[test]
    fn test_promotion_can_be_disabled() {
        let config = MonitorConfig {
            promote_on_charge: false,
            ..MonitorConfig::default()
        };
        let monitor = PerformanceMonitor::new(config);
        monitor.evaluate_battery(BatteryStatus::new(0.1, false));
        monitor.evaluate_battery(BatteryStatus::new(0.1, true));
        assert_eq!(monitor.tier(), QualityTier::Medium);
    }

    #[test]
    fn test_promotion_never_exceeds_default_tier() {
        let config = MonitorConfig {
            default_tier: QualityTier::Medium,
            ..MonitorConfig::default()
        };
        let monitor = PerformanceMonitor::new(config);
        assert_eq!(monitor.tier(), QualityTier::Medium);

        monitor.evaluate_battery(BatteryStatus::new(0.1, false));
        assert_eq!(monitor.tier(), QualityTier::Low);
        monitor.evaluate_battery(BatteryStatus::new(0.1, true));
        assert_eq!(monitor.tier(), QualityTier::Medium);
    }

    #[test]
    fn test_slow_frames_demote() {
        let mut monitor = PerformanceMonitor::new(MonitorConfig {
            frame_window: 10,
            ..MonitorConfig::default()
        });

        let mut demotions = 0;
        for i in 0..=10 {
            if monitor.record_frame(f64::from(i) * 40.0) {
                demotions += 1;
            }
        }
        assert_eq!(demotions, 1);
        assert_eq!(monitor.tier(), QualityTier::Medium);
        assert_eq!(monitor.snapshot().mean_frame_ms, Some(40.0));
    }

    #[test]
    fn test_fast_frames_and_idle_gaps_do_not_demote() {
        let mut monitor = PerformanceMonitor::new(MonitorConfig {
            frame_window: 10,
            ..MonitorConfig::default()
        });

        let mut t = 0.0;
        for i in 0..50 {
            // a long pause every 7 frames, as when the tab is hidden
            t += if i % 7 == 6 { 5_000.0 } else { 16.0 };
            assert!(!monitor.record_frame(t));
        }
        assert_eq!(monitor.tier(), QualityTier::High);
        let mean = monitor.snapshot().mean_frame_ms.expect("window filled");
        assert!((mean - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_charging_does_not_undo_frame_demotion() {
        let mut monitor = PerformanceMonitor::new(MonitorConfig {
            frame_window: 2,
            ..MonitorConfig::default()
        });
        for i in 0..3 {
            monitor.record_frame(f64::from(i) * 100.0);
        }
        assert_eq!(monitor.tier(), QualityTier::Medium);

        monitor.evaluate_battery(BatteryStatus::new(0.9, true));
        assert_eq!(monitor.tier(), QualityTier::Medium);
    }

    #[test]
    fn test_dispose_detaches_listener() {
        let battery = SimulatedBattery::new(0.9, false);
        let mut monitor = PerformanceMonitor::new(MonitorConfig::default());
        monitor.attach_battery(battery.clone());
        assert_eq!(battery.listeners(), 1);

        monitor.dispose();
        monitor.dispose();
        assert!(!monitor.has_battery());
        assert_eq!(battery.listeners(), 0);

        battery.set(0.05, false);
        assert_eq!(monitor.tier(), QualityTier::High);
    }

    #[test]
    fn test_drop_detaches_listener() {
        let battery = SimulatedBattery::new(0.9, false);
        {
            let mut monitor = PerformanceMonitor::new(MonitorConfig::default());
            monitor.attach_battery(battery.clone());
        }
        assert_eq!(battery.listeners(), 0);
    }

    #[test]
    fn test_no_battery_keeps_default() {
        let monitor = PerformanceMonitor::new(MonitorConfig::default());
        assert!(!monitor.has_battery());
        assert_eq!(monitor.tier(), QualityTier::High);
        assert_eq!(monitor.snapshot().battery, None);
    }

    #[test]
    fn test_transitions_are_reported() {
        let observer = Rc::new(RecordingObserver::default());
        let monitor = PerformanceMonitor::with_observer(MonitorConfig::default(), observer.clone());
        monitor.evaluate_battery(BatteryStatus::new(0.1, false));
        monitor.evaluate_battery(BatteryStatus::new(0.5, false));
        monitor.evaluate_battery(BatteryStatus::new(0.5, true));

        let events = observer.0.borrow();
        assert_eq!(
            *events,
            vec![
                EngineEvent::QualityChanged {
                    from: QualityTier::High,
                    to: QualityTier::Medium,
                    reason: QualityReason::LowBattery,
                },
                EngineEvent::QualityChanged {
                    from: QualityTier::Medium,
                    to: QualityTier::High,
                    reason: QualityReason::Charging,
                },
            ]
        );
    }
}
