//! Structured engine events and listener subscriptions.

use serde::Serialize;

use crate::{QualityTier, Viewport};

/// Why the quality tier changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityReason {
    /// Battery below threshold and not charging.
    LowBattery,
    /// Charging restored tiers lost to low battery.
    Charging,
    /// Mean frame time exceeded the budget.
    SlowFrames,
}

/// Observable engine event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    /// The host entered `Running`.
    Started {
        /// Surface size at start.
        viewport: Viewport,
        /// Number of fibers constructed.
        fibers: usize,
        /// Tier used for generation.
        tier: QualityTier,
    },
    /// The surface was resized.
    Resized {
        /// New surface size.
        viewport: Viewport,
        /// Whether paths were regenerated.
        regenerated: bool,
    },
    /// The quality tier changed.
    QualityChanged {
        /// Previous tier.
        from: QualityTier,
        /// New tier.
        to: QualityTier,
        /// Signal that caused it.
        reason: QualityReason,
    },
    /// The host was torn down.
    Disposed {
        /// Frames rendered over the host's lifetime.
        frames: u64,
    },
}

/// Receiver for [`EngineEvent`]s.
pub trait EngineObserver {
    /// Handle one event.
    fn on_event(&self, event: &EngineEvent);
}

/// Observer that forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl EngineObserver for TracingObserver {
    fn on_event(&self, event: &EngineEvent) {
        match event {
            EngineEvent::Started {
                viewport,
                fibers,
                tier,
            } => tracing::debug!(%viewport, fibers, %tier, "Fiber host started"),
            EngineEvent::Resized {
                viewport,
                regenerated,
            } => tracing::debug!(%viewport, regenerated, "Fiber surface resized"),
            EngineEvent::QualityChanged { from, to, reason } => {
                tracing::info!(%from, %to, ?reason, "Animation quality changed");
            }
            EngineEvent::Disposed { frames } => {
                tracing::debug!(frames, "Fiber host disposed");
            }
        }
    }
}

/// A registered listener that can be detached.
pub trait Subscription {
    /// Detach the listener. Must be safe to call more than once.
    fn unsubscribe(&mut self);
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn test_event_serializes_with_tag() {
        let event = EngineEvent::QualityChanged {
            from: QualityTier::High,
            to: QualityTier::Medium,
            reason: QualityReason::LowBattery,
        };
        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(json["event"], "quality_changed");
        assert_eq!(json["reason"], "low_battery");
        assert_eq!(json["to"], "medium");
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            let bytes = self.0.lock().map(|b| b.clone()).unwrap_or_default();
            String::from_utf8_lossy(&bytes).into_owned()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if let Ok(mut bytes) = self.0.lock() {
                bytes.extend_from_slice(buf);
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_tracing_observer_logs_each_event() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let observer = TracingObserver;
            observer.on_event(&EngineEvent::Disposed { frames: 3 });
            observer.on_event(&EngineEvent::Resized {
                viewport: Viewport::new(10, 10),
                regenerated: false,
            });
            observer.on_event(&EngineEvent::QualityChanged {
                from: QualityTier::High,
                to: QualityTier::Low,
                reason: QualityReason::LowBattery,
            });
        });

        let text = captured.text();
        assert!(text.contains("Fiber host disposed"));
        assert!(text.contains("frames=3"));
        assert!(text.contains("Fiber surface resized"));
        assert!(text.contains("regenerated=false"));
        assert!(text.contains("Animation quality changed"));
        assert!(text.contains("INFO"));
    }
}
