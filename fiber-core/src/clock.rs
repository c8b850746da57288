//! Frame scheduling.

use serde::{Deserialize, Serialize};

/// Token for an outstanding frame request, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRequest(u64);

impl FrameRequest {
    /// Wrap a platform request id.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The platform request id.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// "Request next frame" and "cancel" primitives.
///
/// Implementations invoke the host's tick once per request, asynchronously,
/// and never while a previous tick is still running.
pub trait FrameClock {
    /// Schedule one frame. `None` when scheduling is unavailable.
    fn request_frame(&mut self) -> Option<FrameRequest>;

    /// Cancel a request that has not fired yet.
    fn cancel_frame(&mut self, request: FrameRequest);

    /// Drop any callback resources. Called once on disposal.
    fn release(&mut self) {}
}

/// Clock driven explicitly by the caller.
///
/// Requests are recorded but never fire on their own; the caller invokes the
/// host's tick to single-step the animation.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    next_id: u64,
    pending: Option<FrameRequest>,
    requests: u64,
    cancellations: u64,
    released: bool,
    unavailable: bool,
}

impl ManualClock {
    /// Create a clock that accepts requests.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock that refuses every request.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// The request that would fire next.
    #[must_use]
    pub fn pending(&self) -> Option<FrameRequest> {
        self.pending
    }

    /// Total requests accepted.
    #[must_use]
    pub fn requests(&self) -> u64 {
        self.requests
    }

    /// Total cancellations received.
    #[must_use]
    pub fn cancellations(&self) -> u64 {
        self.cancellations
    }

    /// Whether [`FrameClock::release`] has been called.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl FrameClock for ManualClock {
    fn request_frame(&mut self) -> Option<FrameRequest> {
        if self.unavailable {
            return None;
        }
        self.next_id += 1;
        self.requests += 1;
        let request = FrameRequest::new(self.next_id);
        self.pending = Some(request);
        Some(request)
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.cancellations += 1;
        if self.pending == Some(request) {
            self.pending = None;
        }
    }

    fn release(&mut self) {
        self.released = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_counts() {
        let mut clock = ManualClock::new();
        let first = clock.request_frame().expect("request");
        let second = clock.request_frame().expect("request");
        assert_ne!(first, second);
        assert_eq!(clock.requests(), 2);
        assert_eq!(clock.pending(), Some(second));

        clock.cancel_frame(first);
        assert_eq!(clock.pending(), Some(second));
        clock.cancel_frame(second);
        assert_eq!(clock.pending(), None);
        assert_eq!(clock.cancellations(), 2);
    }

    #[test]
    fn test_unavailable_clock_refuses() {
        let mut clock = ManualClock::unavailable();
        assert!(clock.request_frame().is_none());
        assert_eq!(clock.requests(), 0);
    }
}
