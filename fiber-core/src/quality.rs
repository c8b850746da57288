//! Quality tiers and the shared performance state.

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

/// Discrete rendering-cost level.
///
/// Ordered `Low < Medium < High`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    /// Fewest fibers, no glow.
    Low,
    /// Reduced fiber count and glow.
    Medium,
    /// Everything animated with full glow.
    #[default]
    High,
}

impl QualityTier {
    /// One step down. `Low` stays `Low`.
    #[must_use]
    pub fn demote(self) -> Self {
        match self {
            Self::High => Self::Medium,
            Self::Medium | Self::Low => Self::Low,
        }
    }

    /// One step up. `High` stays `High`.
    #[must_use]
    pub fn promote(self) -> Self {
        match self {
            Self::Low => Self::Medium,
            Self::Medium | Self::High => Self::High,
        }
    }

    /// How many of `total` fibers to animate at this tier.
    #[must_use]
    pub fn fiber_budget(self, total: usize) -> usize {
        match self {
            Self::High => total,
            Self::Medium => (total * 3).div_ceil(5),
            Self::Low => (total * 2).div_ceil(5),
        }
    }

    /// Multiplier applied to glow blur radius.
    #[must_use]
    pub fn glow_scale(self) -> f64 {
        match self {
            Self::High => 1.0,
            Self::Medium => 0.5,
            Self::Low => 0.0,
        }
    }

    /// Multiplier applied to node spacing during generation.
    #[must_use]
    pub fn node_spacing_scale(self) -> f64 {
        match self {
            Self::High => 1.0,
            Self::Medium => 1.25,
            Self::Low => 1.5,
        }
    }

    /// Lower-case name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl std::fmt::Display for QualityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for QualityTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(format!("unknown quality tier: {other}")),
        }
    }
}

/// Battery charge reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryStatus {
    /// Charge level (0.0 to 1.0).
    pub level: f64,
    /// Whether the device is plugged in.
    pub charging: bool,
}

impl BatteryStatus {
    /// Create a battery reading.
    #[must_use]
    pub const fn new(level: f64, charging: bool) -> Self {
        Self { level, charging }
    }
}

/// Snapshot of the published quality state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceState {
    /// Current tier.
    pub tier: QualityTier,
    /// Last battery reading, if the capability exists.
    pub battery: Option<BatteryStatus>,
    /// Mean frame time of the last full window, in milliseconds.
    pub mean_frame_ms: Option<f64>,
    /// Tier steps currently attributable to low battery.
    pub battery_demotions: u8,
}

impl PerformanceState {
    /// Initial state before any signal arrives.
    #[must_use]
    pub const fn new(tier: QualityTier) -> Self {
        Self {
            tier,
            battery: None,
            mean_frame_ms: None,
            battery_demotions: 0,
        }
    }
}

impl Default for PerformanceState {
    fn default() -> Self {
        Self::new(QualityTier::default())
    }
}

/// Shared handle to the published [`PerformanceState`].
///
/// Cloning shares the same state. Readers always see a whole value: writers
/// replace the state instead of mutating it in place.
#[derive(Debug, Clone, Default)]
pub struct QualityHandle {
    state: Arc<RwLock<PerformanceState>>,
}

impl QualityHandle {
    /// Create a handle starting at `tier`.
    #[must_use]
    pub fn new(tier: QualityTier) -> Self {
        Self {
            state: Arc::new(RwLock::new(PerformanceState::new(tier))),
        }
    }

    /// Current tier.
    #[must_use]
    pub fn tier(&self) -> QualityTier {
        self.snapshot().tier
    }

    /// Copy of the whole state.
    #[must_use]
    pub fn snapshot(&self) -> PerformanceState {
        *self
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the whole state.
    pub(crate) fn publish(&self, next: PerformanceState) {
        let mut state = self
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *state = next;
    }
}
