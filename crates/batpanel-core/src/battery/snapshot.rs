//! Normalized battery snapshots.

use serde::{Deserialize, Serialize};

use super::capability::BatteryHandle;
use super::display::rounded_pct_value;

/// A time estimate in whole seconds, or no estimate at all.
///
/// Serializes as a number or `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<u64>", into = "Option<u64>")]
pub enum TimeEstimate {
    Known(u64),
    Unknown,
}

impl TimeEstimate {
    /// Normalize a raw platform value.
    ///
    /// Infinite, NaN and negative values mean "no estimate".
    pub fn from_raw(seconds: f64) -> Self {
        if seconds.is_finite() && seconds >= 0.0 {
            TimeEstimate::Known(seconds.floor() as u64)
        } else {
            TimeEstimate::Unknown
        }
    }

    pub fn seconds(self) -> Option<u64> {
        match self {
            TimeEstimate::Known(s) => Some(s),
            TimeEstimate::Unknown => None,
        }
    }

    pub fn is_known(self) -> bool {
        matches!(self, TimeEstimate::Known(_))
    }
}

impl From<Option<u64>> for TimeEstimate {
    fn from(value: Option<u64>) -> Self {
        match value {
            Some(s) => TimeEstimate::Known(s),
            None => TimeEstimate::Unknown,
        }
    }
}

impl From<TimeEstimate> for Option<u64> {
    fn from(value: TimeEstimate) -> Self {
        value.seconds()
    }
}

/// One self-consistent read of the battery fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatterySnapshot {
    /// Fraction of full charge, `0.0..=1.0`.
    pub level: f64,
    pub charging: bool,
    pub charging_time: TimeEstimate,
    pub discharging_time: TimeEstimate,
}

impl BatterySnapshot {
    /// Build a snapshot from raw platform values.
    pub fn from_raw(level: f64, charging: bool, charging_time: f64, discharging_time: f64) -> Self {
        Self {
            level: clamp_level(level),
            charging,
            charging_time: TimeEstimate::from_raw(charging_time),
            discharging_time: TimeEstimate::from_raw(discharging_time),
        }
    }

    /// Read all four fields from `handle` at once.
    pub fn read(handle: &dyn BatteryHandle) -> Self {
        Self::from_raw(
            handle.level(),
            handle.charging(),
            handle.charging_time(),
            handle.discharging_time(),
        )
    }

    /// Whole percent, `0..=100`.
    pub fn percentage(&self) -> u8 {
        rounded_pct_value(self.level * 100.0)
    }
}

fn clamp_level(level: f64) -> f64 {
    if level.is_nan() {
        return 0.0;
    }
    level.clamp(0.0, 1.0)
}
