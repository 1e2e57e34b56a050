//! Derived display state for the battery widget.
//!
//! Everything here is a pure function of a [`BatterySnapshot`]; the GTK
//! layer only copies these values into labels and CSS classes.

use super::snapshot::{BatterySnapshot, TimeEstimate};

/// Level at or below which the battery is critical.
pub const CRITICAL_LEVEL: f64 = 0.20;
/// Level at or below which the battery is low.
pub const WARNING_LEVEL: f64 = 0.50;

const UNKNOWN: &str = "Unknown";

/// Visual emphasis bucket for the battery icon and level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryTier {
    Charging,
    Critical,
    Warning,
    /// Inherits the surrounding text color.
    Neutral,
}

impl BatteryTier {
    /// Pick the tier; the first matching rule wins.
    pub fn for_snapshot(snapshot: &BatterySnapshot) -> Self {
        if snapshot.charging {
            BatteryTier::Charging
        } else if snapshot.level <= CRITICAL_LEVEL {
            BatteryTier::Critical
        } else if snapshot.level <= WARNING_LEVEL {
            BatteryTier::Warning
        } else {
            BatteryTier::Neutral
        }
    }

    /// CSS class applied to tier-colored elements, if any.
    pub fn css_class(self) -> Option<&'static str> {
        match self {
            BatteryTier::Charging => Some("battery-charging"),
            BatteryTier::Critical => Some("battery-critical"),
            BatteryTier::Warning => Some("battery-warning"),
            BatteryTier::Neutral => None,
        }
    }

    /// Every class `css_class` can return, for removal before re-applying.
    pub const CSS_CLASSES: [&'static str; 3] =
        ["battery-charging", "battery-critical", "battery-warning"];
}

/// Which battery glyph to draw. Independent of level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryGlyph {
    Charging,
    Normal,
}

impl BatteryGlyph {
    pub fn icon_name(self) -> &'static str {
        match self {
            BatteryGlyph::Charging => "battery-charging-symbolic",
            BatteryGlyph::Normal => "battery-symbolic",
        }
    }
}

/// The optional "time to full" / "time remaining" row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeLine {
    pub label: &'static str,
    pub value: String,
}

/// Everything the widget needs to draw one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatteryDisplay {
    pub percentage: u8,
    pub glyph: BatteryGlyph,
    pub tier: BatteryTier,
    pub status: &'static str,
    pub time_line: Option<TimeLine>,
}

impl BatteryDisplay {
    pub fn from_snapshot(snapshot: &BatterySnapshot) -> Self {
        let glyph = if snapshot.charging {
            BatteryGlyph::Charging
        } else {
            BatteryGlyph::Normal
        };

        let status = if snapshot.charging {
            "Charging"
        } else {
            "Not charging"
        };

        let time_line = if snapshot.charging {
            Some(TimeLine {
                label: "Time to full",
                value: format_estimate(snapshot.charging_time),
            })
        } else {
            match snapshot.discharging_time {
                TimeEstimate::Known(seconds) => Some(TimeLine {
                    label: "Time remaining",
                    value: format_time(seconds as f64),
                }),
                TimeEstimate::Unknown => None,
            }
        };

        Self {
            percentage: snapshot.percentage(),
            glyph,
            tier: BatteryTier::for_snapshot(snapshot),
            status,
            time_line,
        }
    }

    /// Text next to the collapsed icon, or `None` when hidden.
    pub fn indicator_text(&self, show_percentage: bool) -> Option<String> {
        show_percentage.then(|| readable_pct(self.percentage))
    }

    /// Width of the level bar as a fraction, `0.0..=1.0`.
    pub fn level_fraction(&self) -> f64 {
        f64::from(self.percentage) / 100.0
    }

    /// Tooltip for the collapsed indicator.
    pub fn tooltip(&self) -> String {
        let mut text = format!("Battery: {}\nState: {}", readable_pct(self.percentage), self.status);
        if let Some(line) = &self.time_line {
            text.push_str(&format!("\n{}: {}", line.label, line.value));
        }
        text
    }

    /// One-line summary, e.g. `"15% Not charging, Time remaining 10m"`.
    pub fn summary(&self) -> String {
        let mut text = format!("{} {}", readable_pct(self.percentage), self.status);
        if let Some(line) = &self.time_line {
            text.push_str(&format!(", {} {}", line.label, line.value));
        }
        text
    }
}

/// What the collapsed indicator shows for one adapter update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorView {
    pub icon_name: &'static str,
    pub tier: BatteryTier,
    /// Percentage text next to the icon, if enabled.
    pub text: Option<String>,
    pub tooltip: String,
}

impl IndicatorView {
    /// `None` means the widget is hidden: no battery, or not known yet.
    pub fn for_update(snapshot: Option<&BatterySnapshot>, show_percentage: bool) -> Option<Self> {
        let display = BatteryDisplay::from_snapshot(snapshot?);
        Some(Self {
            icon_name: display.glyph.icon_name(),
            tier: display.tier,
            text: display.indicator_text(show_percentage),
            tooltip: display.tooltip(),
        })
    }
}

/// Format a duration in seconds as `"2h 30m"`, `"2h"`, `"45m"` or `"< 1m"`.
///
/// Zero, negative and non-finite inputs give `"Unknown"`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return UNKNOWN.to_string();
    }

    let total = seconds.floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;

    match (hours > 0, minutes > 0) {
        (true, true) => format!("{}h {}m", hours, minutes),
        (true, false) => format!("{}h", hours),
        (false, true) => format!("{}m", minutes),
        (false, false) => "< 1m".to_string(),
    }
}

pub fn format_estimate(estimate: TimeEstimate) -> String {
    match estimate {
        TimeEstimate::Known(seconds) => format_time(seconds as f64),
        TimeEstimate::Unknown => UNKNOWN.to_string(),
    }
}

/// Round a floating-point percentage (0.0 - 100.0) to a u8, clamped.
///
/// NaN is treated as 0; infinities are clamped to the 0-100 range.
pub fn rounded_pct_value(percent: f64) -> u8 {
    if percent.is_nan() {
        return 0;
    }
    percent.clamp(0.0, 100.0).round() as u8
}

/// Format a rounded percentage value as readable text, e.g. "57%".
pub fn readable_pct(percent: u8) -> String {
    format!("{}%", percent)
}
