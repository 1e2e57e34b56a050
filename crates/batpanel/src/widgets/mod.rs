//! Widgets shown in the applet strip.

pub mod base;
pub mod battery;
pub mod battery_popover;
pub mod css;

pub use battery::BatteryWidget;
