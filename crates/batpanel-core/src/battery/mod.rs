//! Battery status: capability seam, snapshot model, adapter and the
//! derived display state used by the widget.

pub mod adapter;
pub mod capability;
pub mod display;
pub mod simulated;
pub mod snapshot;

pub use adapter::{BatteryStatusAdapter, BatteryUpdate};
pub use capability::{
    BatteryCapability, BatteryEvent, BatteryHandle, CapabilityError, EventListeners,
    HandleCallback, ListenerId,
};
pub use display::{
    BatteryDisplay, BatteryGlyph, BatteryTier, IndicatorView, TimeLine, format_estimate,
    format_time,
};
pub use snapshot::{BatterySnapshot, TimeEstimate};
