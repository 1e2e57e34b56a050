//! Platform services backing the applet.
//!
//! - **upower**: battery capability on top of the UPower DisplayDevice

pub mod upower;
