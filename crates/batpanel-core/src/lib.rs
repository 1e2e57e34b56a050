//! batpanel-core: everything behind the battery applet that doesn't need GTK.
//!
//! - [`battery`]: capability seam, snapshot model, adapter, display state
//! - [`settings`]: persisted user preferences
//! - [`config`] and [`theme`]: configuration loading and theme resolution

pub mod battery;
pub mod callbacks;
pub mod config;
pub mod error;
pub mod logging;
pub mod settings;
pub mod theme;

pub use config::Config;
pub use error::{Error, Result};
pub use theme::ThemePalette;
