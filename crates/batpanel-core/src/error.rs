//! Error types for batpanel-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading configuration or persisting settings.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid configuration:\n  {}", .0.join("\n  "))]
    ConfigValidation(Vec<String>),

    #[error("could not determine a state directory (set XDG_STATE_HOME or HOME)")]
    NoSettingsDir,
}

pub type Result<T> = std::result::Result<T, Error>;
