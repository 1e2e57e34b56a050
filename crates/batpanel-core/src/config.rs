//! Configuration types and parsing.
//!
//! The applet reads one TOML file. User values are deep-merged over the
//! embedded default config, so a user file only needs the keys it changes.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use toml::Table;

use crate::error::{Error, Result};

/// Known valid values for theme.mode.
const VALID_THEME_MODES: &[&str] = &["auto", "dark", "light"];

/// Known valid values for bar.position.
const VALID_BAR_POSITIONS: &[&str] = &["top", "bottom"];

/// Embedded default configuration TOML, compiled into the binary.
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../../config.toml");

/// Result of loading a configuration file.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Path where config was found, if any.
    pub source: Option<PathBuf>,
    /// Whether defaults were used (no config file found).
    pub used_defaults: bool,
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Applet window placement.
    pub bar: BarConfig,

    /// Colors and visual flags.
    pub theme: ThemeConfig,

    /// Where user preferences are stored.
    pub settings: SettingsConfig,
}

impl Config {
    /// Load configuration from the embedded default TOML string.
    pub fn from_default_toml() -> Result<Self> {
        let config: Config = toml::from_str(DEFAULT_CONFIG_TOML)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, merging with embedded defaults.
    ///
    /// Returns an error if the file doesn't exist or can't be parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::load_with_defaults(&content)
    }

    /// Parse a TOML string, merging it over the embedded defaults.
    pub fn load_with_defaults(user_toml: &str) -> Result<Self> {
        let mut base: Table = toml::from_str(DEFAULT_CONFIG_TOML)?;
        let user: Table = toml::from_str(user_toml)?;

        deep_merge_toml(&mut base, user);

        let config: Config = base.try_into()?;
        Ok(config)
    }

    /// Find and load configuration using the XDG lookup chain.
    ///
    /// If `explicit_path` is `Some`, that path is used directly and an error
    /// is returned if it doesn't exist or can't be parsed (no fallback).
    ///
    /// Otherwise searches, in order:
    /// 1. `$XDG_CONFIG_HOME/batpanel/config.toml`
    /// 2. `~/.config/batpanel/config.toml`
    /// 3. `./config.toml`
    ///
    /// A file that exists but fails to load is an error. Only when no file
    /// exists at all are the embedded defaults used.
    pub fn find_and_load(explicit_path: Option<&Path>) -> Result<ConfigLoadResult> {
        if let Some(path) = explicit_path {
            let config = Self::load(path)?;
            return Ok(ConfigLoadResult {
                config,
                source: Some(path.to_path_buf()),
                used_defaults: false,
            });
        }

        let search_paths = Self::config_search_paths();
        for path in &search_paths {
            if path.exists() {
                return match Self::load(path) {
                    Ok(config) => Ok(ConfigLoadResult {
                        config,
                        source: Some(path.clone()),
                        used_defaults: false,
                    }),
                    Err(e) => {
                        tracing::error!("Config file {:?} exists but failed to load: {}", path, e);
                        Err(e)
                    }
                };
            }
        }

        tracing::info!("No config file found, using built-in default config");
        tracing::debug!(
            "Searched: {}",
            search_paths
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(ConfigLoadResult {
            config: Self::from_default_toml()?,
            source: None,
            used_defaults: true,
        })
    }

    /// Get the list of paths to search for config files.
    pub fn config_search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg_config).join("batpanel/config.toml"));
        }

        if let Ok(home) = env::var("HOME") {
            paths.push(PathBuf::from(home).join(".config/batpanel/config.toml"));
        }

        paths.push(PathBuf::from("config.toml"));

        paths
    }

    /// Validate the configuration, returning every invalid value at once.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if !VALID_BAR_POSITIONS.contains(&self.bar.position.as_str()) {
            errors.push(format!(
                "bar.position: invalid value '{}', expected one of: {}",
                self.bar.position,
                VALID_BAR_POSITIONS.join(", ")
            ));
        }

        if self.bar.size == 0 {
            errors.push("bar.size: must be greater than 0".to_string());
        }

        if !VALID_THEME_MODES.contains(&self.theme.mode.as_str()) {
            errors.push(format!(
                "theme.mode: invalid value '{}', expected one of: {}",
                self.theme.mode,
                VALID_THEME_MODES.join(", ")
            ));
        }

        // theme.accent: "none" or a hex color
        let accent = self.theme.accent.as_str();
        if accent != "none" && !is_hex_color(accent) {
            errors.push(format!(
                "theme.accent: invalid value '{}', expected 'none' or a hex color like '#3584e4'",
                accent
            ));
        }

        if let Some(ref color) = self.theme.background_color
            && !is_hex_color(color)
        {
            errors.push(format!(
                "theme.background_color: invalid value '{}', expected a hex color",
                color
            ));
        }

        if !(0.0..=1.0).contains(&self.theme.background_opacity) {
            errors.push(format!(
                "theme.background_opacity: invalid value '{}', must be between 0.0 and 1.0",
                self.theme.background_opacity
            ));
        }

        for (name, value) in [
            ("success", &self.theme.states.success),
            ("warning", &self.theme.states.warning),
            ("urgent", &self.theme.states.urgent),
        ] {
            if !is_hex_color(value) {
                errors.push(format!(
                    "theme.states.{}: invalid value '{}', expected a hex color",
                    name, value
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::ConfigValidation(errors))
        }
    }

    /// Human-readable summary of the configuration.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();

        lines.push("Bar:".to_string());
        lines.push(format!("  position: {}", self.bar.position));
        lines.push(format!("  size: {}px", self.bar.size));
        lines.push(format!("  outer_margin: {}px", self.bar.outer_margin));

        lines.push("\nTheme:".to_string());
        lines.push(format!("  mode: {}", self.theme.mode));
        lines.push(format!("  accent: {}", self.theme.accent));
        lines.push(format!("  reduce_motion: {}", self.theme.reduce_motion));
        lines.push(format!("  disable_shadows: {}", self.theme.disable_shadows));
        lines.push(format!(
            "  background_opacity: {}",
            self.theme.background_opacity
        ));
        if let Some(ref color) = self.theme.background_color {
            lines.push(format!("  background_color: {}", color));
        }

        lines.push("\nSettings:".to_string());
        match self.settings.path {
            Some(ref path) => lines.push(format!("  path: {}", path.display())),
            None => lines.push("  path: (default state directory)".to_string()),
        }

        lines.join("\n")
    }
}

fn is_hex_color(value: &str) -> bool {
    value.starts_with('#') && {
        let hex = value.trim_start_matches('#');
        (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
    }
}

/// Deep merge two TOML tables, with `overlay` values taking precedence.
///
/// For nested tables, recursively merges. For arrays and other values,
/// the overlay value completely replaces the base value.
fn deep_merge_toml(base: &mut Table, overlay: Table) {
    for (key, overlay_value) in overlay {
        match (base.get_mut(&key), overlay_value) {
            (Some(toml::Value::Table(base_table)), toml::Value::Table(overlay_table)) => {
                deep_merge_toml(base_table, overlay_table);
            }
            (_, overlay_value) => {
                base.insert(key, overlay_value);
            }
        }
    }
}

/// Applet window configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BarConfig {
    /// Screen edge the applet is anchored to: "top" or "bottom".
    pub position: String,

    /// Height of the applet strip in pixels.
    pub size: u32,

    /// Gap between the screen edge and the applet in pixels.
    pub outer_margin: u32,
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            position: "top".to_string(),
            size: 32,
            outer_margin: 4,
        }
    }
}

/// Theme configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    /// Theme mode: "auto", "dark" or "light".
    /// "auto" detects from the background luminance.
    pub mode: String,

    /// Accent color: "none" (monochrome) or a hex color like "#3584e4".
    pub accent: String,

    /// Turn off transitions and animations.
    pub reduce_motion: bool,

    /// Draw popovers without drop shadows.
    pub disable_shadows: bool,

    /// Popover background color override. Derived from mode when unset.
    pub background_color: Option<String>,

    /// Popover background opacity (0.0 = transparent, 1.0 = opaque).
    pub background_opacity: f64,

    /// Tier colors.
    pub states: ThemeStates,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            mode: "auto".to_string(),
            accent: "#adabe0".to_string(),
            reduce_motion: false,
            disable_shadows: false,
            background_color: None,
            background_opacity: 0.8,
            states: ThemeStates::default(),
        }
    }
}

/// Theme state colors, used for the battery tiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeStates {
    /// Charging tier color.
    pub success: String,

    /// Warning tier color.
    pub warning: String,

    /// Critical tier color.
    pub urgent: String,
}

impl Default for ThemeStates {
    fn default() -> Self {
        Self {
            success: "#4ade80".to_string(),
            warning: "#facc15".to_string(),
            urgent: "#f87171".to_string(),
        }
    }
}

/// Preference storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsConfig {
    /// Settings file override. Defaults to the XDG state directory.
    pub path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_embedded_default_parses_and_validates() {
        let config = Config::from_default_toml().unwrap();
        config.validate().unwrap();
    }

    #[test]
    fn test_user_values_override_defaults() {
        let config = Config::load_with_defaults(
            r##"
            [theme]
            reduce_motion = true
            accent = "#ff0000"
            "##,
        )
        .unwrap();

        assert!(config.theme.reduce_motion);
        assert_eq!(config.theme.accent, "#ff0000");
        // Untouched keys keep their defaults
        assert!(!config.theme.disable_shadows);
        assert_eq!(config.bar.position, "top");
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result = Config::load_with_defaults("[theme]\nblur = true\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let mut config = Config::default();
        config.bar.size = 0;
        config.bar.position = "left".to_string();
        config.theme.mode = "neon".to_string();
        config.theme.accent = "red".to_string();
        config.theme.background_opacity = 1.5;
        config.theme.states.urgent = "#zzzzzz".to_string();

        match config.validate() {
            Err(Error::ConfigValidation(errors)) => {
                assert_eq!(errors.len(), 6);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_accent_none_is_valid() {
        let mut config = Config::default();
        config.theme.accent = "none".to_string();
        config.validate().unwrap();
    }

    #[test]
    fn test_is_hex_color() {
        assert!(is_hex_color("#fff"));
        assert!(is_hex_color("#A0b1C2"));
        assert!(!is_hex_color("fff"));
        assert!(!is_hex_color("#ffff"));
        assert!(!is_hex_color("#gggggg"));
    }

    #[test]
    fn test_deep_merge_nested() {
        let mut base: Table = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overlay: Table = toml::from_str("[a]\ny = 3\n[b]\nz = 4\n").unwrap();
        deep_merge_toml(&mut base, overlay);

        assert_eq!(base["a"]["x"].as_integer(), Some(1));
        assert_eq!(base["a"]["y"].as_integer(), Some(3));
        assert_eq!(base["b"]["z"].as_integer(), Some(4));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Path::new("/nonexistent/batpanel.toml"));
        assert!(matches!(result, Err(Error::ConfigNotFound(_))));
    }

    #[test]
    fn test_summary_mentions_sections() {
        let summary = Config::default().summary();
        assert!(summary.contains("Bar:"));
        assert!(summary.contains("Theme:"));
        assert!(summary.contains("Settings:"));
    }
}
