//! Integration tests for config parsing against the real config.toml.

use std::path::PathBuf;

use batpanel_core::{Config, Error, ThemePalette};

fn project_root() -> PathBuf {
    // Navigate from crates/batpanel-core/ up to project root
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent() // crates/
        .unwrap()
        .parent() // batpanel/
        .unwrap()
        .to_path_buf()
}

#[test]
fn test_load_real_config() {
    let config_path = project_root().join("config.toml");
    let config = Config::load(&config_path).expect("Failed to load config.toml");

    assert!(config.bar.size > 0, "Bar size should be positive");
    assert!(
        ["top", "bottom"].contains(&config.bar.position.as_str()),
        "Bar position should be valid"
    );
    assert!(
        ["auto", "dark", "light"].contains(&config.theme.mode.as_str()),
        "Theme mode should be valid"
    );
}

#[test]
fn test_real_config_validates() {
    let config_path = project_root().join("config.toml");
    let config = Config::load(&config_path).unwrap();
    config.validate().expect("Real config.toml should be valid");
}

#[test]
fn test_explicit_path_must_exist() {
    let missing = project_root().join("does-not-exist.toml");
    let result = Config::find_and_load(Some(&missing));
    assert!(matches!(result, Err(Error::ConfigNotFound(_))));
}

#[test]
fn test_explicit_path_is_reported_as_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[bar]\nposition = \"bottom\"\n").unwrap();

    let result = Config::find_and_load(Some(&path)).unwrap();
    assert_eq!(result.source.as_deref(), Some(path.as_path()));
    assert!(!result.used_defaults);
    assert_eq!(result.config.bar.position, "bottom");
    // Merged from defaults
    assert_eq!(result.config.theme.accent, "#adabe0");
}

#[test]
fn test_partial_user_config_keeps_state_colors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[theme.states]\nurgent = \"#ff0000\"\n").unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.theme.states.urgent, "#ff0000");
    assert_eq!(config.theme.states.warning, "#facc15");

    let palette = ThemePalette::from_config(&config);
    assert!(palette.css_vars_block().contains("--color-state-urgent: #ff0000;"));
}

#[test]
fn test_settings_path_override() {
    let config = Config::load_with_defaults("[settings]\npath = \"/tmp/batpanel-settings.toml\"\n")
        .unwrap();
    assert_eq!(
        config.settings.path,
        Some(PathBuf::from("/tmp/batpanel-settings.toml"))
    );
}
