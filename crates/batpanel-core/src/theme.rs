//! Theming for batpanel.
//!
//! `ThemePalette` resolves the config into concrete colors and flags and
//! generates the CSS variables the widget styles reference. Nothing here
//! affects battery behavior.

use crate::Config;

// Popover shadow (layered for a softer edge)
const SHADOW_OPACITY_DARK: f64 = 0.40;
const SHADOW_OPACITY_LIGHT: f64 = 0.25;

// Foreground opacity for secondary text (row labels)
const FOREGROUND_MUTED_OPACITY: f64 = 0.7;

// Level bar track
const TRACK_OPACITY: f64 = 0.10;

const DEFAULT_BACKGROUND_DARK: (u8, u8, u8) = (0x11, 0x12, 0x17);
const DEFAULT_BACKGROUND_LIGHT: (u8, u8, u8) = (0xff, 0xff, 0xff);

// Below this relative luminance a background counts as dark
const DARK_LUMINANCE: f64 = 0.179;

/// Where the accent color comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum AccentSource {
    /// Monochrome mode - no colored accents.
    None,
    /// Use a specific custom color.
    Custom(String),
}

/// Parse a hex color string to RGB tuple. Returns None if invalid.
pub fn parse_hex_color(color: &str) -> Option<(u8, u8, u8)> {
    let color = color.trim().trim_start_matches('#');

    // Expand shorthand (e.g., "fff" -> "ffffff")
    let color = if color.len() == 3 {
        color.chars().flat_map(|c| [c, c]).collect::<String>()
    } else {
        color.to_string()
    };

    if color.len() != 6 {
        return None;
    }

    let r = u8::from_str_radix(&color[0..2], 16).ok()?;
    let g = u8::from_str_radix(&color[2..4], 16).ok()?;
    let b = u8::from_str_radix(&color[4..6], 16).ok()?;

    Some((r, g, b))
}

/// Calculate relative luminance per WCAG formula (0.0 = black, 1.0 = white).
pub fn relative_luminance(r: u8, g: u8, b: u8) -> f64 {
    fn channel(c: u8) -> f64 {
        let c_srgb = c as f64 / 255.0;
        if c_srgb <= 0.03928 {
            c_srgb / 12.92
        } else {
            ((c_srgb + 0.055) / 1.055).powf(2.4)
        }
    }

    0.2126 * channel(r) + 0.7152 * channel(g) + 0.0722 * channel(b)
}

/// Return true if the color is considered dark (low luminance).
pub fn is_dark_color(color: &str) -> bool {
    match parse_hex_color(color) {
        Some((r, g, b)) => relative_luminance(r, g, b) < DARK_LUMINANCE,
        None => true, // Default to dark if parsing fails
    }
}

/// Format an RGBA color string.
pub fn rgba_str(r: u8, g: u8, b: u8, a: f64) -> String {
    format!("rgba({}, {}, {}, {:.2})", r, g, b, a)
}

/// Resolved theme values.
///
/// Constructed via `ThemePalette::from_config(&config)`.
#[derive(Debug, Clone)]
pub struct ThemePalette {
    pub is_dark_mode: bool,

    /// Popover background, already parsed from the validated hex color.
    pub background: (u8, u8, u8),
    pub foreground_primary: String,
    pub foreground_muted: String,
    pub track: String,

    pub accent_source: AccentSource,
    pub accent_primary: String,

    // Tier colors
    pub state_success: String,
    pub state_warning: String,
    pub state_urgent: String,

    pub shadow: String,

    pub reduce_motion: bool,
    pub disable_shadows: bool,
    pub background_opacity: f64,
}

impl ThemePalette {
    pub fn from_config(config: &Config) -> Self {
        let theme = &config.theme;

        let default_background = if theme.mode == "light" {
            DEFAULT_BACKGROUND_LIGHT
        } else {
            DEFAULT_BACKGROUND_DARK
        };
        // `Config::validate` only admits hex colors here
        let background = theme
            .background_color
            .as_deref()
            .and_then(parse_hex_color)
            .unwrap_or(default_background);

        let is_dark_mode = match theme.mode.as_str() {
            "dark" => true,
            "light" => false,
            _ => {
                let (r, g, b) = background;
                relative_luminance(r, g, b) < DARK_LUMINANCE
            }
        };

        // Foreground base: white on dark, near-black on light.
        let (fg, fg_rgb) = if is_dark_mode {
            ("#ffffff", (255, 255, 255))
        } else {
            ("#1a1a1a", (26, 26, 26))
        };

        let (accent_source, accent_primary) = if theme.accent == "none" {
            (
                AccentSource::None,
                rgba_str(fg_rgb.0, fg_rgb.1, fg_rgb.2, 0.85),
            )
        } else {
            (
                AccentSource::Custom(theme.accent.clone()),
                theme.accent.clone(),
            )
        };

        let shadow_opacity = if is_dark_mode {
            SHADOW_OPACITY_DARK
        } else {
            SHADOW_OPACITY_LIGHT
        };

        Self {
            is_dark_mode,
            background,
            foreground_primary: fg.to_string(),
            foreground_muted: rgba_str(fg_rgb.0, fg_rgb.1, fg_rgb.2, FOREGROUND_MUTED_OPACITY),
            track: rgba_str(fg_rgb.0, fg_rgb.1, fg_rgb.2, TRACK_OPACITY),
            accent_source,
            accent_primary,
            state_success: theme.states.success.clone(),
            state_warning: theme.states.warning.clone(),
            state_urgent: theme.states.urgent.clone(),
            shadow: format!(
                "0 1px 2px {}, 0 8px 24px {}",
                rgba_str(0, 0, 0, shadow_opacity * 0.5),
                rgba_str(0, 0, 0, shadow_opacity)
            ),
            reduce_motion: theme.reduce_motion,
            disable_shadows: theme.disable_shadows,
            background_opacity: theme.background_opacity,
        }
    }

    /// The popover background at the given opacity.
    pub fn background_color(&self, alpha: f64) -> String {
        let (r, g, b) = self.background;
        rgba_str(r, g, b, alpha.clamp(0.0, 1.0))
    }

    /// CSS `box-shadow` value for popovers.
    pub fn popover_shadow(&self) -> &str {
        if self.disable_shadows {
            "none"
        } else {
            &self.shadow
        }
    }

    /// CSS transition duration for animated elements.
    pub fn transition_duration(&self) -> &'static str {
        if self.reduce_motion { "0ms" } else { "300ms" }
    }

    /// Generate the :root CSS variable block.
    pub fn css_vars_block(&self) -> String {
        let vars = [
            (
                "--color-background-popover",
                self.background_color(self.background_opacity),
            ),
            ("--color-foreground-primary", self.foreground_primary.clone()),
            ("--color-foreground-muted", self.foreground_muted.clone()),
            ("--color-track", self.track.clone()),
            ("--color-accent-primary", self.accent_primary.clone()),
            ("--color-state-success", self.state_success.clone()),
            ("--color-state-warning", self.state_warning.clone()),
            ("--color-state-urgent", self.state_urgent.clone()),
            ("--shadow-popover", self.popover_shadow().to_string()),
            ("--transition-duration", self.transition_duration().to_string()),
        ];

        let mut css = String::from(":root {\n");
        for (name, value) in vars {
            css.push_str(&format!("    {}: {};\n", name, value));
        }
        css.push_str("}\n");
        css
    }
}

impl Default for ThemePalette {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color_valid() {
        assert_eq!(parse_hex_color("#ff0000"), Some((255, 0, 0)));
        assert_eq!(parse_hex_color("00ff00"), Some((0, 255, 0)));
        assert_eq!(parse_hex_color("#fff"), Some((255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_color_invalid() {
        assert_eq!(parse_hex_color("not a color"), None);
        assert_eq!(parse_hex_color("#gggggg"), None);
        assert_eq!(parse_hex_color("#ff"), None);
    }

    #[test]
    fn test_is_dark_color() {
        assert!(is_dark_color("#000000"));
        assert!(is_dark_color("#111217"));
        assert!(!is_dark_color("#ffffff"));
    }

    #[test]
    fn test_default_palette_is_dark() {
        let palette = ThemePalette::default();
        assert!(palette.is_dark_mode);
        assert_eq!(palette.accent_source, AccentSource::Custom("#adabe0".to_string()));
    }

    #[test]
    fn test_light_mode() {
        let mut config = Config::default();
        config.theme.mode = "light".to_string();
        let palette = ThemePalette::from_config(&config);
        assert!(!palette.is_dark_mode);
        assert_eq!(palette.foreground_primary, "#1a1a1a");
    }

    #[test]
    fn test_background_color_alpha() {
        let palette = ThemePalette::default();
        assert_eq!(palette.background_color(0.8), "rgba(17, 18, 23, 0.80)");
        assert_eq!(palette.background_color(2.0), "rgba(17, 18, 23, 1.00)");
    }

    #[test]
    fn test_custom_background_drives_mode_and_alpha() {
        let mut config = Config::default();
        config.theme.background_color = Some("#f0f0f0".to_string());
        let palette = ThemePalette::from_config(&config);
        assert_eq!(palette.background, (0xf0, 0xf0, 0xf0));
        assert!(!palette.is_dark_mode);
        assert_eq!(palette.background_color(0.5), "rgba(240, 240, 240, 0.50)");
    }

    #[test]
    fn test_light_mode_default_background() {
        let mut config = Config::default();
        config.theme.mode = "light".to_string();
        let palette = ThemePalette::from_config(&config);
        assert_eq!(palette.background_color(1.0), "rgba(255, 255, 255, 1.00)");
    }

    #[test]
    fn test_accent_none_monochrome() {
        let mut config = Config::default();
        config.theme.accent = "none".to_string();
        let palette = ThemePalette::from_config(&config);
        assert_eq!(palette.accent_source, AccentSource::None);
        assert!(palette.accent_primary.starts_with("rgba(255, 255, 255"));
    }

    #[test]
    fn test_flags_reach_css() {
        let mut config = Config::default();
        config.theme.reduce_motion = true;
        config.theme.disable_shadows = true;
        let css = ThemePalette::from_config(&config).css_vars_block();
        assert!(css.contains("--shadow-popover: none;"));
        assert!(css.contains("--transition-duration: 0ms;"));
    }

    #[test]
    fn test_css_vars_contains_tier_colors() {
        let css = ThemePalette::default().css_vars_block();
        assert!(css.contains("--color-state-success: #4ade80;"));
        assert!(css.contains("--color-state-warning: #facc15;"));
        assert!(css.contains("--color-state-urgent: #f87171;"));
        assert!(css.contains("--color-background-popover: rgba("));
    }
}
