//! Widget CSS.
//!
//! Colors, shadows and transition timing come from the `:root` variables
//! generated by `ThemePalette::css_vars_block`.

/// Return base applet and popover CSS.
pub fn base_css() -> &'static str {
    r#"
/* ===== APPLET ===== */

.applet-window {
    background: transparent;
}

.widget {
    color: var(--color-foreground-muted);
    padding: 2px 8px;
    border-radius: 8px;
    transition: color var(--transition-duration) ease;
}

.widget:hover,
.widget.open {
    color: var(--color-foreground-primary);
}

.vp-primary {
    color: var(--color-foreground-primary);
}

.vp-muted {
    color: var(--color-foreground-muted);
}

/* ===== POPOVER ===== */

popover.widget-menu > contents {
    background: var(--color-background-popover);
    box-shadow: var(--shadow-popover);
    border: 1px solid var(--color-track);
    border-radius: 16px;
    padding: 0;
}

.popover-content {
    min-width: 320px;
}

.popover-header {
    padding: 16px;
    border-bottom: 1px solid var(--color-track);
}

.popover-title {
    color: var(--color-foreground-primary);
    font-weight: 600;
}

.popover-separator {
    background: var(--color-track);
    min-height: 1px;
}

switch:checked {
    background: var(--color-accent-primary);
}
"#
}

/// Return battery CSS.
pub fn battery_css() -> &'static str {
    r#"
/* ===== BATTERY ===== */

/* Tier classes - applied to the icon, the level value and the level bar */
.battery-icon.battery-charging,
.battery-popover-percent.battery-charging,
.battery-popover image.battery-charging {
    color: var(--color-state-success);
}

.battery-icon.battery-warning,
.battery-popover-percent.battery-warning,
.battery-popover image.battery-warning {
    color: var(--color-state-warning);
}

.battery-icon.battery-critical,
.battery-popover-percent.battery-critical,
.battery-popover image.battery-critical {
    color: var(--color-state-urgent);
}

.battery-percentage {
    font-size: 0.85em;
    font-weight: 500;
}

.battery-popover > box {
    padding: 16px;
}

.battery-popover-percent {
    font-weight: 600;
}

.battery-level-bar trough {
    background: var(--color-track);
    border-radius: 999px;
    min-height: 8px;
}

.battery-level-bar block.filled {
    background: var(--color-foreground-muted);
    border-radius: 999px;
    transition: all var(--transition-duration) ease;
}

.battery-level-bar.battery-charging block.filled {
    background: var(--color-state-success);
}

.battery-level-bar.battery-warning block.filled {
    background: var(--color-state-warning);
}

.battery-level-bar.battery-critical block.filled {
    background: var(--color-state-urgent);
}

.battery-popover-settings {
    padding-top: 4px;
}
"#
}

/// Full stylesheet for the given theme variables.
pub fn stylesheet(css_vars: &str) -> String {
    let mut css = String::with_capacity(css_vars.len() + 4096);
    css.push_str(css_vars);
    css.push_str(base_css());
    css.push_str(battery_css());
    css
}
