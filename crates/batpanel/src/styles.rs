//! Shared CSS class constants for batpanel.
//!
//! Tier classes (`battery-charging`, `battery-critical`, `battery-warning`)
//! come from `batpanel_core::battery::BatteryTier::css_class`.

/// Core structural/layout CSS classes.
pub mod class {
    /// Applet window (`.applet-window`).
    pub const APPLET_WINDOW: &str = "applet-window";

    /// Strip holding the widgets (`.applet`).
    pub const APPLET: &str = "applet";

    /// Base widget container (`.widget`).
    pub const WIDGET: &str = "widget";

    /// Widget content inner box (`.content`).
    pub const CONTENT: &str = "content";

    /// Set while the widget's popover is open (`.open`).
    pub const OPEN: &str = "open";
}

/// Popover surface classes.
pub mod surface {
    /// Popover shell (`.widget-menu`).
    pub const WIDGET_MENU: &str = "widget-menu";

    /// Popover content root (`.popover-content`).
    pub const POPOVER_CONTENT: &str = "popover-content";

    /// Popover title text (`.popover-title`).
    pub const POPOVER_TITLE: &str = "popover-title";

    /// Header strip above the popover body (`.popover-header`).
    pub const POPOVER_HEADER: &str = "popover-header";

    /// Divider between popover sections (`.popover-separator`).
    pub const POPOVER_SEPARATOR: &str = "popover-separator";
}

/// Foreground color classes.
pub mod color {
    /// Primary foreground color (`.vp-primary`).
    pub const PRIMARY: &str = "vp-primary";

    /// Muted/secondary foreground color (`.vp-muted`).
    pub const MUTED: &str = "vp-muted";
}

/// Battery widget classes.
pub mod battery {
    /// Battery widget root (`.battery`).
    pub const WIDGET: &str = "battery";

    /// Collapsed indicator icon (`.battery-icon`).
    pub const ICON: &str = "battery-icon";

    /// Collapsed indicator percentage (`.battery-percentage`).
    pub const PERCENTAGE: &str = "battery-percentage";

    /// Battery popover root (`.battery-popover`).
    pub const POPOVER: &str = "battery-popover";

    /// Popover label/value row (`.battery-popover-row`).
    pub const POPOVER_ROW: &str = "battery-popover-row";

    /// Popover level value (`.battery-popover-percent`).
    pub const POPOVER_PERCENT: &str = "battery-popover-percent";

    /// Popover level bar (`.battery-level-bar`).
    pub const LEVEL_BAR: &str = "battery-level-bar";

    /// Popover settings section (`.battery-popover-settings`).
    pub const POPOVER_SETTINGS: &str = "battery-popover-settings";
}
