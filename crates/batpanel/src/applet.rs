//! Applet window implementation using GTK4 and layer-shell.

use gtk4::prelude::*;
use gtk4::{Application, ApplicationWindow, PositionType};
use gtk4_layer_shell::{Edge, KeyboardMode, Layer, LayerShell};
use tracing::{debug, warn};

use batpanel_core::{Config, ThemePalette};

use crate::styles::class;
use crate::widgets::css;

/// Where popovers open relative to the applet for the configured edge.
pub fn popover_position(config: &Config) -> PositionType {
    if config.bar.position == "bottom" {
        PositionType::Top
    } else {
        PositionType::Bottom
    }
}

/// Create the applet window, anchored to the configured edge's right corner.
pub fn create_applet_window(app: &Application, config: &Config, child: &gtk4::Widget) -> ApplicationWindow {
    let window = ApplicationWindow::builder()
        .application(app)
        .title("batpanel")
        .decorated(false)
        .resizable(false)
        .default_height(config.bar.size as i32)
        .build();

    window.add_css_class(class::APPLET_WINDOW);

    window.init_layer_shell();
    window.set_layer(Layer::Top);

    let edge = if config.bar.position == "bottom" {
        Edge::Bottom
    } else {
        Edge::Top
    };
    window.set_anchor(edge, true);
    window.set_anchor(Edge::Right, true);
    window.set_margin(edge, config.bar.outer_margin as i32);
    window.set_margin(Edge::Right, config.bar.outer_margin as i32);

    // The applet doesn't need keyboard input
    window.set_keyboard_mode(KeyboardMode::None);

    let strip = gtk4::Box::new(gtk4::Orientation::Horizontal, 0);
    strip.add_css_class(class::APPLET);
    strip.set_size_request(-1, config.bar.size as i32);
    strip.append(child);
    window.set_child(Some(&strip));

    debug!(
        "Applet window created (edge={}, size={}px)",
        config.bar.position, config.bar.size
    );

    window
}

/// Load and apply CSS styling to the application.
pub fn load_css(config: &Config) {
    let palette = ThemePalette::from_config(config);
    let stylesheet = css::stylesheet(&palette.css_vars_block());

    debug!("Generated theme CSS:");
    debug!("  accent_source = {:?}", palette.accent_source);
    debug!("  accent_primary = {}", palette.accent_primary);
    debug!("  reduce_motion = {}", palette.reduce_motion);
    debug!("  disable_shadows = {}", palette.disable_shadows);

    let provider = gtk4::CssProvider::new();
    provider.load_from_string(&stylesheet);

    if let Some(display) = gtk4::gdk::Display::default() {
        gtk4::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk4::STYLE_PROVIDER_PRIORITY_USER,
        );
        debug!("CSS loaded and applied (dark_mode={})", palette.is_dark_mode);
    } else {
        warn!("No default display available, CSS styling not applied");
    }
}
