//! Battery popover - level, charging status, time estimate and the
//! "show percentage" toggle.

use std::rc::Rc;

use batpanel_core::battery::display::readable_pct;
use batpanel_core::battery::{BatteryDisplay, BatteryTier};
use batpanel_core::settings::PercentagePreference;
use gtk4::prelude::*;
use gtk4::{Align, Box as GtkBox, Image, Label, LevelBar, Orientation, Separator, Switch, Widget};

use crate::styles::{battery as bat, color, surface};

/// Replace any tier class on `widget` with the one for `tier`.
pub fn apply_tier_class(widget: &impl IsA<Widget>, tier: BatteryTier) {
    for class in BatteryTier::CSS_CLASSES {
        widget.remove_css_class(class);
    }
    if let Some(class) = tier.css_class() {
        widget.add_css_class(class);
    }
}

/// A "label ........ value" row: (row, title label, value label).
fn info_row(title: &str) -> (GtkBox, Label, Label) {
    let row = GtkBox::new(Orientation::Horizontal, 8);
    row.add_css_class(bat::POPOVER_ROW);

    let title_label = Label::new(Some(title));
    title_label.add_css_class(color::MUTED);
    title_label.set_halign(Align::Start);
    title_label.set_hexpand(true);
    row.append(&title_label);

    let value = Label::new(None);
    value.add_css_class(color::PRIMARY);
    value.set_halign(Align::End);
    row.append(&value);

    (row, title_label, value)
}

/// Controller owning the popover labels so they can be updated while open.
#[derive(Clone)]
pub struct BatteryPopoverController {
    header_icon: Image,
    percent_label: Label,
    level_bar: LevelBar,
    status_label: Label,
    time_row: GtkBox,
    time_title: Label,
    time_label: Label,
}

impl BatteryPopoverController {
    /// Update every element from a freshly derived display state.
    pub fn update(&self, display: &BatteryDisplay) {
        self.header_icon.set_icon_name(Some(display.glyph.icon_name()));
        apply_tier_class(&self.header_icon, display.tier);

        self.percent_label.set_label(&readable_pct(display.percentage));
        apply_tier_class(&self.percent_label, display.tier);

        self.level_bar.set_value(display.level_fraction());
        apply_tier_class(&self.level_bar, display.tier);

        self.status_label.set_label(display.status);

        match &display.time_line {
            Some(line) => {
                self.time_title.set_label(line.label);
                self.time_label.set_label(&line.value);
                self.time_row.set_visible(true);
            }
            None => self.time_row.set_visible(false),
        }
    }
}

/// Build the popover content for `display`.
///
/// `on_toggle` runs after the preference has been written, so the caller
/// can re-render the collapsed indicator.
pub fn build_battery_popover<F>(
    display: &BatteryDisplay,
    preference: Rc<PercentagePreference>,
    on_toggle: F,
) -> (Widget, BatteryPopoverController)
where
    F: Fn(bool) + 'static,
{
    let container = GtkBox::new(Orientation::Vertical, 0);
    container.add_css_class(bat::POPOVER);

    // Header
    let header = GtkBox::new(Orientation::Horizontal, 8);
    header.add_css_class(surface::POPOVER_HEADER);
    let header_icon = Image::from_icon_name(display.glyph.icon_name());
    header.append(&header_icon);
    let title = Label::new(Some("Battery"));
    title.add_css_class(surface::POPOVER_TITLE);
    title.set_halign(Align::Start);
    header.append(&title);
    container.append(&header);

    let body = GtkBox::new(Orientation::Vertical, 12);

    // Level
    let level_section = GtkBox::new(Orientation::Vertical, 6);
    let (level_row, _, percent_label) = info_row("Level");
    percent_label.add_css_class(bat::POPOVER_PERCENT);
    level_section.append(&level_row);

    let level_bar = LevelBar::for_interval(0.0, 1.0);
    level_bar.add_css_class(bat::LEVEL_BAR);
    // Drop GTK's default low/high offsets; color comes from the tier class.
    for offset in ["low", "high", "full"] {
        level_bar.remove_offset_value(Some(offset));
    }
    level_section.append(&level_bar);
    body.append(&level_section);

    // Status and time
    let details = GtkBox::new(Orientation::Vertical, 6);
    let (status_row, _, status_label) = info_row("Status");
    details.append(&status_row);
    let (time_row, time_title, time_label) = info_row("");
    details.append(&time_row);
    body.append(&details);

    let separator = Separator::new(Orientation::Horizontal);
    separator.add_css_class(surface::POPOVER_SEPARATOR);
    body.append(&separator);

    // Settings
    let settings_row = GtkBox::new(Orientation::Horizontal, 8);
    settings_row.add_css_class(bat::POPOVER_SETTINGS);
    let settings_label = Label::new(Some("Show percentage"));
    settings_label.add_css_class(color::MUTED);
    settings_label.set_halign(Align::Start);
    settings_label.set_hexpand(true);
    settings_row.append(&settings_label);

    let switch = Switch::new();
    switch.set_active(preference.get());
    switch.set_valign(Align::Center);
    switch.connect_active_notify(move |switch| {
        let active = switch.is_active();
        if active != preference.get() {
            preference.set(active);
            on_toggle(active);
        }
    });
    settings_row.append(&switch);
    body.append(&settings_row);

    container.append(&body);

    let controller = BatteryPopoverController {
        header_icon,
        percent_label,
        level_bar,
        status_label,
        time_row,
        time_title,
        time_label,
    };
    controller.update(display);

    (container.upcast::<Widget>(), controller)
}
