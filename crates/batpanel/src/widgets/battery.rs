//! Battery widget - compact indicator plus a detail popover.
//!
//! The widget owns a `BatteryStatusAdapter` for its whole lifetime: the
//! adapter starts when the widget is built and stops when it is dropped.
//! Each update is turned into a `BatteryDisplay` and copied into GTK.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use batpanel_core::battery::{
    BatteryCapability, BatteryDisplay, BatterySnapshot, BatteryStatusAdapter, BatteryUpdate,
    IndicatorView,
};
use batpanel_core::settings::PercentagePreference;
use gtk4::prelude::*;
use gtk4::{Box as GtkBox, Image, Label, PositionType};
use tracing::debug;

use crate::styles::battery as bat;
use crate::widgets::base::BaseWidget;
use crate::widgets::battery_popover::{
    BatteryPopoverController, apply_tier_class, build_battery_popover,
};

/// The collapsed indicator: icon and optional percentage text.
#[derive(Clone)]
struct Indicator {
    container: GtkBox,
    icon: Image,
    percentage_label: Label,
}

impl Indicator {
    /// Render one update. `None` hides the whole widget.
    fn render(&self, snapshot: Option<&BatterySnapshot>, show_percentage: bool) {
        let Some(view) = IndicatorView::for_update(snapshot, show_percentage) else {
            self.container.set_visible(false);
            return;
        };

        self.icon.set_icon_name(Some(view.icon_name));
        apply_tier_class(&self.icon, view.tier);

        match view.text {
            Some(text) => {
                self.percentage_label.set_label(&text);
                self.percentage_label.set_visible(true);
            }
            None => self.percentage_label.set_visible(false),
        }

        self.container.set_tooltip_text(Some(&view.tooltip));
        self.container.set_visible(true);
    }
}

/// Battery widget that displays icon, percentage, and opens a popover on click.
pub struct BatteryWidget {
    base: BaseWidget,
    adapter: BatteryStatusAdapter,
}

impl BatteryWidget {
    /// Build the widget and start observing `capability`.
    pub fn new(
        capability: Rc<dyn BatteryCapability>,
        preference: Rc<PercentagePreference>,
        popover_position: PositionType,
    ) -> Self {
        let base = BaseWidget::new(&[bat::WIDGET]);
        base.set_tooltip("Battery");

        let icon = base.add_icon("battery-symbolic", &[bat::ICON]);
        let percentage_label = base.add_label(None, &[bat::PERCENTAGE]);

        let indicator = Indicator {
            container: base.widget().clone(),
            icon,
            percentage_label,
        };

        // Nothing is shown until the adapter knows whether there is a battery.
        base.widget().set_visible(false);

        let latest: Rc<Cell<Option<BatterySnapshot>>> = Rc::new(Cell::new(None));
        let controller_cell: Rc<RefCell<Option<BatteryPopoverController>>> =
            Rc::new(RefCell::new(None));

        // Popover content is rebuilt on every open from the latest snapshot.
        {
            let latest = latest.clone();
            let controller_for_builder = controller_cell.clone();
            let indicator = indicator.clone();
            let preference = preference.clone();
            base.create_menu(popover_position, move || {
                let Some(snapshot) = latest.get() else {
                    return Label::new(Some("Battery unavailable")).upcast::<gtk4::Widget>();
                };
                let display = BatteryDisplay::from_snapshot(&snapshot);

                let indicator = indicator.clone();
                let latest = latest.clone();
                let (widget, controller) =
                    build_battery_popover(&display, preference.clone(), move |show| {
                        debug!("BatteryWidget: show percentage -> {show}");
                        indicator.render(latest.get().as_ref(), show);
                    });
                *controller_for_builder.borrow_mut() = Some(controller);
                widget
            });
        }

        let adapter = BatteryStatusAdapter::new(capability);
        {
            let controller_for_cb = controller_cell.clone();
            adapter.observe(move |update: &BatteryUpdate| {
                latest.set(*update);
                indicator.render(update.as_ref(), preference.get());

                // Push live updates into the popover if it has been built.
                if let (Some(snapshot), Some(controller)) =
                    (update.as_ref(), controller_for_cb.borrow().as_ref())
                {
                    controller.update(&BatteryDisplay::from_snapshot(snapshot));
                }
            });
        }
        adapter.start();

        Self { base, adapter }
    }

    /// Get the root GTK widget for embedding in the applet.
    pub fn widget(&self) -> &GtkBox {
        self.base.widget()
    }

    /// Stop observing the battery. The widget stays hidden afterwards.
    pub fn unmount(&self) {
        self.adapter.stop();
        self.base.widget().set_visible(false);
    }
}
