//! Shared base widget abstraction for batpanel widgets.
//!
//! Provides a thin wrapper around a root `gtk4::Box` with common CSS
//! classes, an inner content box, and a click-toggled popover menu.

use gtk4::prelude::*;
use gtk4::{Align, Box as GtkBox, GestureClick, Image, Label, Orientation, Popover, PositionType};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

use crate::styles::{class, surface};

/// Vertical gap between the widget and its popover, in pixels.
const POPOVER_OFFSET: i32 = 6;

/// Configure a popover with the settings shared by every widget menu.
pub fn configure_popover(popover: &Popover, position: PositionType) {
    popover.set_has_arrow(false);
    popover.set_autohide(true);
    popover.add_css_class(surface::WIDGET_MENU);
    popover.set_position(position);
    popover.set_halign(Align::End);
    popover.set_offset(0, POPOVER_OFFSET);
}

/// A popover whose content is rebuilt every time it opens.
///
/// Open/closed is plain local UI state; nothing about it is persisted.
pub struct MenuHandle {
    popover: Popover,
    parent: GtkBox,
    builder: Rc<dyn Fn() -> gtk4::Widget>,
}

impl MenuHandle {
    fn refresh_content(&self) {
        let content = (self.builder)();
        content.add_css_class(surface::POPOVER_CONTENT);
        self.popover.set_child(Some(&content));
    }

    pub fn show(&self) {
        self.refresh_content();
        self.parent.add_css_class(class::OPEN);
        self.popover.popup();
    }

    pub fn hide(&self) {
        self.popover.popdown();
    }

    pub fn toggle(&self) {
        // get_visible() avoids the ancestry checks of is_visible()
        if self.popover.get_visible() {
            self.hide();
        } else {
            self.show();
        }
    }
}

/// Shared base widget container.
///
/// Children go into an inner content box; the outer box carries the
/// `widget` class and the click gesture.
pub struct BaseWidget {
    container: GtkBox,
    content: GtkBox,
    menu: Rc<RefCell<Option<Rc<MenuHandle>>>>,
    _gesture_click: GestureClick,
}

impl BaseWidget {
    /// Create a new base widget container with `extra_classes` applied.
    pub fn new(extra_classes: &[&str]) -> Self {
        let container = GtkBox::new(Orientation::Horizontal, 0);
        container.add_css_class(class::WIDGET);
        container.set_hexpand(false);
        for cls in extra_classes {
            container.add_css_class(cls);
        }

        let content = GtkBox::new(Orientation::Horizontal, 6);
        content.add_css_class(class::CONTENT);
        content.set_vexpand(true);
        content.set_valign(Align::Center);
        container.append(&content);

        let menu: Rc<RefCell<Option<Rc<MenuHandle>>>> = Rc::new(RefCell::new(None));

        let gesture_click = GestureClick::new();
        {
            let menu_for_cb = menu.clone();
            gesture_click.connect_pressed(move |gesture, n_press, _x, _y| {
                if n_press != 1 || gesture.current_button() != 1 {
                    return;
                }
                match menu_for_cb.borrow().as_ref() {
                    Some(menu) => menu.toggle(),
                    None => debug!("BaseWidget click: no menu registered"),
                }
            });
        }
        container.add_controller(gesture_click.clone());

        Self {
            container,
            content,
            menu,
            _gesture_click: gesture_click,
        }
    }

    /// Get the root GTK container for this widget.
    pub fn widget(&self) -> &GtkBox {
        &self.container
    }

    /// Create a themed icon, pack it into the content box and return it.
    pub fn add_icon(&self, icon_name: &str, css_classes: &[&str]) -> Image {
        let image = Image::from_icon_name(icon_name);
        for class in css_classes {
            image.add_css_class(class);
        }
        self.content.append(&image);
        image
    }

    /// Create a label and append it to the content box.
    pub fn add_label(&self, text: Option<&str>, css_classes: &[&str]) -> Label {
        let label = Label::new(text);
        for class in css_classes {
            label.add_css_class(class);
        }
        self.content.append(&label);
        label
    }

    pub fn set_tooltip(&self, text: &str) {
        self.container.set_tooltip_text(Some(text));
    }

    /// Attach the widget's popover. `builder` runs on every open.
    pub fn create_menu<F>(&self, position: PositionType, builder: F) -> Rc<MenuHandle>
    where
        F: Fn() -> gtk4::Widget + 'static,
    {
        let popover = Popover::new();
        popover.set_parent(&self.container);
        configure_popover(&popover, position);

        let parent = self.container.clone();
        popover.connect_closed(move |_| parent.remove_css_class(class::OPEN));

        let handle = Rc::new(MenuHandle {
            popover,
            parent: self.container.clone(),
            builder: Rc::new(builder),
        });
        *self.menu.borrow_mut() = Some(handle.clone());
        handle
    }
}
