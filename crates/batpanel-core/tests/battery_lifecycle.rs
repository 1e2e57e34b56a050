//! End-to-end: capability -> adapter -> display state -> preference.

use std::cell::RefCell;
use std::rc::Rc;

use batpanel_core::battery::simulated::{SimulatedCapability, SimulatedHandle};
use batpanel_core::battery::{
    BatteryDisplay, BatteryGlyph, BatteryStatusAdapter, BatteryTier, BatteryUpdate,
    CapabilityError,
};
use batpanel_core::settings::{
    MemorySettingsStore, PercentagePreference, SHOW_PERCENTAGE_KEY, SettingsStore,
};

/// What a widget would show for the latest update: nothing, or a display.
fn render(update: &BatteryUpdate) -> Option<BatteryDisplay> {
    update.as_ref().map(BatteryDisplay::from_snapshot)
}

fn mount(adapter: &BatteryStatusAdapter) -> Rc<RefCell<Vec<Option<BatteryDisplay>>>> {
    let frames = Rc::new(RefCell::new(Vec::new()));
    let frames_cb = frames.clone();
    adapter.observe(move |update| frames_cb.borrow_mut().push(render(update)));
    adapter.start();
    frames
}

#[test]
fn test_no_battery_renders_nothing() {
    let adapter = BatteryStatusAdapter::new(SimulatedCapability::absent());
    let frames = mount(&adapter);

    assert_eq!(*frames.borrow(), vec![None]);
}

#[test]
fn test_acquisition_failure_renders_nothing() {
    let capability = SimulatedCapability::failing(CapabilityError::Platform("dbus down".into()));
    let adapter = BatteryStatusAdapter::new(capability);
    let frames = mount(&adapter);

    assert_eq!(*frames.borrow(), vec![None]);
    assert!(adapter.is_unsupported());
}

#[test]
fn test_low_battery_on_discharge() {
    let handle = SimulatedHandle::new(0.15, false, f64::INFINITY, 600.0);
    let adapter = BatteryStatusAdapter::new(SimulatedCapability::with_handle(handle));
    let frames = mount(&adapter);

    let frames = frames.borrow();
    let display = frames[0].as_ref().expect("battery should render");
    assert_eq!(display.tier, BatteryTier::Critical);
    assert_eq!(display.glyph, BatteryGlyph::Normal);
    assert_eq!(display.indicator_text(true).as_deref(), Some("15%"));
    assert_eq!(display.status, "Not charging");
    let time = display.time_line.as_ref().unwrap();
    assert_eq!(time.label, "Time remaining");
    assert_eq!(time.value, "10m");
}

#[test]
fn test_plugging_in_switches_to_charging_tier() {
    let handle = SimulatedHandle::new(0.05, false, f64::INFINITY, 300.0);
    let adapter = BatteryStatusAdapter::new(SimulatedCapability::with_handle(handle.clone()));
    let frames = mount(&adapter);

    handle.set_charging(true);

    let frames = frames.borrow();
    assert_eq!(frames.len(), 2);
    let display = frames[1].as_ref().unwrap();
    assert_eq!(display.tier, BatteryTier::Charging);
    assert_eq!(display.glyph, BatteryGlyph::Charging);
    assert_eq!(display.status, "Charging");
    // Charging time is still the platform's "no estimate" value.
    assert_eq!(display.time_line.as_ref().unwrap().value, "Unknown");
}

#[test]
fn test_deferred_handle_then_unmount() {
    let handle = SimulatedHandle::new(0.9, false, f64::INFINITY, 20000.0);
    let capability = SimulatedCapability::deferred(handle.clone());
    let adapter = BatteryStatusAdapter::new(capability.clone());
    let frames = mount(&adapter);

    assert!(frames.borrow().is_empty());
    capability.complete();
    assert_eq!(frames.borrow().len(), 1);
    assert_eq!(frames.borrow()[0].as_ref().unwrap().tier, BatteryTier::Neutral);

    drop(adapter);
    handle.set_level(0.1);
    assert_eq!(frames.borrow().len(), 1);
    assert_eq!(handle.listener_count(), 0);
}

#[test]
fn test_preference_toggle_changes_next_render() {
    let store = Rc::new(MemorySettingsStore::new());
    let preference = PercentagePreference::load(store.clone());

    let handle = SimulatedHandle::new(0.42, false, f64::INFINITY, f64::INFINITY);
    let adapter = BatteryStatusAdapter::new(SimulatedCapability::with_handle(handle));
    adapter.start();
    let display = BatteryDisplay::from_snapshot(&adapter.snapshot().unwrap());

    assert_eq!(display.indicator_text(preference.get()).as_deref(), Some("42%"));
    preference.toggle();
    assert_eq!(display.indicator_text(preference.get()), None);
    assert_eq!(store.get_bool(SHOW_PERCENTAGE_KEY), Some(false));
}
