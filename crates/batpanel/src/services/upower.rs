//! UPower-backed battery capability.
//!
//! - Presence: a `Battery`-type device under /sys/class/power_supply
//! - Handle: asynchronous `DBusProxy` for the UPower DisplayDevice
//! - Notifications: `g-properties-changed` split into the four battery
//!   events by property name

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use batpanel_core::battery::{
    BatteryCapability, BatteryEvent, BatteryHandle, CapabilityError, EventListeners,
    HandleCallback, ListenerId,
};
use gtk4::gio;
use gtk4::glib;
use gtk4::prelude::*;
use tracing::{debug, trace};

/// Path to the kernel's power supply sysfs directory.
const POWER_SUPPLY_PATH: &str = "/sys/class/power_supply";

/// DBus constants for the UPower DisplayDevice.
const UPOWER_NAME: &str = "org.freedesktop.UPower";
const DISPLAY_PATH: &str = "/org/freedesktop/UPower/devices/DisplayDevice";
const DEVICE_IFACE: &str = "org.freedesktop.UPower.Device";

/// UPower state codes treated as "plugged in".
/// See: https://upower.freedesktop.org/docs/Device.html#Device:State
const STATE_CHARGING: u32 = 1;
const STATE_FULLY_CHARGED: u32 = 4;

/// Map a UPower property name to the battery event it drives.
fn event_for_property(name: &str) -> Option<BatteryEvent> {
    match name {
        "Percentage" | "Energy" => Some(BatteryEvent::LevelChange),
        "State" => Some(BatteryEvent::ChargingChange),
        "TimeToFull" => Some(BatteryEvent::ChargingTimeChange),
        "TimeToEmpty" => Some(BatteryEvent::DischargingTimeChange),
        _ => None,
    }
}

/// Convert a UPower time (seconds, 0 = unknown) to the raw handle value.
fn seconds_or_sentinel(value: Option<i64>) -> f64 {
    match value {
        Some(seconds) if seconds > 0 => seconds as f64,
        _ => f64::INFINITY,
    }
}

/// Battery capability backed by UPower on the system bus.
#[derive(Debug, Default)]
pub struct UPowerCapability;

impl UPowerCapability {
    pub fn new() -> Rc<Self> {
        Rc::new(Self)
    }

    /// Check if any battery device exists under /sys/class/power_supply.
    fn has_battery_device() -> bool {
        let path = Path::new(POWER_SUPPLY_PATH);
        let entries = match fs::read_dir(path) {
            Ok(it) => it,
            Err(err) => {
                debug!("UPowerCapability: failed to read {}: {err}", POWER_SUPPLY_PATH);
                return false;
            }
        };

        let found = entries.flatten().any(|entry| {
            fs::read_to_string(entry.path().join("type"))
                .is_ok_and(|content| content.trim().eq_ignore_ascii_case("battery"))
        });

        if !found {
            debug!(
                "UPowerCapability: no battery type device found in {}",
                POWER_SUPPLY_PATH
            );
        }
        found
    }
}

fn capability_error(err: &glib::Error) -> CapabilityError {
    if err.matches(gio::DBusError::AccessDenied) || err.matches(gio::IOErrorEnum::PermissionDenied)
    {
        CapabilityError::PermissionDenied(err.to_string())
    } else {
        CapabilityError::Platform(err.to_string())
    }
}

impl BatteryCapability for UPowerCapability {
    fn is_present(&self) -> bool {
        Self::has_battery_device()
    }

    fn request_handle(&self, on_ready: HandleCallback) {
        gio::DBusProxy::for_bus(
            gio::BusType::System,
            gio::DBusProxyFlags::NONE,
            None::<&gio::DBusInterfaceInfo>,
            UPOWER_NAME,
            DISPLAY_PATH,
            DEVICE_IFACE,
            None::<&gio::Cancellable>,
            move |res| {
                let result = match res {
                    Ok(proxy) if proxy.cached_property("Percentage").is_none() => {
                        Err(CapabilityError::Platform(
                            "UPower DisplayDevice reported no Percentage".to_string(),
                        ))
                    }
                    Ok(proxy) => Ok(UPowerHandle::new(proxy) as Rc<dyn BatteryHandle>),
                    Err(e) => Err(capability_error(&e)),
                };
                on_ready(result);
            },
        );
    }
}

/// Live view of the UPower DisplayDevice.
pub struct UPowerHandle {
    proxy: gio::DBusProxy,
    signal: RefCell<Option<glib::SignalHandlerId>>,
    listeners: EventListeners,
}

impl UPowerHandle {
    fn new(proxy: gio::DBusProxy) -> Rc<Self> {
        let handle = Rc::new(Self {
            proxy: proxy.clone(),
            signal: RefCell::new(None),
            listeners: EventListeners::new(),
        });

        let weak = Rc::downgrade(&handle);
        let signal = proxy.connect_local("g-properties-changed", false, move |values| {
            let handle = weak.upgrade()?;
            let changed = values.get(1)?.get::<glib::Variant>().ok()?;
            handle.dispatch_changed(&changed);
            None
        });
        handle.signal.replace(Some(signal));

        handle
    }

    /// Fire one event per changed property, in the order UPower sent them.
    fn dispatch_changed(&self, changed: &glib::Variant) {
        let mut events: Vec<BatteryEvent> = Vec::new();
        for entry in changed.iter() {
            let key = entry.child_value(0);
            let Some(name) = key.str() else {
                continue;
            };
            trace!("UPowerHandle: property changed: {name}");
            if let Some(event) = event_for_property(name)
                && !events.contains(&event)
            {
                events.push(event);
            }
        }

        for event in events {
            self.listeners.emit(event);
        }
    }

    fn f64_property(&self, name: &str) -> Option<f64> {
        self.proxy.cached_property(name).and_then(|v| v.get::<f64>())
    }

    fn i64_property(&self, name: &str) -> Option<i64> {
        self.proxy.cached_property(name).and_then(|v| v.get::<i64>())
    }

    fn u32_property(&self, name: &str) -> Option<u32> {
        self.proxy.cached_property(name).and_then(|v| v.get::<u32>())
    }
}

impl BatteryHandle for UPowerHandle {
    fn level(&self) -> f64 {
        let energy = self.f64_property("Energy");
        let full = self.f64_property("EnergyFull");
        match (energy, full) {
            (Some(e), Some(f)) if f > 0.0 => e / f,
            _ => self.f64_property("Percentage").unwrap_or(0.0) / 100.0,
        }
    }

    fn charging(&self) -> bool {
        matches!(
            self.u32_property("State"),
            Some(STATE_CHARGING) | Some(STATE_FULLY_CHARGED)
        )
    }

    fn charging_time(&self) -> f64 {
        seconds_or_sentinel(self.i64_property("TimeToFull"))
    }

    fn discharging_time(&self) -> f64 {
        seconds_or_sentinel(self.i64_property("TimeToEmpty"))
    }

    fn connect(&self, event: BatteryEvent, callback: Rc<dyn Fn()>) -> ListenerId {
        self.listeners.connect(event, callback)
    }

    fn disconnect(&self, id: ListenerId) {
        self.listeners.disconnect(id);
    }
}

impl Drop for UPowerHandle {
    fn drop(&mut self) {
        if let Some(signal) = self.signal.borrow_mut().take() {
            self.proxy.disconnect(signal);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_for_property() {
        assert_eq!(event_for_property("Percentage"), Some(BatteryEvent::LevelChange));
        assert_eq!(event_for_property("State"), Some(BatteryEvent::ChargingChange));
        assert_eq!(event_for_property("TimeToFull"), Some(BatteryEvent::ChargingTimeChange));
        assert_eq!(
            event_for_property("TimeToEmpty"),
            Some(BatteryEvent::DischargingTimeChange)
        );
        assert_eq!(event_for_property("EnergyRate"), None);
    }

    #[test]
    fn test_seconds_or_sentinel() {
        assert_eq!(seconds_or_sentinel(Some(600)), 600.0);
        assert!(seconds_or_sentinel(Some(0)).is_infinite());
        assert!(seconds_or_sentinel(Some(-5)).is_infinite());
        assert!(seconds_or_sentinel(None).is_infinite());
    }
}
