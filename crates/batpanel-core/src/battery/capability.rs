//! The platform battery capability, as seen by the adapter.
//!
//! A capability may be missing entirely (desktop hardware), or present but
//! fail to hand out a handle. A handle exposes the raw battery fields and
//! four change notifications. Raw time fields use `f64::INFINITY` when the
//! platform has no estimate.

use std::rc::Rc;

use thiserror::Error;

use crate::callbacks::{CallbackId, Callbacks};

/// The four change notifications a battery handle can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatteryEvent {
    LevelChange,
    ChargingChange,
    ChargingTimeChange,
    DischargingTimeChange,
}

impl BatteryEvent {
    pub const ALL: [BatteryEvent; 4] = [
        BatteryEvent::LevelChange,
        BatteryEvent::ChargingChange,
        BatteryEvent::ChargingTimeChange,
        BatteryEvent::DischargingTimeChange,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BatteryEvent::LevelChange => "levelchange",
            BatteryEvent::ChargingChange => "chargingchange",
            BatteryEvent::ChargingTimeChange => "chargingtimechange",
            BatteryEvent::DischargingTimeChange => "dischargingtimechange",
        }
    }
}

/// Identifies a listener connected with [`BatteryHandle::connect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(CallbackId);

/// Per-event listener registry for `BatteryHandle` implementations.
#[derive(Default)]
pub struct EventListeners {
    callbacks: Callbacks<BatteryEvent>,
}

impl EventListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `callback` whenever `event` is emitted.
    pub fn connect(&self, event: BatteryEvent, callback: Rc<dyn Fn()>) -> ListenerId {
        ListenerId(self.callbacks.register(move |fired: &BatteryEvent| {
            if *fired == event {
                callback();
            }
        }))
    }

    /// Returns `false` if `id` was not connected.
    pub fn disconnect(&self, id: ListenerId) -> bool {
        self.callbacks.unregister(id.0)
    }

    /// Fire `event`. Listeners may disconnect while it is being delivered.
    pub fn emit(&self, event: BatteryEvent) {
        self.callbacks.notify(&event);
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

/// Why a battery handle could not be acquired.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CapabilityError {
    #[error("battery capability is not available")]
    Unavailable,

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("platform error: {0}")]
    Platform(String),
}

/// A live handle onto the host battery.
pub trait BatteryHandle {
    /// Charge level as a fraction in `[0.0, 1.0]`.
    fn level(&self) -> f64;

    fn charging(&self) -> bool;

    /// Seconds until full; `f64::INFINITY` if unknown.
    fn charging_time(&self) -> f64;

    /// Seconds until empty; `f64::INFINITY` if unknown.
    fn discharging_time(&self) -> f64;

    /// Subscribe to one change notification.
    fn connect(&self, event: BatteryEvent, callback: Rc<dyn Fn()>) -> ListenerId;

    /// Remove a listener added with `connect`. Unknown ids are ignored.
    fn disconnect(&self, id: ListenerId);
}

/// Completion callback for [`BatteryCapability::request_handle`].
pub type HandleCallback = Box<dyn FnOnce(Result<Rc<dyn BatteryHandle>, CapabilityError>)>;

/// Host facility that may provide a battery handle.
pub trait BatteryCapability {
    /// Whether the host exposes a battery at all.
    fn is_present(&self) -> bool;

    /// Ask for a handle. `on_ready` runs exactly once, either synchronously
    /// or on a later main loop iteration.
    fn request_handle(&self, on_ready: HandleCallback);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_emit_dispatches_by_event() {
        let listeners = EventListeners::new();
        let fired: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));
        for event in BatteryEvent::ALL {
            let fired = fired.clone();
            listeners.connect(event, Rc::new(move || fired.borrow_mut().push(event.name())));
        }

        listeners.emit(BatteryEvent::ChargingTimeChange);
        listeners.emit(BatteryEvent::LevelChange);
        assert_eq!(*fired.borrow(), vec!["chargingtimechange", "levelchange"]);
    }

    #[test]
    fn test_disconnect_during_emit() {
        let listeners = Rc::new(EventListeners::new());
        let ids: Rc<RefCell<Vec<ListenerId>>> = Rc::new(RefCell::new(Vec::new()));
        let hits = Rc::new(std::cell::Cell::new(0));

        for _ in 0..2 {
            let weak = Rc::downgrade(&listeners);
            let ids_cb = ids.clone();
            let hits = hits.clone();
            let id = listeners.connect(
                BatteryEvent::LevelChange,
                Rc::new(move || {
                    hits.set(hits.get() + 1);
                    if let Some(listeners) = weak.upgrade() {
                        for id in ids_cb.borrow().iter() {
                            listeners.disconnect(*id);
                        }
                    }
                }),
            );
            ids.borrow_mut().push(id);
        }

        // Both run for the emit in progress, neither afterwards.
        listeners.emit(BatteryEvent::LevelChange);
        assert_eq!(hits.get(), 2);
        assert!(listeners.is_empty());
        listeners.emit(BatteryEvent::LevelChange);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_disconnect_unknown_id() {
        let listeners = EventListeners::new();
        let id = listeners.connect(BatteryEvent::ChargingChange, Rc::new(|| {}));
        assert!(listeners.disconnect(id));
        assert!(!listeners.disconnect(id));
        assert_eq!(listeners.len(), 0);
    }
}
