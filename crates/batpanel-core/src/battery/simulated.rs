//! In-process battery capability.
//!
//! Drives the adapter without any platform service: the applet's
//! `--simulate` mode and the test suites both use it.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::capability::{
    BatteryCapability, BatteryEvent, BatteryHandle, CapabilityError, EventListeners,
    HandleCallback, ListenerId,
};

/// A battery whose fields are set by hand.
pub struct SimulatedHandle {
    level: Cell<f64>,
    charging: Cell<bool>,
    charging_time: Cell<f64>,
    discharging_time: Cell<f64>,
    listeners: EventListeners,
}

impl SimulatedHandle {
    pub fn new(level: f64, charging: bool, charging_time: f64, discharging_time: f64) -> Rc<Self> {
        Rc::new(Self {
            level: Cell::new(level),
            charging: Cell::new(charging),
            charging_time: Cell::new(charging_time),
            discharging_time: Cell::new(discharging_time),
            listeners: EventListeners::new(),
        })
    }

    pub fn set_level(&self, level: f64) {
        self.level.set(level);
        self.emit(BatteryEvent::LevelChange);
    }

    pub fn set_charging(&self, charging: bool) {
        self.charging.set(charging);
        self.emit(BatteryEvent::ChargingChange);
    }

    pub fn set_charging_time(&self, seconds: f64) {
        self.charging_time.set(seconds);
        self.emit(BatteryEvent::ChargingTimeChange);
    }

    pub fn set_discharging_time(&self, seconds: f64) {
        self.discharging_time.set(seconds);
        self.emit(BatteryEvent::DischargingTimeChange);
    }

    /// Change every field without notifying anyone.
    pub fn update_fields(&self, level: f64, charging: bool, charging_time: f64, discharging_time: f64) {
        self.level.set(level);
        self.charging.set(charging);
        self.charging_time.set(charging_time);
        self.discharging_time.set(discharging_time);
    }

    /// Fire `event` to every listener connected for it.
    pub fn emit(&self, event: BatteryEvent) {
        self.listeners.emit(event);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Advance the simulation by one step.
    ///
    /// Discharges by `step` while on battery and charges while plugged in,
    /// flipping state at the ends so a demo cycles forever.
    pub fn tick(&self, step: f64) {
        let level = self.level.get();
        if self.charging.get() {
            let next = (level + step).min(1.0);
            self.set_level(next);
            self.set_charging_time(((1.0 - next) / step * 60.0).round());
            if next >= 1.0 {
                self.set_charging(false);
                self.set_charging_time(f64::INFINITY);
            }
        } else {
            let next = (level - step).max(0.0);
            self.set_level(next);
            self.set_discharging_time((next / step * 60.0).round());
            if next <= 0.05 {
                self.set_charging(true);
                self.set_discharging_time(f64::INFINITY);
            }
        }
    }
}

impl BatteryHandle for SimulatedHandle {
    fn level(&self) -> f64 {
        self.level.get()
    }

    fn charging(&self) -> bool {
        self.charging.get()
    }

    fn charging_time(&self) -> f64 {
        self.charging_time.get()
    }

    fn discharging_time(&self) -> f64 {
        self.discharging_time.get()
    }

    fn connect(&self, event: BatteryEvent, callback: Rc<dyn Fn()>) -> ListenerId {
        self.listeners.connect(event, callback)
    }

    fn disconnect(&self, id: ListenerId) {
        self.listeners.disconnect(id);
    }
}

enum Outcome {
    Handle(Rc<SimulatedHandle>),
    Fail(CapabilityError),
}

/// A capability answering from a script instead of the platform.
pub struct SimulatedCapability {
    present: bool,
    outcome: Outcome,
    deferred: bool,
    pending: RefCell<Option<HandleCallback>>,
    requests: Cell<usize>,
}

impl SimulatedCapability {
    /// No battery on this host.
    pub fn absent() -> Rc<Self> {
        Rc::new(Self::build(
            false,
            Outcome::Fail(CapabilityError::Unavailable),
            false,
        ))
    }

    /// A battery that hands out `handle` immediately.
    pub fn with_handle(handle: Rc<SimulatedHandle>) -> Rc<Self> {
        Rc::new(Self::build(true, Outcome::Handle(handle), false))
    }

    /// A battery whose handle arrives only when [`complete`](Self::complete) is called.
    pub fn deferred(handle: Rc<SimulatedHandle>) -> Rc<Self> {
        Rc::new(Self::build(true, Outcome::Handle(handle), true))
    }

    /// A battery that is present but refuses to hand out a handle.
    pub fn failing(error: CapabilityError) -> Rc<Self> {
        Rc::new(Self::build(true, Outcome::Fail(error), false))
    }

    fn build(present: bool, outcome: Outcome, deferred: bool) -> Self {
        Self {
            present,
            outcome,
            deferred,
            pending: RefCell::new(None),
            requests: Cell::new(0),
        }
    }

    /// Resolve a deferred request. Returns `false` if none was pending.
    pub fn complete(&self) -> bool {
        let Some(on_ready) = self.pending.borrow_mut().take() else {
            return false;
        };
        on_ready(self.result());
        true
    }

    /// Number of `request_handle` calls seen so far.
    pub fn request_count(&self) -> usize {
        self.requests.get()
    }

    fn result(&self) -> Result<Rc<dyn BatteryHandle>, CapabilityError> {
        match &self.outcome {
            Outcome::Handle(handle) => Ok(handle.clone() as Rc<dyn BatteryHandle>),
            Outcome::Fail(err) => Err(err.clone()),
        }
    }
}

impl BatteryCapability for SimulatedCapability {
    fn is_present(&self) -> bool {
        self.present
    }

    fn request_handle(&self, on_ready: HandleCallback) {
        self.requests.set(self.requests.get() + 1);
        if self.deferred {
            *self.pending.borrow_mut() = Some(on_ready);
        } else {
            on_ready(self.result());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_reaches_only_matching_listeners() {
        let handle = SimulatedHandle::new(0.5, false, f64::INFINITY, 100.0);
        let hits = Rc::new(Cell::new(0));
        let hits_cb = hits.clone();
        handle.connect(BatteryEvent::LevelChange, Rc::new(move || hits_cb.set(hits_cb.get() + 1)));

        handle.set_charging(true);
        assert_eq!(hits.get(), 0);
        handle.set_level(0.6);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_disconnect() {
        let handle = SimulatedHandle::new(0.5, false, 0.0, 0.0);
        let id = handle.connect(BatteryEvent::ChargingChange, Rc::new(|| {}));
        assert_eq!(handle.listener_count(), 1);
        handle.disconnect(id);
        assert_eq!(handle.listener_count(), 0);
    }

    #[test]
    fn test_tick_flips_to_charging_when_drained() {
        let handle = SimulatedHandle::new(0.06, false, f64::INFINITY, 60.0);
        handle.tick(0.01);
        assert!(handle.charging());
        assert!(handle.discharging_time().is_infinite());
    }

    #[test]
    fn test_deferred_request_waits_for_complete() {
        let handle = SimulatedHandle::new(0.5, false, 0.0, 0.0);
        let capability = SimulatedCapability::deferred(handle);
        let done = Rc::new(Cell::new(false));
        let done_cb = done.clone();
        capability.request_handle(Box::new(move |res| done_cb.set(res.is_ok())));

        assert!(!done.get());
        assert!(capability.complete());
        assert!(done.get());
        assert!(!capability.complete());
    }
}
