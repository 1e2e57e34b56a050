//! BatteryStatusAdapter - turns a battery capability into a stream of
//! normalized snapshots.
//!
//! - Checks whether the host has a battery at all
//! - Requests a handle asynchronously; failure is final
//! - Emits a fresh full snapshot after each of the four change notifications
//! - `stop()` releases the subscription exactly once and drops any late
//!   completion or notification
//!
//! Consumers see `Some(snapshot)` while a battery is present and `None` once
//! the battery is known to be unsupported.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use super::capability::{BatteryCapability, BatteryEvent, BatteryHandle, CapabilityError, ListenerId};
use super::snapshot::BatterySnapshot;
use crate::callbacks::{CallbackId, Callbacks};

/// What observers receive: a snapshot, or `None` for "no battery".
pub type BatteryUpdate = Option<BatterySnapshot>;

#[derive(Debug, Clone, Copy, PartialEq)]
enum AdapterState {
    /// No capability, or the handle request failed. Never left.
    Unsupported,
    /// Waiting for the capability to hand out a handle.
    Pending,
    Available(BatterySnapshot),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Idle,
    Active,
    Stopped,
}

/// The handle plus the four listeners registered on it.
struct Subscription {
    handle: Rc<dyn BatteryHandle>,
    listeners: Vec<ListenerId>,
}

impl Subscription {
    fn release(self) {
        for id in self.listeners {
            self.handle.disconnect(id);
        }
    }
}

struct AdapterInner {
    capability: Rc<dyn BatteryCapability>,
    lifecycle: Cell<Lifecycle>,
    state: RefCell<AdapterState>,
    subscription: RefCell<Option<Subscription>>,
    callbacks: Callbacks<BatteryUpdate>,
}

/// Owns at most one subscription to a battery capability.
///
/// Not restartable: after `stop()` a new adapter must be created.
/// Dropping the adapter stops it.
pub struct BatteryStatusAdapter {
    inner: Rc<AdapterInner>,
}

impl BatteryStatusAdapter {
    pub fn new(capability: Rc<dyn BatteryCapability>) -> Self {
        Self {
            inner: Rc::new(AdapterInner {
                capability,
                lifecycle: Cell::new(Lifecycle::Idle),
                state: RefCell::new(AdapterState::Pending),
                subscription: RefCell::new(None),
                callbacks: Callbacks::new(),
            }),
        }
    }

    /// Activate the adapter. Only the first call has any effect.
    pub fn start(&self) {
        let inner = &self.inner;
        if inner.lifecycle.get() != Lifecycle::Idle {
            debug!("BatteryStatusAdapter: start() ignored, already {:?}", inner.lifecycle.get());
            return;
        }
        inner.lifecycle.set(Lifecycle::Active);

        if !inner.capability.is_present() {
            debug!("BatteryStatusAdapter: no battery capability on this host");
            inner.set_unsupported();
            return;
        }

        let weak = Rc::downgrade(inner);
        inner.capability.request_handle(Box::new(move |result| {
            let Some(inner) = weak.upgrade() else {
                debug!("BatteryStatusAdapter: handle arrived after adapter was dropped");
                return;
            };
            inner.on_handle(result);
        }));
    }

    /// Tear down: unregister all listeners and stop emitting. Idempotent.
    pub fn stop(&self) {
        self.inner.stop();
    }

    /// Register an observer.
    ///
    /// If the state is already resolved the observer is called right away
    /// with the current value.
    pub fn observe<F>(&self, callback: F) -> CallbackId
    where
        F: Fn(&BatteryUpdate) + 'static,
    {
        let id = self.inner.callbacks.register(callback);
        if let Some(current) = self.inner.resolved() {
            self.inner.callbacks.notify_one(id, &current);
        }
        id
    }

    pub fn unobserve(&self, id: CallbackId) -> bool {
        self.inner.callbacks.unregister(id)
    }

    /// Latest snapshot, if one is available.
    pub fn snapshot(&self) -> Option<BatterySnapshot> {
        match *self.inner.state.borrow() {
            AdapterState::Available(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    pub fn is_unsupported(&self) -> bool {
        *self.inner.state.borrow() == AdapterState::Unsupported
    }

    pub fn is_pending(&self) -> bool {
        *self.inner.state.borrow() == AdapterState::Pending
    }

    pub fn is_active(&self) -> bool {
        self.inner.lifecycle.get() == Lifecycle::Active
    }
}

impl Drop for BatteryStatusAdapter {
    fn drop(&mut self) {
        self.inner.stop();
    }
}

impl AdapterInner {
    fn resolved(&self) -> Option<BatteryUpdate> {
        match *self.state.borrow() {
            AdapterState::Unsupported => Some(None),
            AdapterState::Pending => None,
            AdapterState::Available(snapshot) => Some(Some(snapshot)),
        }
    }

    fn on_handle(self: &Rc<Self>, result: Result<Rc<dyn BatteryHandle>, CapabilityError>) {
        if self.lifecycle.get() != Lifecycle::Active {
            debug!("BatteryStatusAdapter: dropping handle request completed after stop()");
            return;
        }

        let handle = match result {
            Ok(handle) => handle,
            Err(err) => {
                warn!("Failed to get battery information: {err}");
                self.set_unsupported();
                return;
            }
        };

        let snapshot = BatterySnapshot::read(handle.as_ref());
        *self.state.borrow_mut() = AdapterState::Available(snapshot);

        let listeners = BatteryEvent::ALL
            .iter()
            .map(|&event| {
                let weak: Weak<Self> = Rc::downgrade(self);
                handle.connect(
                    event,
                    Rc::new(move || {
                        if let Some(inner) = weak.upgrade() {
                            inner.refresh(event);
                        }
                    }),
                )
            })
            .collect();

        *self.subscription.borrow_mut() = Some(Subscription { handle, listeners });
        debug!(
            "BatteryStatusAdapter: subscribed, level={:.2} charging={}",
            snapshot.level, snapshot.charging
        );
        self.callbacks.notify(&Some(snapshot));
    }

    /// Re-read every field after a change notification.
    fn refresh(&self, event: BatteryEvent) {
        if self.lifecycle.get() != Lifecycle::Active {
            debug!("BatteryStatusAdapter: ignoring {} after stop()", event.name());
            return;
        }

        let snapshot = {
            let subscription = self.subscription.borrow();
            let Some(subscription) = subscription.as_ref() else {
                return;
            };
            BatterySnapshot::read(subscription.handle.as_ref())
        };

        *self.state.borrow_mut() = AdapterState::Available(snapshot);
        self.callbacks.notify(&Some(snapshot));
    }

    fn set_unsupported(&self) {
        *self.state.borrow_mut() = AdapterState::Unsupported;
        self.callbacks.notify(&None);
    }

    fn stop(&self) {
        if self.lifecycle.get() == Lifecycle::Stopped {
            return;
        }
        self.lifecycle.set(Lifecycle::Stopped);

        let subscription = self.subscription.borrow_mut().take();
        if let Some(subscription) = subscription {
            subscription.release();
            debug!("BatteryStatusAdapter: listeners released");
        }
        self.callbacks.clear();
    }
}
