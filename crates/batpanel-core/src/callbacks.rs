//! Callback registry for single-threaded services.
//!
//! Services hold a `Callbacks<T>` and call `notify` whenever their state
//! changes. Everything runs on the main loop, so plain `Rc`/`RefCell` is
//! enough.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Handle returned by [`Callbacks::register`], used to unregister later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

type Callback<T> = Rc<dyn Fn(&T)>;

/// A list of listeners for values of type `T`.
pub struct Callbacks<T> {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(CallbackId, Callback<T>)>>,
}

impl<T> Callbacks<T> {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(1),
            entries: RefCell::new(Vec::new()),
        }
    }

    /// Register a callback and return its id.
    pub fn register<F>(&self, callback: F) -> CallbackId
    where
        F: Fn(&T) + 'static,
    {
        let id = CallbackId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.entries.borrow_mut().push((id, Rc::new(callback)));
        id
    }

    /// Remove a callback. Returns `false` if it was not registered.
    pub fn unregister(&self, id: CallbackId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    /// Invoke every registered callback with `value`.
    ///
    /// Iterates over a copy of the list, so callbacks may register or
    /// unregister while being notified.
    pub fn notify(&self, value: &T) {
        let entries: Vec<Callback<T>> = self
            .entries
            .borrow()
            .iter()
            .map(|(_, cb)| cb.clone())
            .collect();
        for callback in entries {
            callback(value);
        }
    }

    /// Invoke a single callback, if it is still registered.
    pub fn notify_one(&self, id: CallbackId, value: &T) {
        let callback = self
            .entries
            .borrow()
            .iter()
            .find(|(entry_id, _)| *entry_id == id)
            .map(|(_, cb)| cb.clone());
        if let Some(callback) = callback {
            callback(value);
        }
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl<T> Default for Callbacks<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_notify() {
        let callbacks: Callbacks<u32> = Callbacks::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let seen_a = seen.clone();
        callbacks.register(move |v| seen_a.borrow_mut().push(("a", *v)));
        let seen_b = seen.clone();
        callbacks.register(move |v| seen_b.borrow_mut().push(("b", *v)));

        callbacks.notify(&7);
        assert_eq!(*seen.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn test_unregister() {
        let callbacks: Callbacks<u32> = Callbacks::new();
        let count = Rc::new(Cell::new(0));
        let count_cb = count.clone();
        let id = callbacks.register(move |_| count_cb.set(count_cb.get() + 1));

        assert!(callbacks.unregister(id));
        assert!(!callbacks.unregister(id));
        callbacks.notify(&1);
        assert_eq!(count.get(), 0);
        assert!(callbacks.is_empty());
    }

    #[test]
    fn test_unregister_during_notify() {
        let callbacks: Rc<Callbacks<u32>> = Rc::new(Callbacks::new());
        let id_cell: Rc<Cell<Option<CallbackId>>> = Rc::new(Cell::new(None));

        let callbacks_cb = callbacks.clone();
        let id_for_cb = id_cell.clone();
        let id = callbacks.register(move |_| {
            if let Some(id) = id_for_cb.get() {
                callbacks_cb.unregister(id);
            }
        });
        id_cell.set(Some(id));

        callbacks.notify(&1);
        assert_eq!(callbacks.len(), 0);
    }

    #[test]
    fn test_notify_one() {
        let callbacks: Callbacks<u32> = Callbacks::new();
        let count = Rc::new(Cell::new(0));
        let count_a = count.clone();
        let first = callbacks.register(move |v| count_a.set(count_a.get() + *v));
        let count_b = count.clone();
        callbacks.register(move |v| count_b.set(count_b.get() + 100 * *v));

        callbacks.notify_one(first, &1);
        assert_eq!(count.get(), 1);
    }
}
