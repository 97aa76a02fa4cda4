#![forbid(unsafe_code)]

//! Version-tracked shared values with subscriber callbacks.
//!
//! # Design
//!
//! [`Observable<T>`] keeps its value, a version counter and a list of
//! subscribers in shared `Rc<RefCell<..>>` storage. Subscribers are held as
//! `Weak` callback pointers; the strong side lives in the [`Subscription`]
//! guard handed back to the caller, so dropping the guard is all it takes to
//! unsubscribe. Dead entries are pruned on the next subscribe or
//! notification.
//!
//! # Invariants
//!
//! 1. `version` increments exactly once per mutation that changes the value.
//! 2. Subscribers are notified in registration order.
//! 3. Setting a value equal to the current one is a no-op.
//! 4. Callbacks run after the interior borrow is released and receive a
//!    clone of the value, so a callback may write back into the same
//!    observable.
//! 5. Inside a [`BatchScope`](super::BatchScope) the value changes at once
//!    but notification is deferred to the end of the outermost scope.

use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::batch;

type Callback<T> = dyn Fn(&T);

struct ObservableInner<T> {
    value: T,
    version: u64,
    subscribers: Vec<Weak<Callback<T>>>,
}

/// A shared, version-tracked value that notifies subscribers on change.
///
/// Cloning an `Observable` creates a new handle to the **same** value.
pub struct Observable<T> {
    inner: Rc<RefCell<ObservableInner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

/// RAII guard keeping a subscriber callback alive.
///
/// Dropping the guard unsubscribes; the callback will not run in any
/// notification cycle that starts afterwards.
#[must_use = "dropping a Subscription immediately unsubscribes the callback"]
pub struct Subscription {
    _callback: Box<dyn Any>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Wrap a value. The initial version is 0.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObservableInner {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Access the current value by reference.
    ///
    /// # Panics
    ///
    /// Panics if the closure mutates this observable (re-entrant borrow).
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Replace the value. No-op when `value` equals the current value.
    pub fn set(&self, value: T) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return;
            }
            inner.value = value;
            inner.version += 1;
        }
        self.notify();
    }

    /// Mutate the value in place. Subscribers are notified only if the
    /// value differs afterwards.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        {
            let mut inner = self.inner.borrow_mut();
            let before = inner.value.clone();
            f(&mut inner.value);
            if inner.value == before {
                return;
            }
            inner.version += 1;
        }
        self.notify();
    }

    /// Mutate the value in place; the closure reports whether it changed
    /// anything. Avoids the before/after comparison of [`update`](Self::update)
    /// for large values whose change is known locally.
    ///
    /// Returns the closure's verdict.
    pub fn modify(&self, f: impl FnOnce(&mut T) -> bool) -> bool {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            let changed = f(&mut inner.value);
            if changed {
                inner.version += 1;
            }
            changed
        };
        if changed {
            self.notify();
        }
        changed
    }

    /// Number of value-changing mutations so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Register a callback invoked with the new value after each change.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let callback: Rc<Callback<T>> = Rc::new(callback);
        let mut inner = self.inner.borrow_mut();
        inner.subscribers.retain(|weak| weak.strong_count() > 0);
        inner.subscribers.push(Rc::downgrade(&callback));
        drop(inner);
        Subscription {
            _callback: Box::new(callback),
        }
    }

    /// Number of subscribers whose guard is still alive.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    fn notify(&self) {
        if batch::is_active() {
            let inner = Rc::clone(&self.inner);
            let key = Rc::as_ptr(&self.inner) as *const () as usize;
            if batch::defer(key, move || Self::notify_now(&inner)) {
                return;
            }
        }
        Self::notify_now(&self.inner);
    }

    fn notify_now(inner: &Rc<RefCell<ObservableInner<T>>>) {
        let (value, callbacks) = {
            let mut guard = inner.borrow_mut();
            guard.subscribers.retain(|weak| weak.strong_count() > 0);
            let callbacks: Vec<Rc<Callback<T>>> =
                guard.subscribers.iter().filter_map(Weak::upgrade).collect();
            (guard.value.clone(), callbacks)
        };
        for callback in callbacks {
            callback(&value);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
