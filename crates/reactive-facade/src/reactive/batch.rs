#![forbid(unsafe_code)]

//! Deferred notification scopes.
//!
//! While a [`BatchScope`] is alive on the current thread, every
//! [`Observable`](super::Observable) mutation updates the value immediately
//! but queues its notification instead of running it. When the outermost
//! scope is dropped the queue is flushed in first-change order, one
//! notification per observable carrying its final value.
//!
//! Nested scopes only bump a depth counter.

use std::cell::RefCell;
use std::marker::PhantomData;

#[derive(Default)]
struct BatchContext {
    depth: usize,
    pending: Vec<(usize, Box<dyn FnOnce()>)>,
}

thread_local! {
    static BATCH: RefCell<BatchContext> = RefCell::new(BatchContext::default());
}

/// RAII guard deferring observable notifications until it is dropped.
///
/// Not `Send`: a scope belongs to the thread that opened it.
#[must_use = "the batch ends as soon as the scope is dropped"]
pub struct BatchScope {
    _not_send: PhantomData<*const ()>,
}

impl BatchScope {
    /// Open a (possibly nested) batch on the current thread.
    pub fn new() -> Self {
        BATCH.with(|ctx| ctx.borrow_mut().depth += 1);
        Self {
            _not_send: PhantomData,
        }
    }

    /// Run `f` inside a batch and flush afterwards.
    pub fn run<R>(f: impl FnOnce() -> R) -> R {
        let _scope = Self::new();
        f()
    }

    /// Whether a batch is open on the current thread.
    #[must_use]
    pub fn is_active() -> bool {
        is_active()
    }
}

impl Default for BatchScope {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BatchScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let depth = BATCH.with(|ctx| ctx.borrow().depth);
        f.debug_struct("BatchScope").field("depth", &depth).finish()
    }
}

impl Drop for BatchScope {
    fn drop(&mut self) {
        let pending = BATCH.with(|ctx| {
            let mut ctx = ctx.borrow_mut();
            ctx.depth -= 1;
            if ctx.depth == 0 {
                std::mem::take(&mut ctx.pending)
            } else {
                Vec::new()
            }
        });
        // Depth is already zero here, so writes made by these callbacks
        // notify immediately.
        for (_, notify) in pending {
            notify();
        }
    }
}

pub(crate) fn is_active() -> bool {
    BATCH.with(|ctx| ctx.borrow().depth > 0)
}

/// Queue `notify` under `key`. Returns false when no batch is open.
///
/// A key already queued keeps its original slot; the closure reads the
/// final value at flush time so the later one is redundant.
pub(crate) fn defer(key: usize, notify: impl FnOnce() + 'static) -> bool {
    BATCH.with(|ctx| {
        let mut ctx = ctx.borrow_mut();
        if ctx.depth == 0 {
            return false;
        }
        if !ctx.pending.iter().any(|(k, _)| *k == key) {
            ctx.pending.push((key, Box::new(notify)));
        }
        true
    })
}
