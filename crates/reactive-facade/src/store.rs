#![forbid(unsafe_code)]

//! Reactive record of named JSON fields.
//!
//! A [`Store`] is an [`Observable`] over an insertion-ordered
//! `String -> serde_json::Value` map. Field writes that change a value bump
//! the version and notify subscribers; writes of an equal value are
//! dropped. Every handle obtained by `clone()` reaches the same record.

use serde_json::{Map, Value};

use crate::reactive::{Observable, Subscription};

/// Backing record: field name to plain JSON value, in insertion order.
pub type Record = Map<String, Value>;

/// Shared handle to a reactive record.
#[derive(Clone)]
pub struct Store {
    record: Observable<Record>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("record", &self.record.with(|r| r.clone()))
            .field("version", &self.record.version())
            .finish()
    }
}

impl Store {
    /// Take ownership of `record` as the initial contents.
    #[must_use]
    pub fn new(record: Record) -> Self {
        Self {
            record: Observable::new(record),
        }
    }

    /// Deep copy of the field stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.record.with(|r| r.get(key).cloned())
    }

    /// Borrow the field under `key` without copying it.
    pub fn with_field<R>(&self, key: &str, f: impl FnOnce(Option<&Value>) -> R) -> R {
        self.record.with(|r| f(r.get(key)))
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.record.with(|r| r.contains_key(key))
    }

    /// Current keys in iteration order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.record.with(|r| r.keys().cloned().collect())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.record.with(Map::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store `value` under `key`. Returns whether the record changed.
    ///
    /// New keys are appended to the iteration order; existing keys keep
    /// their position.
    pub fn set(&self, key: impl Into<String>, value: Value) -> bool {
        let key = key.into();
        let changed = self.record.modify(|r| {
            if r.get(&key) == Some(&value) {
                return false;
            }
            r.insert(key.clone(), value);
            true
        });
        if changed {
            tracing::trace!(field = %key, "store field written");
        }
        changed
    }

    /// Remove `key`, preserving the order of the remaining fields.
    pub fn remove(&self, key: &str) -> Option<Value> {
        let mut removed = None;
        self.record.modify(|r| {
            removed = r.shift_remove(key);
            removed.is_some()
        });
        removed
    }

    /// Replace the whole record. Notifies once if anything differs,
    /// key order included.
    pub fn replace(&self, record: Record) {
        self.record.modify(|r| {
            // Map equality ignores key order; the iteration order is part of
            // the record.
            let same = r.len() == record.len() && r.iter().eq(record.iter());
            if !same {
                *r = record;
            }
            !same
        });
    }

    /// Deep, non-live copy of the record.
    #[must_use]
    pub fn to_record(&self) -> Record {
        self.record.get()
    }

    /// Number of changing writes applied so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.record.version()
    }

    /// Invoke `callback` with the record after each change (or change
    /// batch).
    pub fn subscribe(&self, callback: impl Fn(&Record) + 'static) -> Subscription {
        self.record.subscribe(callback)
    }
}
