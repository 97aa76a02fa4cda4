#![forbid(unsafe_code)]

//! Delegating facade over a reactive record.
//!
//! # Design
//!
//! A [`Facade`] merges two buckets behind one name-based surface:
//!
//! - the reserved [`Operation`] names (`current`, `snapshot`, `update`,
//!   `reset` and, unless disabled, `subscribe`), and
//! - the fields of a backing [`Store`].
//!
//! Every access ([`get`](Facade::get), [`set`](Facade::set),
//! [`has`](Facade::has), [`keys`](Facade::keys)) first classifies the name
//! with [`Facade::route`]. Reserved names win: a record field named
//! `current` is shadowed from name-based access and can only be written
//! through [`update`](Facade::update) or the live [`Store`] handle.
//!
//! The facade, its store and the reset baseline are created together. No
//! constructor accepts an existing store, so a record is never shared
//! between two facades.
//!
//! # Invariants
//!
//! 1. Classification is recomputed on every access; nothing is cached.
//! 2. A write to a reserved name leaves the record untouched and returns
//!    [`FacadeError::ReservedName`].
//! 3. [`keys`](Facade::keys) lists each operation name, then each live
//!    record key, every name exactly once.
//! 4. [`reset`](Facade::reset) writes fresh deep copies of the baseline, so
//!    successive resets never share nested values.
//!
//! # Failure Modes
//!
//! - **Reserved-name write**: logged at `warn` and reported as an error; the
//!   facade stays usable.
//! - **Non-plain initial value**: [`Facade::from_serialize`] surfaces the
//!   serde_json failure unmodified as [`FacadeError::Copy`].

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{FacadeConfig, UpdateNotify};
use crate::error::{FacadeError, Result};
use crate::operation::Operation;
use crate::reactive::{BatchScope, Subscription};
use crate::store::{Record, Store};

/// Which bucket a name resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Operation(Operation),
    Field,
}

/// Result of reading a name through the facade.
#[derive(Debug)]
pub enum Entry<'a> {
    /// The name is reserved; the operation is bound to the facade.
    Operation(BoundOperation<'a>),
    /// Deep copy of the field, or `None` if the record has no such key.
    Field(Option<Value>),
}

impl<'a> Entry<'a> {
    #[must_use]
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::Operation(bound) => Some(bound.operation()),
            Self::Field(_) => None,
        }
    }

    #[must_use]
    pub fn is_operation(&self) -> bool {
        matches!(self, Self::Operation(_))
    }

    #[must_use]
    pub fn as_field(&self) -> Option<&Value> {
        match self {
            Self::Field(value) => value.as_ref(),
            Self::Operation(_) => None,
        }
    }

    #[must_use]
    pub fn into_field(self) -> Option<Value> {
        match self {
            Self::Field(value) => value,
            Self::Operation(_) => None,
        }
    }

    #[must_use]
    pub fn into_operation(self) -> Option<BoundOperation<'a>> {
        match self {
            Self::Operation(bound) => Some(bound),
            Self::Field(_) => None,
        }
    }
}

/// Arguments for [`BoundOperation::invoke`].
pub enum Args {
    /// `current`, `snapshot`, `reset`.
    None,
    /// `update`.
    Partial(Record),
    /// `subscribe`.
    Callback(Box<dyn Fn(&Record)>),
}

impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Partial(record) => f.debug_tuple("Partial").field(record).finish(),
            Self::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// Value produced by [`BoundOperation::invoke`].
#[derive(Debug)]
pub enum Outcome {
    /// `current`: live handle to the record.
    Store(Store),
    /// `snapshot`: detached copy.
    Record(Record),
    /// `update`, `reset`.
    Done,
    /// `subscribe`: live handle plus the guard keeping the callback alive.
    Subscribed {
        store: Store,
        subscription: Subscription,
    },
}

impl Outcome {
    /// The store handle of `current` or `subscribe`. For `subscribe` the
    /// subscription guard is dropped, which unregisters the callback.
    #[must_use]
    pub fn into_store(self) -> Option<Store> {
        match self {
            Self::Store(store) | Self::Subscribed { store, .. } => Some(store),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_record(self) -> Option<Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }
}

/// An operation reached by name, bound to the facade it was read from.
#[derive(Debug, Clone, Copy)]
pub struct BoundOperation<'a> {
    facade: &'a Facade,
    operation: Operation,
}

impl BoundOperation<'_> {
    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Run the operation against the facade it was read from.
    pub fn invoke(self, args: Args) -> Result<Outcome> {
        let facade = self.facade;
        match (self.operation, args) {
            (Operation::Current, Args::None) => Ok(Outcome::Store(facade.current())),
            (Operation::Snapshot, Args::None) => Ok(Outcome::Record(facade.snapshot())),
            (Operation::Update, Args::Partial(partial)) => {
                facade.update(partial);
                Ok(Outcome::Done)
            }
            (Operation::Reset, Args::None) => {
                facade.reset();
                Ok(Outcome::Done)
            }
            (Operation::Subscribe, Args::Callback(callback)) => {
                let (store, subscription) = facade.subscribe(callback);
                Ok(Outcome::Subscribed {
                    store,
                    subscription,
                })
            }
            (operation, _) => Err(FacadeError::InvalidArguments {
                operation,
                expected: expected_args(operation),
            }),
        }
    }
}

fn expected_args(operation: Operation) -> &'static str {
    match operation {
        Operation::Current | Operation::Snapshot | Operation::Reset => "no arguments",
        Operation::Update => "a partial record",
        Operation::Subscribe => "a callback",
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Plain-object view over a reactive record plus the built-in operations.
///
/// Not `Clone`: each facade exclusively owns its record and baseline.
pub struct Facade {
    store: Store,
    baseline: Record,
    config: FacadeConfig,
}

impl std::fmt::Debug for Facade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Facade")
            .field("store", &self.store)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Facade {
    /// Facade over `initial` with the default configuration.
    #[must_use]
    pub fn new(initial: Record) -> Self {
        Self::with_config(initial, FacadeConfig::default())
    }

    #[must_use]
    pub fn with_config(initial: Record, config: FacadeConfig) -> Self {
        {
            let shadowed: Vec<&str> = initial
                .keys()
                .map(String::as_str)
                .filter(|key| config.reserved(key).is_some())
                .collect();
            tracing::debug!(fields = initial.len(), ?shadowed, "facade created");
        }
        Self {
            baseline: initial.clone(),
            store: Store::new(initial),
            config,
        }
    }

    /// Build the initial record from any serializable value.
    ///
    /// # Errors
    ///
    /// [`FacadeError::NotARecord`] if `value` does not serialize to an
    /// object, [`FacadeError::Copy`] if serialization itself fails.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Self::from_serialize_with_config(value, FacadeConfig::default())
    }

    pub fn from_serialize_with_config<T: Serialize + ?Sized>(
        value: &T,
        config: FacadeConfig,
    ) -> Result<Self> {
        match serde_json::to_value(value)? {
            Value::Object(initial) => Ok(Self::with_config(initial, config)),
            other => Err(FacadeError::NotARecord {
                found: value_kind(&other),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &FacadeConfig {
        &self.config
    }

    /// Classify `name` as an operation or a field.
    #[must_use]
    pub fn route(&self, name: &str) -> Route {
        match self.config.reserved(name) {
            Some(operation) => Route::Operation(operation),
            None => Route::Field,
        }
    }

    /// Resolve `name`: the bound operation if reserved, else the field.
    ///
    /// Reading an unknown field yields `Entry::Field(None)`, never an error.
    #[must_use]
    pub fn get(&self, name: &str) -> Entry<'_> {
        match self.route(name) {
            Route::Operation(operation) => Entry::Operation(BoundOperation {
                facade: self,
                operation,
            }),
            Route::Field => Entry::Field(self.store.get(name)),
        }
    }

    /// Shorthand for `get(name).into_field()`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<Value> {
        self.get(name).into_field()
    }

    /// Write `value` under `name`.
    ///
    /// # Errors
    ///
    /// [`FacadeError::ReservedName`] if `name` is an operation name; the
    /// record is left unchanged.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        match self.route(name) {
            Route::Operation(operation) => {
                tracing::warn!(
                    field = name,
                    %operation,
                    "rejected write to reserved operation name"
                );
                Err(FacadeError::ReservedName {
                    name: name.to_owned(),
                })
            }
            Route::Field => {
                self.store.set(name, value.into());
                Ok(())
            }
        }
    }

    /// True for reserved names and for current record keys.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        match self.route(name) {
            Route::Operation(_) => true,
            Route::Field => self.store.contains_key(name),
        }
    }

    /// Operation names in declaration order, then live record keys.
    ///
    /// Record keys shadowed by an operation are listed once, as the
    /// operation.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .config
            .operations()
            .map(|op| op.name().to_owned())
            .collect();
        keys.extend(
            self.store
                .keys()
                .into_iter()
                .filter(|key| self.route(key) == Route::Field),
        );
        keys
    }

    /// Live handle to the backing record.
    ///
    /// Writes through the handle are reactive and are not subject to
    /// reserved-name protection.
    #[must_use]
    pub fn current(&self) -> Store {
        self.store.clone()
    }

    /// Deep, non-live copy of the record.
    #[must_use]
    pub fn snapshot(&self) -> Record {
        self.store.to_record()
    }

    /// Deserialize a snapshot into `T`.
    ///
    /// # Errors
    ///
    /// [`FacadeError::Copy`] if the record does not fit `T`.
    pub fn snapshot_as<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(Value::Object(self.snapshot()))?)
    }

    /// Merge `partial` into the record, key by key, last write wins.
    ///
    /// Nested values are replaced wholesale. Unknown keys are added.
    /// Reserved names are treated as plain field names here, which is how a
    /// shadowed field gets written.
    pub fn update<I, K>(&self, partial: I)
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut partial = partial.into_iter().peekable();
        if partial.peek().is_none() {
            return;
        }
        let _batch = self.notify_scope();
        let mut written = 0usize;
        let mut changed = 0usize;
        for (key, value) in partial {
            written += 1;
            if self.store.set(key, value) {
                changed += 1;
            }
        }
        tracing::debug!(
            written,
            changed,
            policy = ?self.config.update_notify,
            "update merged"
        );
    }

    /// Restore the initial field values from fresh deep copies.
    ///
    /// Fields added after construction are kept unless
    /// [`FacadeConfig::reset_removes_extra_fields`] is set.
    pub fn reset(&self) {
        if self.config.reset_removes_extra_fields {
            self.store.replace(self.baseline.clone());
        } else {
            let _batch = self.notify_scope();
            for (key, value) in &self.baseline {
                self.store.set(key.clone(), value.clone());
            }
        }
        tracing::debug!(
            removes_extra = self.config.reset_removes_extra_fields,
            fields = self.baseline.len(),
            "record reset"
        );
    }

    /// Run `callback` after each change to the record.
    ///
    /// Returns the live record handle at once, together with the guard that
    /// keeps the callback registered.
    pub fn subscribe(&self, callback: impl Fn(&Record) + 'static) -> (Store, Subscription) {
        let subscription = self.store.subscribe(callback);
        (self.store.clone(), subscription)
    }

    fn notify_scope(&self) -> Option<BatchScope> {
        match self.config.update_notify {
            UpdateNotify::PerKey => None,
            UpdateNotify::Batched => Some(BatchScope::new()),
        }
    }
}
