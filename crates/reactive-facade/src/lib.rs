#![forbid(unsafe_code)]

//! Plain-object access to reactive state.
//!
//! [`Facade`] wraps a reactive record of named JSON fields and exposes it
//! through name-based reads and writes, alongside five built-in operations:
//!
//! | Name | Effect |
//! |------|--------|
//! | `current` | live [`Store`] handle to the record |
//! | `snapshot` | deep, non-live copy |
//! | `update` | merge a partial record, last write wins |
//! | `reset` | restore the initial fields |
//! | `subscribe` | run a callback after each change |
//!
//! Operation names are reserved: reading one yields the operation, writing
//! one is rejected, and a record field of the same name is shadowed.
//!
//! ```
//! use reactive_facade::{Facade, Record};
//! use serde_json::json;
//!
//! let mut initial = Record::new();
//! initial.insert("count".into(), json!(0));
//! let state = Facade::new(initial);
//!
//! state.set("count", 3).unwrap();
//! assert_eq!(state.field("count"), Some(json!(3)));
//!
//! assert!(state.set("reset", 1).is_err());
//! state.reset();
//! assert_eq!(state.field("count"), Some(json!(0)));
//! ```
//!
//! Everything here is single-threaded (`Rc`-based) and synchronous.

pub mod config;
pub mod error;
pub mod facade;
pub mod operation;
pub mod reactive;
pub mod store;

pub use config::{FacadeConfig, UpdateNotify};
pub use error::{FacadeError, Result};
pub use facade::{Args, BoundOperation, Entry, Facade, Outcome, Route};
pub use operation::Operation;
pub use reactive::{BatchScope, Observable, Subscription};
pub use store::{Record, Store};
