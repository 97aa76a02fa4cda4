#![forbid(unsafe_code)]

//! Reserved operation names.
//!
//! These names always route to a facade operation, never to a record field,
//! even when the record holds a field of the same name.

use serde::{Deserialize, Serialize};

/// One of the facade's built-in operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Live handle to the backing record.
    Current,
    /// Deep, non-live copy of the record.
    Snapshot,
    /// Merge a partial record into the backing record.
    Update,
    /// Restore the initial field values.
    Reset,
    /// Register a change callback.
    Subscribe,
}

impl Operation {
    /// Every operation in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Current,
        Self::Snapshot,
        Self::Update,
        Self::Reset,
        Self::Subscribe,
    ];

    /// The reserved name this operation answers to.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Snapshot => "snapshot",
            Self::Update => "update",
            Self::Reset => "reset",
            Self::Subscribe => "subscribe",
        }
    }

    /// Look up an operation by its exact (case-sensitive) name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
