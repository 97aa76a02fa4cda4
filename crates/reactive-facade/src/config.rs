#![forbid(unsafe_code)]

//! Facade behavior switches.

use serde::{Deserialize, Serialize};

use crate::operation::Operation;

/// How `update` and `reset` notify record subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateNotify {
    /// One notification per changed field, as each is written.
    #[default]
    PerKey,
    /// All writes happen inside one batch; subscribers are notified once
    /// at the end if anything changed.
    Batched,
}

/// Configuration for a [`Facade`](crate::Facade).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacadeConfig {
    /// When true, `reset` replaces the record with the initial fields,
    /// dropping fields added later. When false, only the initial fields are
    /// written back and later additions survive.
    pub reset_removes_extra_fields: bool,
    /// Notification granularity for `update` and `reset`.
    pub update_notify: UpdateNotify,
    /// Whether `subscribe` is a reserved operation name. When false it is an
    /// ordinary field name.
    pub include_subscribe: bool,
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            reset_removes_extra_fields: false,
            update_notify: UpdateNotify::PerKey,
            include_subscribe: true,
        }
    }
}

impl FacadeConfig {
    #[must_use]
    pub fn with_reset_removes_extra_fields(mut self, enabled: bool) -> Self {
        self.reset_removes_extra_fields = enabled;
        self
    }

    #[must_use]
    pub fn with_update_notify(mut self, notify: UpdateNotify) -> Self {
        self.update_notify = notify;
        self
    }

    #[must_use]
    pub fn with_subscribe(mut self, enabled: bool) -> Self {
        self.include_subscribe = enabled;
        self
    }

    /// Reserved operations in declaration order.
    pub fn operations(&self) -> impl Iterator<Item = Operation> {
        let include_subscribe = self.include_subscribe;
        Operation::ALL
            .into_iter()
            .filter(move |op| include_subscribe || *op != Operation::Subscribe)
    }

    /// The operation reserved under `name`, if any.
    #[must_use]
    pub fn reserved(&self, name: &str) -> Option<Operation> {
        Operation::from_name(name)
            .filter(|op| self.include_subscribe || *op != Operation::Subscribe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = FacadeConfig::default();
        assert!(!config.reset_removes_extra_fields);
        assert_eq!(config.update_notify, UpdateNotify::PerKey);
        assert!(config.include_subscribe);
        assert_eq!(config.operations().count(), 5);
    }

    #[test]
    fn without_subscribe() {
        let config = FacadeConfig::default().with_subscribe(false);
        assert_eq!(config.reserved("subscribe"), None);
        assert_eq!(config.reserved("reset"), Some(Operation::Reset));
        let ops: Vec<_> = config.operations().collect();
        assert_eq!(
            ops,
            [
                Operation::Current,
                Operation::Snapshot,
                Operation::Update,
                Operation::Reset
            ]
        );
    }

    #[test]
    fn builder_sets_fields() {
        let config = FacadeConfig::default()
            .with_reset_removes_extra_fields(true)
            .with_update_notify(UpdateNotify::Batched);
        assert!(config.reset_removes_extra_fields);
        assert_eq!(config.update_notify, UpdateNotify::Batched);
    }

    #[test]
    fn deserialize_partial_json_uses_defaults() {
        let config: FacadeConfig =
            serde_json::from_str(r#"{"update_notify":"batched"}"#).unwrap();
        assert_eq!(config.update_notify, UpdateNotify::Batched);
        assert!(config.include_subscribe);
        assert!(!config.reset_removes_extra_fields);
    }
}
