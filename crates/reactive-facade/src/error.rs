use thiserror::Error;

use crate::operation::Operation;

pub type Result<T> = std::result::Result<T, FacadeError>;

#[derive(Debug, Error)]
pub enum FacadeError {
    #[error("cannot assign to reserved operation name: {name}")]
    ReservedName { name: String },

    #[error("initial fields must be a record, found {found}")]
    NotARecord { found: &'static str },

    #[error("deep copy failed: {0}")]
    Copy(#[from] serde_json::Error),

    #[error("invalid arguments for {operation}: expected {expected}")]
    InvalidArguments {
        operation: Operation,
        expected: &'static str,
    },
}

impl FacadeError {
    /// True for the recoverable write rejection.
    #[must_use]
    pub fn is_reserved_name(&self) -> bool {
        matches!(self, Self::ReservedName { .. })
    }
}
