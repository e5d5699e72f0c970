//! Domain error model.

use thiserror::Error;

use crate::money::Amount;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// These are deterministic, expected business failures returned to callers
/// with a stable kind. Infrastructure failures live elsewhere (the store
/// layer) and never surface through this type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A field failed validation (bad network, amount below a threshold, ...).
    #[error("validation failed: {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// Requested record not found, not owned by the caller, or not in an
    /// actionable state. Deliberately indistinguishable so callers cannot
    /// probe other users' records.
    #[error("not found or already processed")]
    NotFound,

    /// A concurrent caller won the race; no action was taken.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A debit or conversion exceeds the available balance.
    #[error("insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: Amount, available: Amount },

    /// Attempted transition from a terminal or wrong state.
    #[error("invalid state: {0}")]
    State(String),

    /// Caller lacks the required role for this operation.
    #[error("unauthorized")]
    Unauthorized,
}

impl DomainError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn invalid_id(message: impl Into<String>) -> Self {
        Self::InvalidId(message.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn insufficient_funds(requested: Amount, available: Amount) -> Self {
        Self::InsufficientFunds {
            requested,
            available,
        }
    }

    pub fn state(message: impl Into<String>) -> Self {
        Self::State(message.into())
    }
}
