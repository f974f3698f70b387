use store::{OrderStatus, StoreError};
use thiserror::Error;

/// Errors produced by the lifecycle services.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The request payload failed a domain rule.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The requested status change is not in the transition table.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: OrderStatus,
        to: OrderStatus,
    },

    /// A store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for lifecycle operations.
pub type Result<T> = std::result::Result<T, DomainError>;
