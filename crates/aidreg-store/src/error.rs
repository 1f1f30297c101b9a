//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The record's stated digest does not match its content.
    #[error("record digest does not match its content: {0}")]
    DigestMismatch(String),

    /// A writer panicked while holding the registry lock.
    #[error("registry lock poisoned")]
    Poisoned,
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
