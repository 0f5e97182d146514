//! Error types for identifier parsing

use thiserror::Error;

/// Identifier parse errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IdError {
    #[error("Invalid address length: expected {expected} hex digits, got {actual}")]
    AddressLength { expected: usize, actual: usize },

    #[error("Invalid address hex: {reason}")]
    AddressHex { reason: String },
}
