//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent failures of dictionary resolution and editing.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("key not found: {key}")]
    NotFound { key: String },

    #[error("key {key} is not a {expected}")]
    TypeMismatch { key: String, expected: &'static str },

    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("key already exists: {key}")]
    KeyExists { key: String },

    #[error("parse error at line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },
}

impl DomainError {
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    pub fn not_a_dict(key: impl Into<String>) -> Self {
        Self::TypeMismatch {
            key: key.into(),
            expected: "dictionary",
        }
    }

    pub fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
