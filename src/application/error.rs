//! Application-level errors (wraps domain errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("dictionary not found: {0}")]
    DictionaryNotFound(PathBuf),

    #[error("cannot read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", .path.display())]
    Unwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("config error: {message}")]
    Config { message: String },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
