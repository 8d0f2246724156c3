//! Infrastructure-level errors (wraps application errors)

use std::io;

use thiserror::Error;

use crate::application::ApplicationError;

/// Application errors plus failures on the process streams.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    /// Writing the operation result failed (e.g. closed pipe).
    #[error("cannot write to {stream}: {source}")]
    Stream {
        stream: &'static str,
        #[source]
        source: io::Error,
    },
}

impl InfraError {
    pub fn stdout(source: io::Error) -> Self {
        Self::Stream {
            stream: "stdout",
            source,
        }
    }
}

/// Result type for infrastructure layer operations.
pub type InfraResult<T> = Result<T, InfraError>;
