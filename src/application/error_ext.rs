//! Error conversion helpers for common I/O operations
//!
//! Provides extension traits that attach the offending path to I/O errors.

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Failure to read an input file.
    ///
    /// # Example
    /// ```ignore
    /// let content = fs.read_to_string(&dict).or_unreadable(&dict)?;
    /// ```
    fn or_unreadable(self, path: &Path) -> ApplicationResult<T>;

    /// Failure to create or replace an output file.
    fn or_unwritable(self, path: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn or_unreadable(self, path: &Path) -> ApplicationResult<T> {
        self.map_err(|source| ApplicationError::Unreadable {
            path: path.to_path_buf(),
            source,
        })
    }

    fn or_unwritable(self, path: &Path) -> ApplicationResult<T> {
        self.map_err(|source| ApplicationError::Unwritable {
            path: path.to_path_buf(),
            source,
        })
    }
}
