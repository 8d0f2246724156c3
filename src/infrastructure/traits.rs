//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Replace the file content in one step: the target either keeps its old
    /// content or holds all of the new one.
    fn write_atomic(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a file.
    fn is_file(&self, path: &Path) -> bool;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write_atomic(&self, path: &Path, content: &str) -> io::Result<()> {
        // Temp file in the target directory so the final rename stays on one device
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}
