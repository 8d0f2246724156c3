//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use std::io::{self, Write};

use colored::Colorize;

use crate::infrastructure::{InfraError, InfraResult};

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Write data to stdout verbatim (no color, no added newline)
pub fn data(text: &str) -> InfraResult<()> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(InfraError::stdout)
}
