//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::exitcode;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) => exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Stream { .. } => exitcode::IOERR,
                InfraError::Application(e) => match e {
                    ApplicationError::Domain(_) => exitcode::DATAERR,
                    ApplicationError::DictionaryNotFound(_)
                    | ApplicationError::Unreadable { .. } => exitcode::NOINPUT,
                    ApplicationError::Unwritable { .. } => exitcode::CANTCREAT,
                    ApplicationError::InvalidOperation(_) => exitcode::USAGE,
                    ApplicationError::Config { .. } => exitcode::CONFIG,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use std::path::PathBuf;

    #[test]
    fn given_error_kinds_when_mapping_exit_codes_then_sysexits() {
        let not_found: CliError = ApplicationError::DictionaryNotFound(PathBuf::from("x")).into();
        let parse: CliError = ApplicationError::from(DomainError::Parse {
            line: 1,
            column: 1,
            message: "bad".into(),
        })
        .into();
        let unwritable: CliError = ApplicationError::Unwritable {
            path: PathBuf::from("out"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        }
        .into();
        let pipe: CliError = InfraError::stdout(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "closed",
        ))
        .into();

        assert_eq!(not_found.exit_code(), exitcode::NOINPUT);
        assert_eq!(parse.exit_code(), exitcode::DATAERR);
        assert_eq!(unwritable.exit_code(), exitcode::CANTCREAT);
        assert_eq!(CliError::InvalidArgs("x".into()).exit_code(), exitcode::USAGE);
        assert_eq!(pipe.exit_code(), exitcode::IOERR);
    }
}
