//! Error types for appctl commands.
//!
//! Distinguishes between usage errors (exit code 2, same as clap's own parse
//! failures) and system failures (exit code 101). Failures inside the app host
//! never surface here: the host reports them and its exit code is relayed.

use std::path::PathBuf;
use thiserror::Error;

/// Exit code for malformed or invalid command-line input.
pub const USAGE_EXIT_CODE: i32 = 2;

/// Exit code for failures the user can't fix from the command line.
pub const SYSTEM_EXIT_CODE: i32 = 101;

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;

/// Top-level error type for CLI operations.
#[derive(Debug, Error)]
pub enum CliError {
    /// A `-p` setting name was given more than once.
    #[error("Error: The setting '{name}' was specified more than once\n\nHint: Each `-p name=value` must use a distinct name")]
    DuplicateSetting { name: String },

    /// An argument passed parsing but can't be used.
    #[error("Error: Invalid argument '{arg}'\n\n{reason}")]
    InvalidArgument { arg: String, reason: String },

    /// The configuration file could not be read.
    #[error("Internal Error: Could not read config file {}\n\n{source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for the expected shape.
    #[error("Internal Error: Config parse failed for {}\n\n{source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// I/O failure outside configuration loading.
    #[error("Internal Error: I/O operation failed\n\n{0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::DuplicateSetting { .. } | CliError::InvalidArgument { .. } => {
                USAGE_EXIT_CODE
            }
            CliError::ConfigRead { .. } | CliError::ConfigParse { .. } | CliError::Io(_) => {
                SYSTEM_EXIT_CODE
            }
        }
    }
}
