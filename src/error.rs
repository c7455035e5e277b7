//! Error types and exit codes for secscan

use std::process::ExitCode;
use thiserror::Error;

/// Main error type for host-level operations
///
/// The syntax abstraction and the rule engine never produce these for
/// irrelevant or unresolvable code; only I/O, front-end, configuration and
/// cancellation failures surface here.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Unsupported language for extension: {extension}")]
    UnsupportedLanguage { extension: String },

    #[error("Failed to parse file: {message}")]
    ParseFailure { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Analysis cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScanError {
    /// Convert error to an exit code:
    /// - 0: Success
    /// - 1: File not found / IO error
    /// - 2: Unsupported language
    /// - 3: Parse failure
    /// - 4: Configuration error
    /// - 5: Cancelled
    ///
    /// Code 6 is reserved for runs that found diagnostics at or above the
    /// failure threshold (see [`FINDINGS_EXIT_CODE`]).
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::FileNotFound { .. } => ExitCode::from(1),
            Self::UnsupportedLanguage { .. } => ExitCode::from(2),
            Self::ParseFailure { .. } => ExitCode::from(3),
            Self::Config { .. } => ExitCode::from(4),
            Self::Cancelled => ExitCode::from(5),
            Self::Io(_) => ExitCode::from(1),
        }
    }
}

/// Exit code for a run whose findings reach the `--fail-on` threshold
pub const FINDINGS_EXIT_CODE: u8 = 6;

/// Result type alias for secscan operations
pub type Result<T> = std::result::Result<T, ScanError>;
