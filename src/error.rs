//! Error handling module for the sanitizer front end
//!
//! Provides centralized error handling with proper error types using thiserror.
//! Every failure raised while turning an invocation into a `Configuration`
//! is one of these variants.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for configuration building
#[derive(Error, Debug)]
pub enum SanitizerError {
    /// The raw argument vector did not match the option schema
    #[error("{0}")]
    Usage(#[from] clap::Error),

    /// `--vault` is not a path to an existing directory
    #[error("vaultLocation is not a directory: {0}")]
    InvalidVaultLocation(String),

    /// Both `--passphrase` and `--passphraseFile` were given
    #[error("Only passphrase or passphraseFile can be present, not both.")]
    ConflictingPassphraseSource,

    /// Passphrase file is missing or not a regular file
    #[error("Invalid passphrase file: {}", .0.display())]
    InvalidPassphraseFile(PathBuf),

    /// Passphrase file exists but cannot be opened for reading
    #[error("Passphrase file not readable: {}", .0.display())]
    PassphraseFileNotReadable(PathBuf),

    /// Passphrase file content is not valid UTF-8
    #[error("Passphrase file is not valid UTF-8: {}", .0.display())]
    PassphraseFileEncoding(PathBuf),

    /// One or more `--solve` values are outside the allow-list.
    /// Holds only the offending values.
    #[error("Problems {} unknown or cannot be solved", .0.join(", "))]
    UnknownProblem(Vec<String>),

    /// Output prefix cannot form a valid path
    #[error("Invalid output file prefix: {0:?}")]
    InvalidOutputPath(String),

    /// Output files exist and the operator declined to overwrite them
    #[error("Output file(s) exist: {}, {}", .structure.display(), .check.display())]
    OutputFileConflict { structure: PathBuf, check: PathBuf },

    /// A passphrase prompt was needed but no terminal is attached
    #[error(
        "Could not get system console to read passphrase. You may use a passphrase file instead."
    )]
    NoInteractiveConsole,

    /// Unrecoverable I/O failure (file read, delete, console)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for configuration operations
pub type Result<T> = std::result::Result<T, SanitizerError>;

impl SanitizerError {
    /// Create an unknown-problem error from the offending values.
    ///
    /// Values are sorted and deduplicated so the message is stable.
    pub fn unknown_problems<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut values: Vec<String> = values.into_iter().map(Into::into).collect();
        values.sort();
        values.dedup();
        Self::UnknownProblem(values)
    }

    /// Create an invalid vault location error
    pub fn invalid_vault(raw: impl Into<String>) -> Self {
        Self::InvalidVaultLocation(raw.into())
    }

    /// Create an invalid output path error
    pub fn invalid_output(raw: impl Into<String>) -> Self {
        Self::InvalidOutputPath(raw.into())
    }

    /// Whether the entry point should reprint usage help after the message.
    ///
    /// Construction-time configuration errors do; deferred passphrase
    /// failures and raw I/O failures do not.
    pub fn shows_usage(&self) -> bool {
        !matches!(self, Self::NoInteractiveConsole | Self::Io(_))
    }
}
