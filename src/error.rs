//! Error types for netrc-auth.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when resolving or querying netrc credentials.
#[derive(Error, Debug)]
pub enum Error {
    /// The current OS user or their home directory could not be determined.
    #[error("cannot resolve current user: {0}")]
    Environment(String),

    /// Netrc file not found.
    #[error("netrc file not found: {0}")]
    FileNotFound(PathBuf),

    /// Failed to read the netrc file.
    #[error("failed to read netrc file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The netrc file is not valid netrc syntax.
    #[error("invalid netrc file {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: SyntaxError,
    },

    /// No machine entry matches the requested host.
    #[error("no auth for {0} configured")]
    NoAuth(String),
}

impl Error {
    /// Whether the error means the netrc file could not be accessed at all.
    pub fn is_file_access(&self) -> bool {
        matches!(self, Error::FileNotFound(_) | Error::ReadFile { .. })
    }
}

/// A netrc syntax error, located by 1-based line number.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}

impl SyntaxError {
    pub(crate) fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Result type alias for netrc-auth operations.
pub type Result<T> = std::result::Result<T, Error>;
