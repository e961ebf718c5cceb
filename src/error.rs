//! Error types for the backup janitor.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an error, as surfaced to operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// I/O, filesystem or unexpected failure. The profile run is aborted.
    Error,
    /// Invalid profile parameter. Fix the configuration rather than retry.
    Misconfiguration,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Error => write!(f, "ERROR"),
            ErrorKind::Misconfiguration => write!(f, "MISCONFIGURATION"),
        }
    }
}

/// Main error type for the backup janitor.
#[derive(Error, Debug)]
pub enum Error {
    // File system errors
    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    // Configuration errors
    #[error("Misconfiguration: {0}")]
    Misconfiguration(String),

    #[error("Invalid config file: {0}")]
    InvalidConfigFile(String),

    #[error("Invalid name pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    // External process errors
    #[error("Command failed: {0}")]
    CommandFailed(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // TOML errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a misconfiguration error from a string.
    pub fn misconfiguration<S: Into<String>>(msg: S) -> Self {
        Error::Misconfiguration(msg.into())
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Misconfiguration(_) | Error::InvalidConfigFile(_) | Error::InvalidPattern(_) => {
                ErrorKind::Misconfiguration
            }
            _ => ErrorKind::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            Error::misconfiguration("keep-items-quantity is 0").kind(),
            ErrorKind::Misconfiguration
        );
        assert_eq!(
            Error::PathNotFound("/nope".to_string()).kind(),
            ErrorKind::Error
        );
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert_eq!(Error::from(io).kind(), ErrorKind::Error);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ErrorKind::Misconfiguration.to_string(), "MISCONFIGURATION");
        assert_eq!(ErrorKind::Error.to_string(), "ERROR");
    }
}
