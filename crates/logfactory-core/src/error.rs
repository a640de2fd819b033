//! Error types for logger construction and emission

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building or configuring loggers
#[derive(Error, Debug)]
pub enum LogError {
    /// A file-backed destination could not be opened for append
    #[error("Cannot open log destination {path}: {source}")]
    InvalidDestination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Logger name must not be empty")]
    EmptyName,

    #[error("At least one destination is required")]
    NoDestinations,

    /// Unknown placeholder or unbalanced brace in a format template
    #[error("Invalid format template: {0}")]
    InvalidFormat(String),

    #[error("Unknown severity: {0}")]
    InvalidSeverity(String),

    /// One or more destinations failed during emit
    #[error(transparent)]
    Write(#[from] EmitError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LogError {
    /// Create an invalid destination error
    pub fn invalid_destination(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::InvalidDestination {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid format error
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat(message.into())
    }
}

pub type LogResult<T> = Result<T, LogError>;

/// A single destination that could not be written
#[derive(Error, Debug)]
#[error("Write to {destination} failed: {source}")]
pub struct WriteFailure {
    /// Display name of the failing destination
    pub destination: String,
    #[source]
    pub source: std::io::Error,
}

/// Every destination failure of one emit call
///
/// Destinations that succeeded are not listed; their lines were written.
#[derive(Error, Debug)]
#[error("{} destination(s) failed: {}", .failures.len(), summarize(.failures))]
pub struct EmitError {
    pub failures: Vec<WriteFailure>,
}

impl EmitError {
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

fn summarize(failures: &[WriteFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type EmitResult = Result<(), EmitError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_invalid_destination_message() {
        let err = LogError::invalid_destination(
            "/nope/app.log",
            io::Error::new(io::ErrorKind::NotFound, "no such directory"),
        );
        let text = err.to_string();
        assert!(text.contains("/nope/app.log"));
        assert!(text.contains("no such directory"));
    }

    #[test]
    fn test_emit_error_lists_every_failure() {
        let err = EmitError {
            failures: vec![
                WriteFailure {
                    destination: "file:a.log".to_string(),
                    source: io::Error::new(io::ErrorKind::Other, "disk full"),
                },
                WriteFailure {
                    destination: "file:b.log".to_string(),
                    source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
                },
            ],
        };
        assert_eq!(err.len(), 2);
        let text = err.to_string();
        assert!(text.starts_with("2 destination(s) failed"));
        assert!(text.contains("file:a.log"));
        assert!(text.contains("denied"));

        let wrapped: LogError = err.into();
        assert!(matches!(wrapped, LogError::Write(_)));
    }
}
