//! Application error types.
//!
//! Provides unified error handling with actionable context for debugging.

use thiserror::Error;

/// Application result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types with specific context for actionable debugging
#[derive(Debug, Error)]
pub enum Error {
    /// IO error with path context
    #[error("IO error at {path:?}: {source}")]
    Io {
        /// The underlying IO error.
        source: std::io::Error,
        /// File path where the error occurred, if known.
        path: Option<std::path::PathBuf>,
    },

    /// Script markup parsing error
    #[error("Parse error in {file:?}: {message}")]
    Parse {
        /// File that failed to parse, if known.
        file: Option<std::path::PathBuf>,
        /// Description of the parse failure.
        message: String,
    },

    /// Layout measurement could not be performed
    #[error("Measurement failed: {0}")]
    Measurement(String),

    /// Project/script storage error
    #[error("Storage error: {message}")]
    Storage {
        /// Human-readable error description.
        message: String,
        /// Actionable suggestion for resolving the error.
        hint: Option<&'static str>,
    },

    /// Mirror surface unavailable or refused the message
    #[error("Mirror channel error: {0}")]
    Mirror(String),

    /// Configuration error with guidance
    #[error("Configuration error: {message}. {hint}")]
    Config {
        /// Description of the configuration problem.
        message: String,
        /// Actionable guidance for fixing the issue.
        hint: &'static str,
    },

    /// Serialization error (settings snapshots, mirror payloads)
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Generic message error (escape hatch)
    #[error("{0}")]
    Msg(String),
}

impl Error {
    /// Create an IO error with path context
    pub fn io(source: std::io::Error, path: impl Into<Option<std::path::PathBuf>>) -> Self {
        Self::Io { source, path: path.into() }
    }

    /// Create a storage error without a hint
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage { message: message.into(), hint: None }
    }

    /// Create a storage error with an actionable hint
    pub fn storage_hint(message: impl Into<String>, hint: &'static str) -> Self {
        Self::Storage { message: message.into(), hint: Some(hint) }
    }

    /// Create a config error with actionable hint
    pub fn config(message: impl Into<String>, hint: &'static str) -> Self {
        Self::Config { message: message.into(), hint }
    }

    /// Create a parse error with file context
    pub fn parse(message: impl Into<String>, file: impl Into<Option<std::path::PathBuf>>) -> Self {
        Self::Parse { file: file.into(), message: message.into() }
    }

    /// Create a measurement error
    pub fn measurement(message: impl Into<String>) -> Self {
        Self::Measurement(message.into())
    }
}

// Convenience conversions
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io { source: e, path: None }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::Msg(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::Msg(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn storage_hint_is_carried() {
        let err = Error::storage_hint("library missing", "Set PROMPTERM_LIBRARY");
        match err {
            Error::Storage { hint: Some(h), .. } => {
                assert!(h.contains("PROMPTERM_LIBRARY"));
            }
            _ => panic!("Expected Storage error with hint"),
        }
    }

    #[test]
    fn measurement_error_formats() {
        let err = Error::measurement("zero-width viewport");
        assert!(err.to_string().contains("zero-width viewport"));
    }
}
