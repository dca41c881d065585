//! Error types for the cutter module.

use thiserror::Error;

/// Errors that can occur while building a cutter.
///
/// The truncation pipeline itself never fails once a [`crate::Cutter`] exists;
/// every variant here is raised at construction or configuration time.
#[derive(Debug, Error)]
pub enum CutterError {
    /// A matcher pattern did not compile.
    #[error("invalid pattern for matcher `{key}`: {source}")]
    InvalidPattern {
        /// Kind key of the offending matcher.
        key: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// Configuration error.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON settings could not be parsed.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error while reading settings or input.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result alias for cutter operations.
pub type CutterResult<T> = Result<T, CutterError>;
