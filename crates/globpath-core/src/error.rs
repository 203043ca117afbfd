//! Error types for globpath core operations.
//!
//! Library-level failures are modelled with `thiserror` so callers can tell a
//! bad pattern apart from an unreachable base directory. The CLI wraps these
//! in `anyhow` for reporting.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using FindError
pub type Result<T> = std::result::Result<T, FindError>;

/// Core error types for path finding.
///
/// Only configuration problems and open-time failures in fail-fast mode ever
/// reach the caller as errors. Failures in the middle of a traversal are
/// shielded and reported through [`crate::PathStream::issues`] instead.
#[derive(Error, Debug)]
pub enum FindError {
    // === Query Errors ===
    /// A glob pattern could not be compiled
    #[error("invalid glob pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    // === Traversal Errors ===
    /// A base directory could not be opened and fail-fast mode is active
    #[error("failed to start scanning base '{}': {source}", base.display())]
    BaseUnavailable {
        base: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The worker pool for concurrent base scans could not be created
    #[error("failed to start worker pool: {0}")]
    WorkerPool(String),

    // === Configuration Errors ===
    /// Configuration file parsing or writing failed
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    // === I/O Errors ===
    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FindError {
    /// Returns true if this error was caused by the query itself rather than
    /// by the filesystem.
    pub fn is_query_error(&self) -> bool {
        matches!(self, FindError::InvalidPattern { .. })
    }

    /// The base directory this error refers to, if any.
    pub fn base(&self) -> Option<&PathBuf> {
        match self {
            FindError::BaseUnavailable { base, .. } => Some(base),
            _ => None,
        }
    }

    /// Create an invalid pattern error
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl ToString) -> Self {
        FindError::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<rayon::ThreadPoolBuildError> for FindError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        FindError::WorkerPool(err.to_string())
    }
}
