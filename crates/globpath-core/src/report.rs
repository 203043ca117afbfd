//! Diagnostics for failures that were isolated instead of aborting a query.
//!
//! A base that cannot be opened in best-effort mode, or a branch cut short by
//! an I/O error during traversal, leaves an [`Issue`] in the query's
//! [`IssueLog`]. The log is a side channel: results keep flowing regardless.

use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// When the failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssuePhase {
    /// The base could not be opened; it contributed nothing
    Open,

    /// Traversal failed part-way; results produced before it were kept
    Traversal,
}

impl fmt::Display for IssuePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssuePhase::Open => write!(f, "open"),
            IssuePhase::Traversal => write!(f, "traversal"),
        }
    }
}

/// One isolated failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// The base whose scan was affected
    pub base: PathBuf,

    /// Open-time or traversal-time
    pub phase: IssuePhase,

    /// The entry that failed, when the walker reported one
    pub path: Option<PathBuf>,

    /// Human-readable cause
    pub message: String,
}

impl Issue {
    /// A base that could not be opened
    pub fn open(base: &Path, error: &std::io::Error) -> Self {
        Issue {
            base: base.to_path_buf(),
            phase: IssuePhase::Open,
            path: None,
            message: error.to_string(),
        }
    }

    /// A branch truncated by an error during iteration
    pub fn traversal(base: &Path, path: Option<PathBuf>, error: &std::io::Error) -> Self {
        Issue {
            base: base.to_path_buf(),
            phase: IssuePhase::Traversal,
            path,
            message: error.to_string(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.phase, self.base.display())?;
        if let Some(path) = &self.path {
            write!(f, " at {}", path.display())?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Shared, append-only list of issues for one query.
///
/// Cloning gives another handle to the same log.
#[derive(Debug, Clone, Default)]
pub struct IssueLog {
    inner: Arc<Mutex<Vec<Issue>>>,
}

impl IssueLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an issue
    pub fn record(&self, issue: Issue) {
        self.inner.lock().push(issue);
    }

    /// Copy of everything recorded so far
    pub fn snapshot(&self) -> Vec<Issue> {
        self.inner.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
