//! Isolation of traversal failures to a single base.
//!
//! [`Shielded`] wraps a walk so that no `Err` item reaches the consumer. Every
//! failure is logged and recorded as an [`Issue`]; what happens next depends
//! on the error:
//!
//! - a resumable error (see [`is_resumable`]) costs only the failing branch,
//!   and the walk continues with the next entry
//! - any other error ends the walk: the inner walker is dropped and every
//!   later call to `next` returns `None`
//!
//! Paths produced before a failure are unaffected, and no other base is
//! touched.

use crate::report::{Issue, IssueLog};
use crate::walker::{failed_path, is_resumable};
use std::io;
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};
use tracing::warn;

/// A walk whose I/O errors are recorded instead of propagated.
pub struct Shielded<I> {
    inner: Option<I>,
    base: PathBuf,
    issues: IssueLog,
}

impl<I> Shielded<I>
where
    I: Iterator<Item = io::Result<PathBuf>>,
{
    pub fn new(inner: I, base: impl Into<PathBuf>, issues: IssueLog) -> Self {
        Shielded {
            inner: Some(inner),
            base: base.into(),
            issues,
        }
    }

    /// The base this walk belongs to
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Returns true once the inner walk has ended or failed
    pub fn is_done(&self) -> bool {
        self.inner.is_none()
    }
}

impl<I> Iterator for Shielded<I>
where
    I: Iterator<Item = io::Result<PathBuf>>,
{
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            match self.inner.as_mut()?.next() {
                Some(Ok(path)) => return Some(path),
                Some(Err(err)) if is_resumable(&err) => {
                    let path = failed_path(&err);
                    warn!(
                        base = %self.base.display(),
                        path = ?path,
                        error = %err,
                        "I/O error during traversal, skipping this branch"
                    );
                    self.issues.record(Issue::traversal(&self.base, path, &err));
                }
                Some(Err(err)) => {
                    let path = failed_path(&err);
                    warn!(
                        base = %self.base.display(),
                        error = %err,
                        "I/O error during traversal, skipping the rest of this base"
                    );
                    self.issues.record(Issue::traversal(&self.base, path, &err));
                    self.inner = None;
                    return None;
                }
                None => {
                    self.inner = None;
                    return None;
                }
            }
        }
    }
}

impl<I> FusedIterator for Shielded<I> where I: Iterator<Item = io::Result<PathBuf>> {}
