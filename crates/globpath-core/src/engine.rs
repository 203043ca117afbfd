//! Per-base traversal.
//!
//! A base is opened through the [`DirectoryWalker`] on the caller's thread so
//! that fail-fast errors surface synchronously from `find`. The open walk is
//! then wrapped in a [`BaseScan`] and handed to a worker, which pulls paths
//! through the shield, the global stages and the base's own stages.
//!
//! A scan checks its cancel flag before every candidate the walker yields,
//! not only before the ones that pass the stages, so a base whose entries
//! are all rejected still stops promptly once its stream is closed.

use crate::error::{FindError, Result};
use crate::pipeline::{BasePipeline, Pipeline};
use crate::report::{Issue, IssueLog};
use crate::shield::Shielded;
use crate::walker::{DirectoryWalker, Walk, WalkOptions};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Open a base for traversal, applying the open-time error policy.
///
/// - opened: `Ok(Some(walk))`
/// - failed with `fail_fast`: `Err(FindError::BaseUnavailable)`
/// - failed otherwise: a warning and an [`Issue`], then `Ok(None)`
pub fn open_base(
    walker: &dyn DirectoryWalker,
    base: &Path,
    options: &WalkOptions,
    fail_fast: bool,
    issues: &IssueLog,
) -> Result<Option<Walk>> {
    match walker.walk(base, options) {
        Ok(walk) => {
            debug!(base = %base.display(), walker = walker.name(), "Opened base");
            Ok(Some(walk))
        }
        Err(source) if fail_fast => Err(FindError::BaseUnavailable {
            base: base.to_path_buf(),
            source,
        }),
        Err(err) => {
            warn!(
                base = %base.display(),
                error = %err,
                "Failed to start scanning base, skipping it"
            );
            issues.record(Issue::open(base, &err));
            Ok(None)
        }
    }
}

/// The filtered output of one open base.
///
/// Dropping the scan drops the underlying walk.
pub struct BaseScan {
    walk: Shielded<Walk>,
    pipeline: Arc<Pipeline>,
    base_pipeline: BasePipeline,
    cancel: Arc<AtomicBool>,
}

impl BaseScan {
    /// The traversal root
    pub fn base(&self) -> &Path {
        self.base_pipeline.base()
    }

    /// End the scan at the next candidate once `cancel` is raised.
    pub fn cancel_on(&mut self, cancel: Arc<AtomicBool>) {
        self.cancel = cancel;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }
}

impl Iterator for BaseScan {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            if self.is_cancelled() {
                trace!(base = %self.base().display(), "Scan cancelled");
                return None;
            }
            let path = self.walk.next()?;
            if !self.pipeline.global().accepts(&path) {
                continue;
            }
            if let Some(path) = self.base_pipeline.apply(path) {
                return Some(path);
            }
        }
    }
}

/// Wrap an open walk with the shield and the compiled stages for its base.
pub fn scan(
    walk: Walk,
    pipeline: Arc<Pipeline>,
    base_pipeline: BasePipeline,
    issues: IssueLog,
) -> BaseScan {
    let base = base_pipeline.base().to_path_buf();
    BaseScan {
        walk: Shielded::new(walk, base, issues),
        pipeline,
        base_pipeline,
        cancel: Arc::new(AtomicBool::new(false)),
    }
}
