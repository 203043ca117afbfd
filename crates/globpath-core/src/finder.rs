//! Query entry point.
//!
//! [`PathFinder::find`] compiles a [`PathQuery`] and starts the scan:
//!
//! 1. resolve the base directory to an absolute, normalized path
//! 2. group include globs by static base, partition excludes
//! 3. compile the filter pipeline once
//! 4. open every base on the calling thread (fail-fast errors return here)
//! 5. hand the open scans to the aggregator and return the stream
//!
//! Pattern errors and fail-fast open errors are returned from `find` itself;
//! nothing is traversed in that case.

use crate::aggregate::{FinderOptions, PathStream};
use crate::engine::{open_base, scan};
use crate::error::Result;
use crate::grouping::{group_includes, partition_excludes};
use crate::paths::absolutize;
use crate::pipeline::Pipeline;
use crate::query::PathQuery;
use crate::report::IssueLog;
use crate::walker::{DirectoryWalker, FsWalker, WalkOptions};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Runs path queries against a directory walker.
#[derive(Clone)]
pub struct PathFinder {
    walker: Arc<dyn DirectoryWalker>,
    options: FinderOptions,
}

impl PathFinder {
    /// A finder over the local filesystem with default options
    pub fn new() -> Self {
        Self::with_walker(Arc::new(FsWalker::new()))
    }

    /// A finder that reads directories through `walker`
    pub fn with_walker(walker: Arc<dyn DirectoryWalker>) -> Self {
        PathFinder {
            walker,
            options: FinderOptions::default(),
        }
    }

    /// Replace the concurrency options
    pub fn with_options(mut self, options: FinderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &FinderOptions {
        &self.options
    }

    /// Start a query and return its result stream.
    ///
    /// Fails with [`crate::FindError::InvalidPattern`] for a malformed include
    /// or exclude glob, and with [`crate::FindError::BaseUnavailable`] when a
    /// base cannot be opened and the query is fail-fast.
    pub fn find(&self, query: &PathQuery) -> Result<PathStream> {
        let base = absolutize(query.base_dir())?;
        debug!(
            base = %base.display(),
            includes = query.include_globs().len(),
            excludes = query.exclude_globs().len(),
            extensions = query.allowed_extensions().len(),
            max_depth = ?query.max_depth(),
            "Starting path query"
        );

        let groups = group_includes(&base, query.include_globs())?;
        let excludes = partition_excludes(query.exclude_globs())?;
        let pipeline = Arc::new(Pipeline::compile(query, excludes));

        let options = WalkOptions::from_query(query);
        let issues = IssueLog::new();
        let mut scans = Vec::with_capacity(groups.len());
        for group in &groups {
            let opened = open_base(
                self.walker.as_ref(),
                group.base(),
                &options,
                query.fail_fast(),
                &issues,
            )?;
            if let Some(walk) = opened {
                scans.push(scan(
                    walk,
                    Arc::clone(&pipeline),
                    pipeline.for_base(group),
                    issues.clone(),
                ));
            }
        }

        PathStream::spawn(scans, issues, &self.options)
    }
}

impl Default for PathFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PathFinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathFinder")
            .field("walker", &self.walker.name())
            .field("options", &self.options)
            .finish()
    }
}

/// Run a query on the local filesystem with default options.
pub fn find_paths(query: &PathQuery) -> Result<PathStream> {
    PathFinder::new().find(query)
}
