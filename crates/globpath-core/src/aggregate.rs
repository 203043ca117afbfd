//! Concurrent merge of per-base scans into one result stream.
//!
//! Each open base becomes one job on a per-query `rayon` pool. Jobs push their
//! results into a bounded `crossbeam_channel`, so producers block once the
//! consumer falls behind. A shared `DashSet` removes duplicates: only the
//! first job to claim a path forwards it.
//!
//! ## Shutdown
//!
//! [`PathStream::close`] (also run on drop) raises the cancel flag and drains
//! the channel until every producer has dropped its sender. Every scan shares
//! that flag and checks it before each walker entry, so a producer stops
//! within one entry even when nothing it reads passes the filters. A job
//! drops its scan, and with it the open walker, before its sender, so once
//! `close` returns no walker belonging to the stream is alive.

use crate::engine::BaseScan;
use crate::error::Result;
use crate::report::{Issue, IssueLog};
use crossbeam_channel::{bounded, Receiver, Sender};
use dashmap::DashSet;
use rayon::ThreadPoolBuilder;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Default capacity of the result channel
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Tuning for the concurrent part of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinderOptions {
    /// Upper bound on worker threads per query (0 = available parallelism)
    pub threads: usize,

    /// Results buffered between producers and the consumer
    pub channel_capacity: usize,
}

impl Default for FinderOptions {
    fn default() -> Self {
        FinderOptions {
            threads: 0,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl FinderOptions {
    /// Worker count for a query with `jobs` bases; never zero.
    pub fn worker_count(&self, jobs: usize) -> usize {
        let limit = if self.threads == 0 {
            std::thread::available_parallelism().map_or(1, |n| n.get())
        } else {
            self.threads
        };
        jobs.min(limit).max(1)
    }
}

/// The lazy, duplicate-free result of one query.
///
/// Paths arrive in no particular order. Use [`PathStream::into_sorted_vec`]
/// when a deterministic order matters.
pub struct PathStream {
    receiver: Option<Receiver<PathBuf>>,
    cancel: Arc<AtomicBool>,
    issues: IssueLog,
    emitted: usize,
}

impl PathStream {
    /// Start one job per scan and return the merged stream.
    pub fn spawn(scans: Vec<BaseScan>, issues: IssueLog, options: &FinderOptions) -> Result<Self> {
        let (sender, receiver) = bounded(options.channel_capacity.max(1));
        let cancel = Arc::new(AtomicBool::new(false));

        if scans.is_empty() {
            debug!("No base to scan");
            drop(sender);
        } else {
            let workers = options.worker_count(scans.len());
            let pool = ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("globpath-scan-{}", i))
                .build()?;
            debug!(bases = scans.len(), workers, "Scanning bases");

            let seen: Arc<DashSet<PathBuf>> = Arc::new(DashSet::new());
            for mut scan in scans {
                scan.cancel_on(Arc::clone(&cancel));
                let sender = sender.clone();
                let seen = Arc::clone(&seen);
                let cancel = Arc::clone(&cancel);
                pool.spawn(move || produce(scan, sender, seen, cancel));
            }
            // The pool's threads exit once the spawned jobs are done.
        }

        Ok(PathStream {
            receiver: Some(receiver),
            cancel,
            issues,
            emitted: 0,
        })
    }

    /// Diagnostics recorded so far for skipped bases and truncated branches
    pub fn issues(&self) -> Vec<Issue> {
        self.issues.snapshot()
    }

    /// Number of paths handed out so far
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Returns true once the stream is exhausted or closed
    pub fn is_closed(&self) -> bool {
        self.receiver.is_none()
    }

    /// Stop every producer and wait for them to exit.
    ///
    /// Remaining results are discarded. Calling this more than once is a
    /// no-op.
    pub fn close(&mut self) {
        let Some(receiver) = self.receiver.take() else {
            return;
        };
        self.cancel.store(true, Ordering::Release);

        let mut discarded = 0usize;
        while receiver.recv().is_ok() {
            discarded += 1;
        }
        debug!(emitted = self.emitted, discarded, "Path stream closed");
    }

    /// Collect the remaining paths in sorted order.
    pub fn into_sorted_vec(mut self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.by_ref().collect();
        paths.sort();
        paths
    }
}

impl Iterator for PathStream {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        let receiver = self.receiver.as_ref()?;
        match receiver.recv() {
            Ok(path) => {
                self.emitted += 1;
                debug!(path = %path.display(), "Emitting path");
                Some(path)
            }
            Err(_) => {
                self.receiver = None;
                debug!(
                    emitted = self.emitted,
                    issues = self.issues.len(),
                    "Path stream exhausted"
                );
                None
            }
        }
    }
}

impl Drop for PathStream {
    fn drop(&mut self) {
        self.close();
    }
}

/// Body of one job: forward unseen paths until done or cancelled.
fn produce(
    mut scan: BaseScan,
    sender: Sender<PathBuf>,
    seen: Arc<DashSet<PathBuf>>,
    cancel: Arc<AtomicBool>,
) {
    let base = scan.base().to_path_buf();
    let mut forwarded = 0usize;

    while !cancel.load(Ordering::Acquire) {
        let Some(path) = scan.next() else {
            break;
        };
        if !seen.insert(path.clone()) {
            trace!(path = %path.display(), "Duplicate path");
            continue;
        }
        if sender.send(path).is_err() {
            break;
        }
        forwarded += 1;
    }

    drop(scan);
    debug!(base = %base.display(), forwarded, "Base scan finished");
}
