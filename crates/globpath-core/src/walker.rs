//! Directory walker abstraction.
//!
//! The traversal engine only talks to a [`DirectoryWalker`]. The production
//! implementation, [`FsWalker`], is backed by `walkdir`; tests inject their own
//! walkers to simulate failures that are hard to provoke on a real filesystem.
//!
//! ## Contract
//!
//! - `walk` performs the open-time check: if the root cannot be read it
//!   returns `Err` before any entry is produced.
//! - The returned iterator yields absolute paths under the root, the root
//!   itself included at depth 0. Failures met while iterating are yielded as
//!   `Err` items; the consumer decides what to do with them.
//! - A failure below the root (a denied subdirectory, a symlink loop) only
//!   costs that branch: the walk goes on with its siblings. Such errors are
//!   recognised by [`is_resumable`].
//! - `only_files` is applied by the walker: non-regular entries are not
//!   yielded, but directories are still descended.

use crate::query::PathQuery;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::trace;
use walkdir::WalkDir;

/// A lazily evaluated traversal of one root.
pub type Walk = Box<dyn Iterator<Item = io::Result<PathBuf>> + Send>;

/// Traversal options shared by every base of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkOptions {
    /// Maximum depth below the root (`None` = unlimited)
    pub max_depth: Option<usize>,

    /// Yield only regular files
    pub only_files: bool,

    /// Follow symbolic links, including a symlinked root
    pub follow_links: bool,
}

impl WalkOptions {
    /// Take the traversal-related fields of a query.
    pub fn from_query(query: &PathQuery) -> Self {
        WalkOptions {
            max_depth: query.max_depth(),
            only_files: query.only_files(),
            follow_links: query.follow_links(),
        }
    }
}

impl Default for WalkOptions {
    fn default() -> Self {
        WalkOptions {
            max_depth: None,
            only_files: true,
            follow_links: true,
        }
    }
}

/// Source of directory entries for the traversal engine.
///
/// Implementations must be `Send + Sync`; one walker serves every base of a
/// query, and walks run on worker threads.
pub trait DirectoryWalker: Send + Sync {
    /// Open `root` and return a lazy walk over it.
    fn walk(&self, root: &Path, options: &WalkOptions) -> io::Result<Walk>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Walker over the local filesystem, backed by `walkdir`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsWalker;

impl FsWalker {
    pub fn new() -> Self {
        FsWalker
    }

    /// Fail early if the root is missing or unreadable.
    fn check_root(root: &Path, follow_links: bool) -> io::Result<()> {
        let metadata = if follow_links {
            fs::metadata(root)?
        } else {
            fs::symlink_metadata(root)?
        };
        if metadata.is_dir() {
            fs::read_dir(root)?;
        }
        Ok(())
    }
}

impl DirectoryWalker for FsWalker {
    fn walk(&self, root: &Path, options: &WalkOptions) -> io::Result<Walk> {
        Self::check_root(root, options.follow_links)?;

        let mut walkdir = WalkDir::new(root)
            .follow_links(options.follow_links)
            .follow_root_links(options.follow_links);
        if let Some(depth) = options.max_depth {
            walkdir = walkdir.max_depth(depth);
        }

        let only_files = options.only_files;
        let entries = walkdir.into_iter().filter_map(move |entry| match entry {
            Ok(entry) => {
                if only_files && !entry.file_type().is_file() {
                    return None;
                }
                Some(Ok(entry.into_path()))
            }
            Err(err) => match dangling_link(&err) {
                // A link whose target is gone is an entry, not a failure.
                Some(path) if only_files => {
                    trace!(path = %path.display(), "Skipping dangling link");
                    None
                }
                Some(path) => Some(Ok(path)),
                None => Some(Err(into_io_error(err))),
            },
        });

        Ok(Box::new(entries))
    }

    fn name(&self) -> &'static str {
        "fs"
    }
}

/// The path of a symlink whose target could not be resolved.
fn dangling_link(err: &walkdir::Error) -> Option<PathBuf> {
    if err.loop_ancestor().is_some() {
        return None;
    }
    let not_found = err
        .io_error()
        .map_or(false, |e| e.kind() == io::ErrorKind::NotFound);
    if !not_found {
        return None;
    }
    let path = err.path()?;
    let is_link = fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false);
    is_link.then(|| path.to_path_buf())
}

fn into_io_error(err: walkdir::Error) -> io::Error {
    let kind = err.io_error().map_or(io::ErrorKind::Other, io::Error::kind);
    io::Error::new(kind, err)
}

/// The entry a walker error refers to, when the walker recorded one.
pub fn failed_path(err: &io::Error) -> Option<PathBuf> {
    err.get_ref()?
        .downcast_ref::<walkdir::Error>()?
        .path()
        .map(Path::to_path_buf)
}

/// Whether the walk goes on after `err`.
///
/// A walkdir error below the root names one entry whose subtree walkdir has
/// already skipped. Anything else, including errors from other walkers, is
/// treated as the end of the walk.
pub fn is_resumable(err: &io::Error) -> bool {
    err.get_ref()
        .and_then(|inner| inner.downcast_ref::<walkdir::Error>())
        .map_or(false, |inner| inner.depth() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::write(dir.path().join("L0.java"), "").unwrap();
        fs::write(dir.path().join("a/L1.java"), "").unwrap();
        fs::write(dir.path().join("a/b/L2.java"), "").unwrap();
        dir
    }

    fn collect(root: &Path, options: WalkOptions) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = FsWalker
            .walk(root, &options)
            .unwrap()
            .collect::<io::Result<_>>()
            .unwrap();
        paths.sort();
        paths
    }

    #[test]
    fn test_unlimited_walk_yields_all_files() {
        let dir = tree();
        let paths = collect(dir.path(), WalkOptions::default());

        assert_eq!(
            paths,
            vec![
                dir.path().join("L0.java"),
                dir.path().join("a/L1.java"),
                dir.path().join("a/b/L2.java"),
            ]
        );
    }

    #[test]
    fn test_depth_counts_root_as_zero() {
        let dir = tree();

        let options = WalkOptions {
            max_depth: Some(1),
            ..WalkOptions::default()
        };
        assert_eq!(collect(dir.path(), options), vec![dir.path().join("L0.java")]);

        let options = WalkOptions {
            max_depth: Some(0),
            only_files: false,
            ..WalkOptions::default()
        };
        assert_eq!(collect(dir.path(), options), vec![dir.path().to_path_buf()]);
    }

    #[test]
    fn test_directories_included_when_not_only_files() {
        let dir = tree();
        let options = WalkOptions {
            max_depth: Some(1),
            only_files: false,
            ..WalkOptions::default()
        };

        assert_eq!(
            collect(dir.path(), options),
            vec![
                dir.path().to_path_buf(),
                dir.path().join("L0.java"),
                dir.path().join("a"),
            ]
        );
    }

    #[test]
    fn test_missing_root_fails_at_open() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");

        let err = FsWalker
            .walk(&missing, &WalkOptions::default())
            .err()
            .unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_file_root_yields_itself() {
        let dir = tree();
        let file = dir.path().join("a/L1.java");

        assert_eq!(collect(&file, WalkOptions::default()), vec![file]);
    }

    #[test]
    fn test_failed_path_ignores_foreign_errors() {
        let err = io::Error::new(io::ErrorKind::Other, "synthetic");
        assert_eq!(failed_path(&err), None);
        assert!(!is_resumable(&err));
    }

    #[cfg(unix)]
    #[test]
    fn test_loop_below_root_is_resumable() {
        let dir = tree();
        fs::create_dir(dir.path().join("cyc")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("cyc"), dir.path().join("cyc/back")).unwrap();
        fs::write(dir.path().join("z.java"), "").unwrap();

        let items: Vec<_> = FsWalker
            .walk(dir.path(), &WalkOptions::default())
            .unwrap()
            .collect();
        let errors: Vec<_> = items.iter().filter_map(|item| item.as_ref().err()).collect();
        let files = items.iter().filter(|item| item.is_ok()).count();

        assert_eq!(errors.len(), 1);
        assert!(is_resumable(errors[0]));
        assert_eq!(failed_path(errors[0]), Some(dir.path().join("cyc/back")));
        assert_eq!(files, 4);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_link_is_not_a_failure() {
        let dir = tree();
        let link = dir.path().join("broken");
        std::os::unix::fs::symlink(dir.path().join("gone"), &link).unwrap();

        let files = collect(dir.path(), WalkOptions::default());
        assert_eq!(files.len(), 3);

        let options = WalkOptions {
            only_files: false,
            ..WalkOptions::default()
        };
        assert!(collect(dir.path(), options).contains(&link));
    }

    #[cfg(unix)]
    #[test]
    fn test_links_followed_only_on_request() {
        let dir = tree();
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("far.txt"), "").unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();

        let followed = collect(dir.path(), WalkOptions::default());
        assert!(followed.contains(&dir.path().join("link/far.txt")));

        let options = WalkOptions {
            follow_links: false,
            ..WalkOptions::default()
        };
        let not_followed = collect(dir.path(), options);
        assert!(!not_followed.iter().any(|p| p.ends_with("far.txt")));
    }
}
