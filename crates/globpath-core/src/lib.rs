//! # globpath Core Library
//!
//! Glob-driven file discovery over one or more base directories. A
//! [`PathQuery`] names a base directory, include and exclude globs, an
//! extension whitelist, a depth limit and the symlink and error policies;
//! [`PathFinder::find`] turns it into a lazy, duplicate-free stream of
//! absolute paths.
//!
//! ## Architecture
//!
//! - **Glob** (`glob`): split a glob into static base + residual pattern
//! - **Grouping** (`grouping`): merge includes per base, partition excludes
//! - **Pipeline** (`pipeline`): the compiled filter stages
//! - **Walker** (`walker`): directory traversal behind a trait
//! - **Shield** (`shield`): confine traversal failures to their base
//! - **Engine** (`engine`): open one base and filter its walk
//! - **Aggregate** (`aggregate`): concurrent scans merged into a `PathStream`
//! - **Finder** (`finder`): the entry point wiring it all together
//! - **Config** (`config`): persisted defaults for the CLI
//!
//! ## Example
//!
//! ```rust,no_run
//! use globpath_core::{find_paths, PathQuery};
//!
//! let query = PathQuery::builder()
//!     .base_dir("/srv/app")
//!     .include("src/**/*.rs")
//!     .exclude("**/generated/**")
//!     .build();
//!
//! for path in find_paths(&query)? {
//!     println!("{}", path.display());
//! }
//! # Ok::<(), globpath_core::FindError>(())
//! ```

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod error;
pub mod finder;
pub mod glob;
pub mod grouping;
pub mod paths;
pub mod pipeline;
pub mod query;
pub mod report;
pub mod shield;
pub mod walker;

// Re-export commonly used types
pub use aggregate::{FinderOptions, PathStream};
pub use config::Config;
pub use error::{FindError, Result};
pub use finder::{find_paths, PathFinder};
pub use glob::{decompose, DecomposedGlob, Matcher};
pub use grouping::{BaseGroup, IncludeRule};
pub use query::{PathQuery, PathQueryBuilder};
pub use report::{Issue, IssuePhase};
pub use walker::{DirectoryWalker, FsWalker, Walk, WalkOptions};
