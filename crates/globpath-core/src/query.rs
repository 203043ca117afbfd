//! The immutable query object handed to [`crate::PathFinder::find`].
//!
//! A `PathQuery` describes a base directory, include/exclude glob filters, an
//! optional extension whitelist, a depth limit, and the file-type, symlink and
//! error policies. It is built once through [`PathQueryBuilder`], which turns
//! every omitted field into a safe default, and is never mutated afterwards.
//!
//! ## Defaults
//!
//! | field | default |
//! |-------|---------|
//! | `base_dir` | `.` |
//! | `include_globs` | empty (everything under the base) |
//! | `exclude_globs` | empty (no exclusion) |
//! | `allowed_extensions` | empty (no extension filter) |
//! | `max_depth` | unlimited |
//! | `only_files` | `true` |
//! | `follow_links` | `true` |
//! | `fail_fast` | `true` |

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Immutable description of one search.
///
/// Equality and hashing cover every field, `fail_fast` included: two queries
/// that differ only in their error policy can produce different outcomes, so
/// they are not interchangeable as cache keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathQuery {
    base_dir: PathBuf,
    include_globs: BTreeSet<String>,
    exclude_globs: BTreeSet<String>,
    allowed_extensions: BTreeSet<String>,
    max_depth: Option<usize>,
    only_files: bool,
    follow_links: bool,
    fail_fast: bool,
}

impl PathQuery {
    /// Start building a query.
    pub fn builder() -> PathQueryBuilder {
        PathQueryBuilder::default()
    }

    /// A builder pre-filled with this query's values.
    pub fn to_builder(&self) -> PathQueryBuilder {
        PathQueryBuilder {
            base_dir: Some(self.base_dir.clone()),
            include_globs: Some(self.include_globs.clone()),
            exclude_globs: Some(self.exclude_globs.clone()),
            allowed_extensions: Some(self.allowed_extensions.clone()),
            max_depth: self.max_depth.map(Depth::Limited).or(Some(Depth::Unlimited)),
            only_files: Some(self.only_files),
            follow_links: Some(self.follow_links),
            fail_fast: Some(self.fail_fast),
        }
    }

    /// Starting directory; may be relative until the finder resolves it.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Include glob patterns. Empty means "everything under the base".
    pub fn include_globs(&self) -> &BTreeSet<String> {
        &self.include_globs
    }

    /// Exclude glob patterns.
    pub fn exclude_globs(&self) -> &BTreeSet<String> {
        &self.exclude_globs
    }

    /// Allowed extensions, without dots, compared case-insensitively.
    pub fn allowed_extensions(&self) -> &BTreeSet<String> {
        &self.allowed_extensions
    }

    /// Maximum traversal depth below each base (`None` = unlimited).
    ///
    /// Depth 0 is the base itself, depth 1 its direct children.
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Return only regular files (`true`) or files and directories.
    pub fn only_files(&self) -> bool {
        self.only_files
    }

    /// Follow symbolic links during traversal.
    pub fn follow_links(&self) -> bool {
        self.follow_links
    }

    /// Abort the whole query when a base cannot be opened.
    pub fn fail_fast(&self) -> bool {
        self.fail_fast
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Depth {
    Limited(usize),
    Unlimited,
}

/// Builder for [`PathQuery`] with relaxed, optional inputs.
#[derive(Debug, Clone, Default)]
pub struct PathQueryBuilder {
    base_dir: Option<PathBuf>,
    include_globs: Option<BTreeSet<String>>,
    exclude_globs: Option<BTreeSet<String>>,
    allowed_extensions: Option<BTreeSet<String>>,
    max_depth: Option<Depth>,
    only_files: Option<bool>,
    follow_links: Option<bool>,
    fail_fast: Option<bool>,
}

impl PathQueryBuilder {
    /// Set the starting directory
    pub fn base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    /// Replace the include globs
    pub fn include_globs<I, S>(mut self, globs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_globs = Some(globs.into_iter().map(Into::into).collect());
        self
    }

    /// Add one include glob
    pub fn include(mut self, glob: impl Into<String>) -> Self {
        self.include_globs
            .get_or_insert_with(BTreeSet::new)
            .insert(glob.into());
        self
    }

    /// Replace the exclude globs
    pub fn exclude_globs<I, S>(mut self, globs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_globs = Some(globs.into_iter().map(Into::into).collect());
        self
    }

    /// Add one exclude glob
    pub fn exclude(mut self, glob: impl Into<String>) -> Self {
        self.exclude_globs
            .get_or_insert_with(BTreeSet::new)
            .insert(glob.into());
        self
    }

    /// Replace the allowed extensions
    pub fn allowed_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_extensions = Some(extensions.into_iter().map(Into::into).collect());
        self
    }

    /// Limit traversal depth
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(Depth::Limited(depth));
        self
    }

    /// Limit traversal depth; a negative value means unlimited.
    pub fn max_depth_signed(mut self, depth: i64) -> Self {
        self.max_depth = Some(match usize::try_from(depth) {
            Ok(depth) => Depth::Limited(depth),
            Err(_) => Depth::Unlimited,
        });
        self
    }

    /// Remove any depth limit
    pub fn unlimited_depth(mut self) -> Self {
        self.max_depth = Some(Depth::Unlimited);
        self
    }

    /// Return only regular files
    pub fn only_files(mut self, only_files: bool) -> Self {
        self.only_files = Some(only_files);
        self
    }

    /// Follow symbolic links
    pub fn follow_links(mut self, follow_links: bool) -> Self {
        self.follow_links = Some(follow_links);
        self
    }

    /// Abort on open-time I/O failures instead of skipping the base
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = Some(fail_fast);
        self
    }

    /// Freeze the query, applying defaults for omitted fields.
    pub fn build(self) -> PathQuery {
        PathQuery {
            base_dir: self.base_dir.unwrap_or_else(|| PathBuf::from(".")),
            include_globs: self.include_globs.unwrap_or_default(),
            exclude_globs: self.exclude_globs.unwrap_or_default(),
            allowed_extensions: self.allowed_extensions.unwrap_or_default(),
            max_depth: match self.max_depth {
                Some(Depth::Limited(depth)) => Some(depth),
                Some(Depth::Unlimited) | None => None,
            },
            only_files: self.only_files.unwrap_or(true),
            follow_links: self.follow_links.unwrap_or(true),
            fail_fast: self.fail_fast.unwrap_or(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let query = PathQuery::builder().build();

        assert_eq!(query.base_dir(), Path::new("."));
        assert!(query.include_globs().is_empty());
        assert!(query.exclude_globs().is_empty());
        assert!(query.allowed_extensions().is_empty());
        assert_eq!(query.max_depth(), None);
        assert!(query.only_files());
        assert!(query.follow_links());
        assert!(query.fail_fast());
    }

    #[test]
    fn test_negative_depth_is_unlimited() {
        let query = PathQuery::builder().max_depth_signed(-1).build();
        assert_eq!(query.max_depth(), None);

        let query = PathQuery::builder().max_depth_signed(3).build();
        assert_eq!(query.max_depth(), Some(3));
    }

    #[test]
    fn test_collections_are_sets() {
        let query = PathQuery::builder()
            .include_globs(["**/*.rs", "**/*.rs"])
            .include("src")
            .exclude("**/target/**")
            .allowed_extensions(vec!["rs".to_string()])
            .build();

        assert_eq!(query.include_globs().len(), 2);
        assert!(query.include_globs().contains("src"));
        assert!(query.exclude_globs().contains("**/target/**"));
        assert!(query.allowed_extensions().contains("rs"));
    }

    #[test]
    fn test_equality_ignores_insertion_order() {
        let a = PathQuery::builder()
            .base_dir("/tmp")
            .include_globs(["a/**", "b/**"])
            .build();
        let b = PathQuery::builder()
            .base_dir("/tmp")
            .include_globs(["b/**", "a/**"])
            .build();
        assert_eq!(a, b);

        let c = b.to_builder().fail_fast(false).build();
        assert_ne!(a, c);
    }

    #[test]
    fn test_to_builder_round_trip() {
        let query = PathQuery::builder()
            .base_dir("/srv")
            .include("**/*.log")
            .max_depth(2)
            .only_files(false)
            .follow_links(false)
            .fail_fast(false)
            .build();

        assert_eq!(query.to_builder().build(), query);
        assert_eq!(query.to_builder().unlimited_depth().build().max_depth(), None);
    }
}
