//! Glob decomposition and compiled matchers.
//!
//! Every include glob is split into a literal *static base* directory and a
//! residual wildcard pattern, so traversal can start at the deepest directory
//! the pattern allows instead of at the query's base:
//!
//! | glob | base | residual |
//! |------|------|----------|
//! | `/var/log/nginx/*.log` | `/var/log/nginx` | `*.log` |
//! | `src/**/*.java` (base `/tmp`) | `/tmp/src` | `**/*.java` |
//! | `/opt/data/` | `/opt/data` | none (match all) |
//!
//! Glob syntax itself is delegated to `globset`. Matchers are compiled with a
//! literal separator, so `*` stays within one path component while `**`
//! spans directories.
//!
//! A trailing slash after a wildcard segment is kept on the residual
//! (`src/*/` gives `*/`). Walked paths never end in a separator, so such a
//! residual matches nothing. It does not mean "directories only"; use
//! `only_files = false` with `src/*` for that.

use crate::error::{FindError, Result};
use crate::grouping::{BaseGroup, IncludeRule};
use crate::paths::normalize;
use globset::{GlobBuilder, GlobMatcher};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// Characters that make a path segment a wildcard segment.
const GLOB_METACHARS: &[char] = &['*', '?', '[', ']', '{', '}'];

/// A compiled glob pattern.
///
/// Two matchers are equal when they were compiled from the same pattern text.
#[derive(Clone)]
pub struct Matcher {
    pattern: String,
    matcher: GlobMatcher,
}

impl Matcher {
    /// Compile a glob pattern.
    ///
    /// Fails with [`FindError::InvalidPattern`] naming the pattern when the
    /// syntax is malformed (unclosed class or alternation, inverted range).
    pub fn compile(pattern: &str) -> Result<Self> {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| FindError::invalid_pattern(pattern, e.kind()))?;

        Ok(Matcher {
            pattern: pattern.to_string(),
            matcher: glob.compile_matcher(),
        })
    }

    /// Check whether a path (relative or absolute) matches this pattern.
    pub fn matches(&self, path: &Path) -> bool {
        self.matcher.is_match(path)
    }

    /// The source pattern
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Matcher").field(&self.pattern).finish()
    }
}

impl PartialEq for Matcher {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Eq for Matcher {}

impl Hash for Matcher {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pattern.hash(state);
    }
}

impl PartialOrd for Matcher {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Matcher {
    fn cmp(&self, other: &Self) -> Ordering {
        self.pattern.cmp(&other.pattern)
    }
}

/// Check if any matcher in the slice matches the path.
pub fn any_match(matchers: &[Matcher], path: &Path) -> bool {
    matchers.iter().any(|m| m.matches(path))
}

/// A glob split into its static base and residual pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecomposedGlob {
    /// The original glob text
    pub glob: String,

    /// Absolute, normalized directory where traversal for this glob starts
    pub base: PathBuf,

    /// Wildcard remainder, matched against paths relative to `base`.
    /// `None` means every entry under `base` matches.
    pub residual: Option<String>,

    /// True when `base` was derived from the default base rather than from an
    /// absolute prefix in the glob
    pub relative_to_default: bool,
}

impl DecomposedGlob {
    /// Compile the residual into an include rule for this glob's base.
    pub fn into_group(self) -> Result<BaseGroup> {
        let rule = match &self.residual {
            None => IncludeRule::MatchAll,
            Some(residual) => {
                let matcher = Matcher::compile(residual).map_err(|e| match e {
                    FindError::InvalidPattern { reason, .. } => FindError::InvalidPattern {
                        pattern: self.glob.clone(),
                        reason,
                    },
                    other => other,
                })?;
                IncludeRule::Patterns(vec![matcher])
            }
        };
        Ok(BaseGroup::new(self.base, rule))
    }
}

/// Returns true if the segment contains any glob metacharacter.
pub fn is_wildcard_segment(segment: &str) -> bool {
    segment.contains(GLOB_METACHARS)
}

/// Split a glob into its static base and residual pattern.
///
/// `default_base` must already be absolute and normalized; it is used when
/// the glob has no static prefix or the prefix is relative. Backslashes are
/// treated as separators.
pub fn decompose(default_base: &Path, glob: &str) -> DecomposedGlob {
    let normalized = glob.replace('\\', "/");
    let rooted = normalized.starts_with('/');
    let trailing_slash = normalized.ends_with('/');

    let segments: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();
    let static_len = segments
        .iter()
        .position(|s| is_wildcard_segment(s))
        .unwrap_or(segments.len());

    let mut prefix = String::new();
    if rooted {
        prefix.push('/');
    }
    prefix.push_str(&segments[..static_len].join("/"));

    let (base, relative_to_default) = if prefix.is_empty() {
        (default_base.to_path_buf(), true)
    } else {
        let prefix_path = Path::new(&prefix);
        if prefix_path.is_absolute() || rooted {
            (normalize(prefix_path), false)
        } else {
            (normalize(&default_base.join(prefix_path)), true)
        }
    };

    let residual = if static_len == segments.len() {
        None
    } else {
        let mut residual = segments[static_len..].join("/");
        if trailing_slash {
            residual.push('/');
        }
        Some(residual)
    };

    DecomposedGlob {
        glob: glob.to_string(),
        base,
        residual,
        relative_to_default,
    }
}
