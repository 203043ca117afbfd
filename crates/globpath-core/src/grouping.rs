//! Grouping of include patterns by base, and partitioning of excludes.
//!
//! Include globs that share a static base are scanned once: their matchers are
//! merged into a single [`IncludeRule`] for that base. A plain directory
//! include such as `src` means "everything under `src`", so it absorbs any
//! narrower pattern for the same base.

use crate::error::Result;
use crate::glob::{any_match, decompose, Matcher};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Which entries under a base are included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncludeRule {
    /// Every entry under the base
    MatchAll,

    /// Entries whose base-relative path matches any of these patterns
    Patterns(Vec<Matcher>),
}

impl IncludeRule {
    /// Merge another rule for the same base into this one.
    ///
    /// `MatchAll` on either side wins; patterns are deduplicated.
    pub fn merge(&mut self, other: IncludeRule) {
        match other {
            IncludeRule::MatchAll => *self = IncludeRule::MatchAll,
            IncludeRule::Patterns(theirs) => {
                if let IncludeRule::Patterns(mine) = self {
                    for matcher in theirs {
                        if !mine.contains(&matcher) {
                            mine.push(matcher);
                        }
                    }
                    mine.sort();
                }
            }
        }
    }

    /// Returns true if this rule accepts every path
    pub fn is_match_all(&self) -> bool {
        matches!(self, IncludeRule::MatchAll)
    }

    /// Check a base-relative path against this rule.
    pub fn matches(&self, relative: &Path) -> bool {
        match self {
            IncludeRule::MatchAll => true,
            IncludeRule::Patterns(matchers) => any_match(matchers, relative),
        }
    }
}

/// One traversal root and the include rule that applies under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseGroup {
    base: PathBuf,
    rule: IncludeRule,
}

impl BaseGroup {
    /// Create a new group
    pub fn new(base: PathBuf, rule: IncludeRule) -> Self {
        BaseGroup { base, rule }
    }

    /// The absolute, normalized traversal root
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// The include rule for entries under the base
    pub fn rule(&self) -> &IncludeRule {
        &self.rule
    }
}

/// Group include patterns by their static base.
///
/// Blank patterns are ignored. When nothing is left, the result is a single
/// match-all group for `default_base`: an empty include set selects
/// everything rather than nothing.
pub fn group_includes<I, S>(default_base: &Path, patterns: I) -> Result<Vec<BaseGroup>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut groups: BTreeMap<PathBuf, IncludeRule> = BTreeMap::new();

    for pattern in patterns {
        let pattern = pattern.as_ref().trim();
        if pattern.is_empty() {
            continue;
        }

        let group = decompose(default_base, pattern).into_group()?;
        match groups.get_mut(&group.base) {
            Some(rule) => rule.merge(group.rule),
            None => {
                groups.insert(group.base, group.rule);
            }
        }
    }

    if groups.is_empty() {
        groups.insert(default_base.to_path_buf(), IncludeRule::MatchAll);
    }

    debug!(groups = groups.len(), "Grouped include patterns by base");

    Ok(groups
        .into_iter()
        .map(|(base, rule)| BaseGroup::new(base, rule))
        .collect())
}

/// Exclude matchers split by how they are evaluated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludePartition {
    /// Rooted patterns, matched against absolute candidate paths
    pub absolute: Vec<Matcher>,

    /// Bare patterns, matched against paths relative to the producing base
    pub relative: Vec<Matcher>,
}

impl ExcludePartition {
    /// Returns true if no exclude pattern is configured
    pub fn is_empty(&self) -> bool {
        self.absolute.is_empty() && self.relative.is_empty()
    }
}

/// Returns true if a separator-normalized pattern denotes a rooted path.
pub fn is_absolute_pattern(pattern: &str) -> bool {
    pattern.starts_with('/') || Path::new(pattern).is_absolute()
}

/// Compile exclude patterns and split them into absolute and relative sets.
pub fn partition_excludes<I, S>(patterns: I) -> Result<ExcludePartition>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut partition = ExcludePartition::default();

    for pattern in patterns {
        let pattern = pattern.as_ref().trim();
        if pattern.is_empty() {
            continue;
        }

        let normalized = pattern.replace('\\', "/");
        let matcher = Matcher::compile(&normalized)?;
        let target = if is_absolute_pattern(&normalized) {
            &mut partition.absolute
        } else {
            &mut partition.relative
        };
        if !target.contains(&matcher) {
            target.push(matcher);
        }
    }

    Ok(partition)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(rule: &IncludeRule) -> Vec<&str> {
        match rule {
            IncludeRule::MatchAll => Vec::new(),
            IncludeRule::Patterns(matchers) => matchers.iter().map(|m| m.pattern()).collect(),
        }
    }

    #[test]
    fn test_empty_includes_select_everything_under_base() {
        let groups = group_includes(Path::new("/work"), Vec::<String>::new()).unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].base(), Path::new("/work"));
        assert!(groups[0].rule().is_match_all());
    }

    #[test]
    fn test_blank_includes_are_trimmed_out() {
        let groups = group_includes(Path::new("/work"), ["", " ", "\t", "   "]).unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].base(), Path::new("/work"));
        assert!(groups[0].rule().is_match_all());
    }

    #[test]
    fn test_match_all_collapses_group() {
        let groups =
            group_includes(Path::new("/work"), ["src", "src/**/*.java", "src/**/impl/**"])
                .unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].base(), Path::new("/work/src"));
        assert!(groups[0].rule().is_match_all());
    }

    #[test]
    fn test_match_all_wins_regardless_of_order() {
        let mut rule = IncludeRule::MatchAll;
        rule.merge(IncludeRule::Patterns(vec![Matcher::compile("*.rs").unwrap()]));
        assert!(rule.is_match_all());

        let mut rule = IncludeRule::Patterns(vec![Matcher::compile("*.rs").unwrap()]);
        rule.merge(IncludeRule::MatchAll);
        assert!(rule.is_match_all());
    }

    #[test]
    fn test_patterns_for_same_base_are_merged() {
        let groups = group_includes(
            Path::new("/work"),
            ["**/*.java", "**/*.kt", "  **/*.java  ", "/abs/dir/*.txt"],
        )
        .unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].base(), Path::new("/abs/dir"));
        assert_eq!(patterns(groups[0].rule()), vec!["*.txt"]);
        assert_eq!(groups[1].base(), Path::new("/work"));
        assert_eq!(patterns(groups[1].rule()), vec!["**/*.java", "**/*.kt"]);
    }

    #[test]
    fn test_overlapping_bases_stay_separate() {
        let groups = group_includes(Path::new("/m"), ["**/*.java", "src/**/*.java"]).unwrap();

        let bases: Vec<_> = groups.iter().map(|g| g.base().to_path_buf()).collect();
        assert_eq!(bases, vec![PathBuf::from("/m"), PathBuf::from("/m/src")]);
    }

    #[test]
    fn test_invalid_include_fails_synchronously() {
        let err = group_includes(Path::new("/work"), ["src/*.{"]).unwrap_err();
        assert!(err.is_query_error());
        assert!(err.to_string().contains("src/*.{"));
    }

    #[test]
    fn test_rule_matching() {
        let rule = IncludeRule::Patterns(vec![Matcher::compile("*.log").unwrap()]);
        assert!(rule.matches(Path::new("error.log")));
        assert!(!rule.matches(Path::new("sub/error.log")));
        assert!(IncludeRule::MatchAll.matches(Path::new("anything/at/all")));
    }

    #[test]
    fn test_partition_excludes() {
        let partition =
            partition_excludes(["**/test/**", "/srv/target/**", " ", "\\tmp\\*.bak"])
                .unwrap();

        let absolute: Vec<_> = partition.absolute.iter().map(|m| m.pattern()).collect();
        let relative: Vec<_> = partition.relative.iter().map(|m| m.pattern()).collect();

        assert!(absolute.contains(&"/srv/target/**"));
        assert!(absolute.contains(&"/tmp/*.bak"));
        assert!(relative.contains(&"**/test/**"));
        assert!(!partition.is_empty());
    }

    #[test]
    fn test_partition_empty() {
        let partition = partition_excludes(Vec::<&str>::new()).unwrap();
        assert!(partition.is_empty());
    }

    #[test]
    fn test_invalid_exclude_is_rejected() {
        let err = partition_excludes(["**.java["]).unwrap_err();
        assert!(err.to_string().contains("**.java["));
    }
}
