//! Filter pipeline compilation.
//!
//! The pipeline is assembled once per query from the stages the query
//! actually needs; an unconfigured concern contributes no stage at all, so the
//! per-candidate cost is proportional to the number of active filters.
//!
//! Stage order is fixed:
//!
//! 1. extension whitelist (global)
//! 2. absolute excludes (global)
//! 3. relative phase (per base): relativize, include match, relative
//!    excludes, re-absolutize
//!
//! Cheap base-agnostic checks run first so candidates are discarded before
//! the per-base relativization. The `only_files` selector is not a stage; the
//! walker applies it before any candidate reaches the pipeline.

use crate::glob::{any_match, Matcher};
use crate::grouping::{BaseGroup, ExcludePartition, IncludeRule};
use crate::paths::{extension_lower, normalize};
use crate::query::PathQuery;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::trace;

/// A base-agnostic filter applied to every discovered path.
#[derive(Debug, Clone)]
pub enum GlobalStage {
    /// Keep paths whose lowercased extension is in the set
    Extension(BTreeSet<String>),

    /// Drop paths matched by any rooted exclude pattern
    AbsoluteExclude(Vec<Matcher>),
}

impl GlobalStage {
    /// Check if a path passes this stage.
    pub fn accepts(&self, path: &Path) -> bool {
        match self {
            GlobalStage::Extension(extensions) => {
                extension_lower(path).map_or(false, |ext| extensions.contains(&ext))
            }
            GlobalStage::AbsoluteExclude(matchers) => !any_match(matchers, path),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            GlobalStage::Extension(_) => "extension",
            GlobalStage::AbsoluteExclude(_) => "absolute exclude",
        }
    }
}

/// The ordered list of global stages.
#[derive(Debug, Clone, Default)]
pub struct GlobalPipeline {
    stages: Vec<GlobalStage>,
}

impl GlobalPipeline {
    /// The active stages, in evaluation order
    pub fn stages(&self) -> &[GlobalStage] {
        &self.stages
    }

    /// Check a raw discovered path against every stage.
    pub fn accepts(&self, path: &Path) -> bool {
        trace!(path = %path.display(), "Found");
        for stage in &self.stages {
            if !stage.accepts(path) {
                return false;
            }
            trace!(path = %path.display(), stage = stage.name(), "Passed filter");
        }
        true
    }
}

/// The part of the pipeline evaluated on base-relative paths.
#[derive(Debug, Clone)]
pub struct RelativePhase {
    include: Option<IncludeRule>,
    excludes: Option<Arc<Vec<Matcher>>>,
}

impl RelativePhase {
    /// Returns true if the include step is active
    pub fn has_include(&self) -> bool {
        self.include.is_some()
    }

    /// Returns true if the relative exclude step is active
    pub fn has_excludes(&self) -> bool {
        self.excludes.is_some()
    }

    fn accepts(&self, relative: &Path) -> bool {
        if let Some(include) = &self.include {
            if !include.matches(relative) {
                return false;
            }
            trace!(path = %relative.display(), "Passed include filter");
        }
        if let Some(excludes) = &self.excludes {
            if any_match(excludes, relative) {
                return false;
            }
            trace!(path = %relative.display(), "Passed relative exclude filter");
        }
        true
    }
}

/// The per-base part of the pipeline.
///
/// Without a relative phase this is the identity transform.
#[derive(Debug, Clone)]
pub struct BasePipeline {
    base: PathBuf,
    relative: Option<RelativePhase>,
}

impl BasePipeline {
    /// The base this pipeline relativizes against
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Returns true if this pipeline passes every path through unchanged
    pub fn is_identity(&self) -> bool {
        self.relative.is_none()
    }

    /// The relative phase, if any
    pub fn relative_phase(&self) -> Option<&RelativePhase> {
        self.relative.as_ref()
    }

    /// Run a globally accepted path through the per-base stages.
    ///
    /// Returns the absolute, normalized path if it survives.
    pub fn apply(&self, path: PathBuf) -> Option<PathBuf> {
        let Some(phase) = &self.relative else {
            return Some(path);
        };

        let relative = match path.strip_prefix(&self.base) {
            Ok(relative) => relative.to_path_buf(),
            // Walkers only yield paths under their root; anything else is
            // judged on its full path.
            Err(_) => path.clone(),
        };

        if !phase.accepts(&relative) {
            return None;
        }

        Some(normalize(&self.base.join(relative)))
    }
}

/// The compiled pipeline for one query.
#[derive(Debug, Clone)]
pub struct Pipeline {
    global: GlobalPipeline,
    relative_excludes: Option<Arc<Vec<Matcher>>>,
}

impl Pipeline {
    /// Build the global stages and keep what the per-base factory needs.
    pub fn compile(query: &PathQuery, excludes: ExcludePartition) -> Self {
        let mut stages = Vec::new();

        let extensions: BTreeSet<String> = query
            .allowed_extensions()
            .iter()
            .map(|ext| ext.trim())
            .filter(|ext| !ext.is_empty())
            .map(|ext| ext.trim_start_matches('.').to_lowercase())
            .collect();
        if !extensions.is_empty() {
            stages.push(GlobalStage::Extension(extensions));
        }

        if !excludes.absolute.is_empty() {
            stages.push(GlobalStage::AbsoluteExclude(excludes.absolute));
        }

        let relative_excludes = if excludes.relative.is_empty() {
            None
        } else {
            Some(Arc::new(excludes.relative))
        };

        Pipeline {
            global: GlobalPipeline { stages },
            relative_excludes,
        }
    }

    /// The base-agnostic stages
    pub fn global(&self) -> &GlobalPipeline {
        &self.global
    }

    /// Build the per-base pipeline for one group.
    ///
    /// A relative phase is added only when the group has include patterns or
    /// relative excludes exist.
    pub fn for_base(&self, group: &BaseGroup) -> BasePipeline {
        let include = match group.rule() {
            IncludeRule::MatchAll => None,
            rule @ IncludeRule::Patterns(_) => Some(rule.clone()),
        };

        let relative = if include.is_none() && self.relative_excludes.is_none() {
            None
        } else {
            Some(RelativePhase {
                include,
                excludes: self.relative_excludes.clone(),
            })
        };

        BasePipeline {
            base: group.base().to_path_buf(),
            relative,
        }
    }
}
