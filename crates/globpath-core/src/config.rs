//! Configuration management for globpath.
//!
//! Persisted defaults for queries run from the command line. Configuration is
//! stored as TOML in a platform-appropriate location; a missing file means
//! built-in defaults.

use crate::aggregate::{FinderOptions, DEFAULT_CHANNEL_CAPACITY};
use crate::error::{FindError, Result};
use crate::query::{PathQuery, PathQueryBuilder};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Main configuration structure.
///
/// ## Example Configuration File (globpath.toml)
///
/// ```toml
/// [general]
/// log_level = "info"
///
/// [query]
/// only_files = true
/// follow_links = true
/// fail_fast = true
/// max_depth = -1
/// exclude = ["**/.git/**", "**/target/**"]
/// extensions = []
///
/// [performance]
/// threads = 0
/// channel_capacity = 1024
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Defaults applied to every query
    pub query: QueryDefaults,

    /// Concurrency tuning
    pub performance: PerformanceConfig,
}

/// General configuration options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            log_level: "info".to_string(),
        }
    }
}

/// Query defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryDefaults {
    /// Return only regular files
    pub only_files: bool,

    /// Follow symbolic links
    pub follow_links: bool,

    /// Abort when a base cannot be opened
    pub fail_fast: bool,

    /// Maximum depth below each base (negative = unlimited)
    pub max_depth: i64,

    /// Exclude globs added to every query
    pub exclude: Vec<String>,

    /// Extension whitelist added to every query
    pub extensions: Vec<String>,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        QueryDefaults {
            only_files: true,
            follow_links: true,
            fail_fast: true,
            max_depth: -1,
            exclude: Vec::new(),
            extensions: Vec::new(),
        }
    }
}

/// Performance configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Worker threads per query (0 = available parallelism)
    pub threads: usize,

    /// Results buffered between scanners and the consumer
    pub channel_capacity: usize,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        PerformanceConfig {
            threads: 0,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default config if no config file exists.
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Config::default());
        }

        info!(path = %path.display(), "Loading configuration");
        let contents = fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| FindError::ConfigError {
            reason: format!("Failed to parse {}: {}", path.display(), e),
        })
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        info!(path = %path.display(), "Saving configuration");
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| FindError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
        })
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "globpath").ok_or_else(|| FindError::ConfigError {
            reason: "Could not determine config directory".to_string(),
        })?;

        Ok(dirs.config_dir().join("globpath.toml"))
    }

    /// Concurrency options for [`crate::PathFinder::with_options`].
    pub fn finder_options(&self) -> FinderOptions {
        FinderOptions {
            threads: self.performance.threads,
            channel_capacity: self.performance.channel_capacity,
        }
    }

    /// A query builder seeded with the configured defaults.
    ///
    /// Include globs are left empty; they are always per query.
    pub fn query_builder(&self, base_dir: impl Into<PathBuf>) -> PathQueryBuilder {
        PathQuery::builder()
            .base_dir(base_dir)
            .exclude_globs(self.query.exclude.iter().cloned())
            .allowed_extensions(self.query.extensions.iter().cloned())
            .max_depth_signed(self.query.max_depth)
            .only_files(self.query.only_files)
            .follow_links(self.query.follow_links)
            .fail_fast(self.query.fail_fast)
    }
}
