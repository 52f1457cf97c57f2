//! Configuration system for Armory.
//!
//! Load search configuration from TOML or YAML to control ranking, pruning,
//! progress reporting and wall-clock limits without code changes.
//!
//! # Examples
//!
//! ```
//! use armory_config::SearchConfig;
//! use std::time::Duration;
//!
//! let config = SearchConfig::from_toml_str(r#"
//!     max_results = 500
//!
//!     [ranking]
//!     criteria = ["base_defense", "jewel_count:asc"]
//!
//!     [termination]
//!     seconds_spent_limit = 10
//! "#).unwrap();
//!
//! assert_eq!(config.time_limit(), Some(Duration::from_secs(10)));
//! assert_eq!(config.ranking_criteria().unwrap().len(), 2);
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use armory_config::SearchConfig;
//!
//! let config = SearchConfig::load("armory.toml").unwrap_or_default();
//! ```

use std::path::Path;
use std::time::Duration;

use armory_core::{ArmoryError, RankingCriterion};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for ArmoryError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Invalid(message) => ArmoryError::InvalidConfiguration(message),
            other => ArmoryError::InvalidConfiguration(other.to_string()),
        }
    }
}

/// Main search configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct SearchConfig {
    /// Ranking configuration.
    #[serde(default)]
    pub ranking: RankingConfig,

    /// Pruning switches.
    #[serde(default)]
    pub pruning: PruningConfig,

    /// Progress reporting.
    #[serde(default)]
    pub progress: ProgressConfig,

    /// Wall-clock limit, enforced by the session through the cancel handle.
    #[serde(default)]
    pub termination: Option<TerminationConfig>,

    /// Stop collecting after this many matches. Must be at least 1.
    #[serde(default)]
    pub max_results: Option<usize>,
}

impl SearchConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Replaces the ranking criteria.
    pub fn with_criteria<I, T>(mut self, criteria: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.ranking.criteria = criteria.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the wall-clock limit in milliseconds.
    pub fn with_time_limit_millis(mut self, millis: u64) -> Self {
        self.termination = Some(TerminationConfig {
            millis_spent_limit: Some(millis),
            ..self.termination.unwrap_or_default()
        });
        self
    }

    /// Enables or disables static dominance pruning.
    pub fn with_dominance_pruning(mut self, enabled: bool) -> Self {
        self.pruning.dominance = enabled;
        self
    }

    /// Enables or disables every pruning technique at once.
    pub fn with_pruning(mut self, enabled: bool) -> Self {
        self.pruning = PruningConfig {
            dominance: enabled,
            incremental: enabled,
            bound: enabled,
        };
        self
    }

    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress.interval = interval;
        self
    }

    pub fn with_max_results(mut self, limit: usize) -> Self {
        self.max_results = Some(limit);
        self
    }

    /// Returns the termination time limit, if configured.
    pub fn time_limit(&self) -> Option<Duration> {
        self.termination.as_ref().and_then(|t| t.time_limit())
    }

    /// Checks every setting a search depends on.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for a zero result limit, and anything
    /// [`ranking_criteria`](Self::ranking_criteria) rejects.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_results == Some(0) {
            return Err(ConfigError::Invalid(
                "max_results must be at least 1".to_string(),
            ));
        }
        self.ranking_criteria().map(|_| ())
    }

    /// Parses the configured ranking criteria.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for unknown criteria or sort orders,
    /// and for a criterion listed twice.
    pub fn ranking_criteria(&self) -> Result<Vec<RankingCriterion>, ConfigError> {
        let mut parsed: Vec<RankingCriterion> = Vec::with_capacity(self.ranking.criteria.len());
        for raw in &self.ranking.criteria {
            let criterion: RankingCriterion = raw
                .parse()
                .map_err(|e: ArmoryError| ConfigError::Invalid(strip_prefix(&e)))?;
            if parsed.iter().any(|c| c.key == criterion.key) {
                return Err(ConfigError::Invalid(format!(
                    "ranking criterion '{}' listed more than once",
                    criterion.key
                )));
            }
            parsed.push(criterion);
        }
        Ok(parsed)
    }
}

fn strip_prefix(err: &ArmoryError) -> String {
    match err {
        ArmoryError::InvalidConfiguration(message) => message.clone(),
        other => other.to_string(),
    }
}

/// Ranking configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case", deny_unknown_fields)]
pub struct RankingConfig {
    /// Criteria as `name`, `name:asc` or `name:desc`, primary first.
    pub criteria: Vec<String>,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            criteria: RankingCriterion::defaults()
                .into_iter()
                .map(|c| c.key.name().to_string())
                .collect(),
        }
    }
}

/// Pruning switches. All enabled by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case", deny_unknown_fields)]
pub struct PruningConfig {
    /// Drop pieces dominated by another piece of the same category.
    pub dominance: bool,

    /// Re-check dominance per depth once some abilities are satisfied.
    pub incremental: bool,

    /// Cut branches that cannot reach every target.
    pub bound: bool,
}

impl Default for PruningConfig {
    fn default() -> Self {
        Self {
            dominance: true,
            incremental: true,
            bound: true,
        }
    }
}

/// Progress reporting configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case", deny_unknown_fields)]
pub struct ProgressConfig {
    /// Leaves evaluated between two progress events. Zero disables them.
    pub interval: u64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self { interval: 100_000 }
    }
}

/// Termination configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct TerminationConfig {
    /// Maximum seconds to spend searching.
    pub seconds_spent_limit: Option<u64>,

    /// Maximum milliseconds to spend searching (added to the seconds).
    pub millis_spent_limit: Option<u64>,
}

impl TerminationConfig {
    /// Returns the time limit as a Duration, if any.
    pub fn time_limit(&self) -> Option<Duration> {
        let millis =
            self.seconds_spent_limit.unwrap_or(0) * 1000 + self.millis_spent_limit.unwrap_or(0);
        if millis > 0 {
            Some(Duration::from_millis(millis))
        } else {
            None
        }
    }
}
