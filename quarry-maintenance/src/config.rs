// SPDX-FileCopyrightText: 2026 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! TOML configuration with load-time validation.

use std::fs::read_to_string;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use quarry_core::{RepoDescriptor, RepoRegistry};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {reason}")]
    Invalid { reason: String },
}

fn default_id_step() -> i64 {
    2000
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_builds_repo() -> String {
    "build-info".into()
}

fn default_builds_path() -> String {
    "builds".into()
}

fn default_max_search_results() -> usize {
    500
}

/// Result ordering of artifact searches.
///
/// Name-ascending gives stable listings; index order returns the store's
/// insertion order. Both appear in deployments, so the choice is a
/// configuration key.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SearchOrder {
    #[default]
    NameAscending,
    IndexOrder,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub repositories: Vec<RepoDescriptor>,

    /// Batch size of the unique-id allocator.
    #[serde(default = "default_id_step")]
    pub id_step: i64,

    /// Seconds between background maintenance ticks.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Repository and path of the build namespace.
    #[serde(default = "default_builds_repo")]
    pub builds_repo: String,
    #[serde(default = "default_builds_path")]
    pub builds_path: String,

    /// Default result cap for searches.
    #[serde(default = "default_max_search_results")]
    pub max_search_results: usize,

    /// Result ordering of artifact searches.
    #[serde(default)]
    pub search_order: SearchOrder,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repositories: Vec::new(),
            id_step: default_id_step(),
            sweep_interval_secs: default_sweep_interval_secs(),
            builds_repo: default_builds_repo(),
            builds_path: default_builds_path(),
            max_search_results: default_max_search_results(),
            search_order: SearchOrder::default(),
        }
    }
}

impl Config {
    pub fn load(settings_file: &Path) -> Result<Config, ConfigError> {
        let contents = read_to_string(settings_file).map_err(|e| ConfigError::ReadFile {
            path: settings_file.display().to_string(),
            source: e,
        })?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would misbehave at runtime. Fatal at
    /// initialization, never retried.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.id_step <= 0 {
            return Err(ConfigError::Invalid {
                reason: format!("id_step must be greater than 0, got {}", self.id_step),
            });
        }
        if self.sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                reason: "sweep_interval_secs must be greater than 0".into(),
            });
        }
        if self.max_search_results == 0 {
            return Err(ConfigError::Invalid {
                reason: "max_search_results must be greater than 0".into(),
            });
        }
        if self.builds_repo.trim().is_empty() {
            return Err(ConfigError::Invalid {
                reason: "builds_repo must not be empty".into(),
            });
        }
        let mut seen = std::collections::BTreeSet::new();
        for repo in &self.repositories {
            if repo.key.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    reason: "repository key must not be empty".into(),
                });
            }
            if !seen.insert(&repo.key) {
                return Err(ConfigError::Invalid {
                    reason: format!("duplicate repository key '{}'", repo.key),
                });
            }
        }
        Ok(())
    }

    pub fn registry(&self) -> RepoRegistry {
        RepoRegistry::new(self.repositories.iter().cloned())
    }
}
