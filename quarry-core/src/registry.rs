// SPDX-FileCopyrightText: 2026 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Repository descriptors and the explicitly-scoped registry.
//!
//! The registry is an ordinary owned value constructed from configuration
//! and injected into whichever service needs it - there is no static
//! accessor. Index rows can outlive repository configuration, so lookups
//! return `Option` and callers skip stale entries.

use std::collections::BTreeMap;

use serde::Deserialize;

/// How a repository stores artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoKind {
    /// Deployed-to repository, physically local.
    Local,
    /// Local cache of a remote repository.
    Cache,
    /// Aggregation over other repositories; holds no artifacts itself.
    Virtual,
}

/// Configured snapshot-naming behavior of a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotPolicy {
    /// Keep the literal `-SNAPSHOT` name; requests are never rewritten.
    NonUnique,
    /// Rewrite to unique timestamped names; latest by version ordering.
    #[default]
    Unique,
    /// Keep whatever the deployer sent; latest by last-modified time.
    Deployer,
}

/// Static configuration of one repository.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepoDescriptor {
    pub key: String,
    pub kind: RepoKind,
    #[serde(default)]
    pub snapshot_policy: SnapshotPolicy,
    /// Retained unique snapshot groups per module; 0 disables cleanup.
    #[serde(default)]
    pub max_unique_snapshots: u32,
}

impl RepoDescriptor {
    /// Whether artifacts of this repository exist in the local tree.
    pub fn holds_artifacts(&self) -> bool {
        matches!(self.kind, RepoKind::Local | RepoKind::Cache)
    }
}

/// Lookup table of configured repositories.
#[derive(Debug, Clone, Default)]
pub struct RepoRegistry {
    repos: BTreeMap<String, RepoDescriptor>,
}

impl RepoRegistry {
    pub fn new(descriptors: impl IntoIterator<Item = RepoDescriptor>) -> Self {
        Self {
            repos: descriptors
                .into_iter()
                .map(|d| (d.key.clone(), d))
                .collect(),
        }
    }

    /// `None` for repositories that are no longer configured.
    pub fn get(&self, repo_key: &str) -> Option<&RepoDescriptor> {
        self.repos.get(repo_key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RepoDescriptor> {
        self.repos.values()
    }
}
