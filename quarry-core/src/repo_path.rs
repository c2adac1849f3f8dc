// SPDX-FileCopyrightText: 2026 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Repository tree node identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error constructing a [`RepoPath`].
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum RepoPathError {
    #[error("repository key must be a non-empty token, got '{0}'")]
    InvalidRepoKey(String),
}

/// Identifies a node in the repository tree.
///
/// The `path` component is repo-relative and never begins or ends with `/`;
/// the repository root is the empty path. Immutable value type; constructed
/// by parsing request paths or query result rows and discarded with the
/// request.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RepoPath {
    repo_key: String,
    path: String,
}

impl RepoPath {
    /// Create a path, normalizing leading/trailing/duplicate slashes.
    pub fn new(repo_key: &str, path: &str) -> Result<Self, RepoPathError> {
        if repo_key.is_empty() || repo_key.contains('/') || repo_key.contains(char::is_whitespace) {
            return Err(RepoPathError::InvalidRepoKey(repo_key.to_owned()));
        }
        let normalized: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        Ok(Self {
            repo_key: repo_key.to_owned(),
            path: normalized.join("/"),
        })
    }

    /// The root node of a repository.
    pub fn root(repo_key: &str) -> Result<Self, RepoPathError> {
        Self::new(repo_key, "")
    }

    pub fn repo_key(&self) -> &str {
        &self.repo_key
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// The final path segment, or the empty string at the root.
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or("")
    }

    /// The parent node; `None` at the repository root.
    pub fn parent(&self) -> Option<RepoPath> {
        if self.is_root() {
            return None;
        }
        let parent = match self.path.rfind('/') {
            Some(idx) => &self.path[..idx],
            None => "",
        };
        Some(Self {
            repo_key: self.repo_key.clone(),
            path: parent.to_owned(),
        })
    }

    /// Append a child segment.
    pub fn child(&self, name: &str) -> RepoPath {
        let name = name.trim_matches('/');
        let path = if self.path.is_empty() {
            name.to_owned()
        } else if name.is_empty() {
            self.path.clone()
        } else {
            format!("{}/{}", self.path, name)
        };
        Self {
            repo_key: self.repo_key.clone(),
            path,
        }
    }

    /// Path segments, root first. Empty at the repository root.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').filter(|s| !s.is_empty())
    }

    /// Whether this node lies under (or at) `ancestor`, in the same repo.
    pub fn is_under(&self, ancestor: &RepoPath) -> bool {
        if self.repo_key != ancestor.repo_key {
            return false;
        }
        if ancestor.is_root() {
            return true;
        }
        self.path == ancestor.path
            || self
                .path
                .strip_prefix(ancestor.path.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Path segments below `ancestor`, or `None` if this node is not under it.
    pub fn segments_under<'a>(&'a self, ancestor: &RepoPath) -> Option<Vec<&'a str>> {
        if !self.is_under(ancestor) {
            return None;
        }
        let rest = &self.path[ancestor.path.len()..];
        Some(rest.split('/').filter(|s| !s.is_empty()).collect())
    }
}

impl fmt::Display for RepoPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repo_key, self.path)
    }
}
