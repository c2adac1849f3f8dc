// SPDX-FileCopyrightText: 2026 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Build run identity and build-tree path parsing.
//!
//! Build runs are stored as three reserved segments directly under the
//! builds root: `<root>/<escapedName>/<escapedNumber>/<escapedStartedMillis>`.
//! Name and number are escaped with [`path_codec`](crate::path_codec) since
//! build tools produce names containing separators and numbers starting with
//! digits. Parsing happens once, here, into a structured [`BuildRun`];
//! nothing downstream re-splits paths.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::path_codec;
use crate::repo_path::RepoPath;

/// A single build execution.
///
/// Equality and hashing use the `(name, number)` pair only: two runs with
/// the same coordinates collapse to one regardless of node identity.
#[derive(Debug, Clone)]
pub struct BuildRun {
    pub name: String,
    pub number: String,
    /// Start time in unix milliseconds.
    pub started_ms: i64,
}

impl PartialEq for BuildRun {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.number == other.number
    }
}

impl Eq for BuildRun {}

impl Hash for BuildRun {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.number.hash(state);
    }
}

impl fmt::Display for BuildRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.number)
    }
}

/// The root of the build namespace and the path scheme beneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildsRoot {
    root: RepoPath,
}

impl BuildsRoot {
    pub fn new(root: RepoPath) -> Self {
        Self { root }
    }

    pub fn path(&self) -> &RepoPath {
        &self.root
    }

    /// Whether `path` falls inside the build namespace.
    pub fn contains(&self, path: &RepoPath) -> bool {
        path.is_under(&self.root)
    }

    /// Storage path for a run, with reserved characters escaped.
    pub fn run_path(&self, run: &BuildRun) -> RepoPath {
        self.root
            .child(&path_codec::escape(&run.name))
            .child(&path_codec::escape(&run.number))
            .child(&path_codec::escape(&run.started_ms.to_string()))
    }

    /// Recover a run from a node path under the builds root.
    ///
    /// Returns `None` when the path is outside the root, has fewer than the
    /// three reserved segments, or carries an unparseable start timestamp.
    pub fn parse_run(&self, path: &RepoPath) -> Option<BuildRun> {
        let segments = path.segments_under(&self.root)?;
        if segments.len() < 3 {
            return None;
        }
        let name = path_codec::unescape(segments[0]);
        let number = path_codec::unescape(segments[1]);
        let started_ms = path_codec::unescape(segments[2]).parse().ok()?;
        Some(BuildRun {
            name,
            number,
            started_ms,
        })
    }
}
