// SPDX-FileCopyrightText: 2026 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Database row types for the repository metadata index.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use quarry_core::RepoPath;

/// Whether a node row is a folder or a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Folder,
    File,
}

impl NodeKind {
    pub(crate) fn to_db(self) -> i64 {
        match self {
            NodeKind::Folder => 0,
            NodeKind::File => 1,
        }
    }

    pub(crate) fn from_db(value: i64) -> Option<Self> {
        match value {
            0 => Some(NodeKind::Folder),
            1 => Some(NodeKind::File),
            _ => None,
        }
    }
}

/// One row of the Nodes table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    /// Database row ID
    pub id: i64,
    /// Tree position
    pub repo_path: RepoPath,
    /// Final path segment (duplicated for indexed name search)
    pub name: String,
    pub kind: NodeKind,
    /// Last modification time (unix seconds granularity)
    pub modified: SystemTime,
}

impl NodeRecord {
    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }
}

/// The closed set of node property keys.
///
/// Properties are looked up by typed key, never by free-form string: an
/// unknown key maps to "absent" instead of failing or silently creating a
/// new dynamic attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    /// Name of the most recent build that produced this artifact.
    LatestBuild,
    /// Prefixed checksums of build artifacts that touched this node.
    BuildArtifactChecksums,
    /// Prefixed checksums of build dependencies that touched this node.
    BuildDependencyChecksums,
    /// Archive indexing sentinel: "false" marks a pending entry sweep.
    ArchiveIndexed,
    /// Space-separated archive entry names for content search.
    ArchiveEntryNames,
}

impl PropertyKey {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PropertyKey::LatestBuild => "build.latest",
            PropertyKey::BuildArtifactChecksums => "build.artifact.checksums",
            PropertyKey::BuildDependencyChecksums => "build.dependency.checksums",
            PropertyKey::ArchiveIndexed => "archive.indexed",
            PropertyKey::ArchiveEntryNames => "archive.entries",
        }
    }

    /// Fails closed: unknown keys are `None`, never an error.
    pub fn from_key_str(key: &str) -> Option<Self> {
        match key {
            "build.latest" => Some(PropertyKey::LatestBuild),
            "build.artifact.checksums" => Some(PropertyKey::BuildArtifactChecksums),
            "build.dependency.checksums" => Some(PropertyKey::BuildDependencyChecksums),
            "archive.indexed" => Some(PropertyKey::ArchiveIndexed),
            "archive.entries" => Some(PropertyKey::ArchiveEntryNames),
            _ => None,
        }
    }
}

/// One row of the ArchiveEntries table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntryRecord {
    /// Allocator-minted row ID
    pub id: i64,
    /// Owning node row ID
    pub node_id: i64,
    /// Entry name inside the archive
    pub name: String,
}

/// Convert Unix timestamp to SystemTime.
pub(crate) fn unix_to_system_time(timestamp: i64) -> SystemTime {
    if timestamp >= 0 {
        UNIX_EPOCH + Duration::from_secs(timestamp as u64)
    } else {
        UNIX_EPOCH - Duration::from_secs((-timestamp) as u64)
    }
}

/// Convert SystemTime to Unix timestamp.
pub(crate) fn system_time_to_unix(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(duration) => duration.as_secs() as i64,
        Err(e) => -(e.duration().as_secs() as i64),
    }
}
