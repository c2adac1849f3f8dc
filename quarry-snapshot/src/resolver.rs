// SPDX-FileCopyrightText: 2026 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Latest-unique-snapshot resolution.

use tracing::debug;

use quarry_core::{
    layout::{self, MAVEN_METADATA_NAME},
    MavenVersion, ModuleCoordinates, RepoKind, RepoPath, RepoRegistry, SnapshotPolicy,
};
use quarry_store_db::{IndexDb, NodeKind, NodeRecord};

use crate::Result;

/// Rewrites non-unique snapshot requests to the latest deployed unique
/// snapshot.
///
/// Resolution is per call; nothing is cached or persisted. When nothing
/// resolves the original request is returned unchanged and falls through
/// to normal not-found handling upstream.
pub struct SnapshotVersionResolver<'a> {
    db: &'a IndexDb,
    registry: &'a RepoRegistry,
}

impl<'a> SnapshotVersionResolver<'a> {
    pub fn new(db: &'a IndexDb, registry: &'a RepoRegistry) -> Self {
        Self { db, registry }
    }

    /// Resolve a snapshot artifact or metadata request.
    pub fn resolve(&self, request: &RepoPath) -> Result<RepoPath> {
        let Some(repo) = self.registry.get(request.repo_key()) else {
            return Ok(request.clone());
        };
        if repo.kind != RepoKind::Local || repo.snapshot_policy == SnapshotPolicy::NonUnique {
            return Ok(request.clone());
        }

        // A `<artifact>.maven-metadata.xml` request resolves the artifact
        // part; the suffix is re-applied to the resolved name.
        let metadata_suffix = format!(".{MAVEN_METADATA_NAME}");
        let (artifact_name, is_metadata) = match request.name().strip_suffix(&metadata_suffix) {
            Some(stripped) if !stripped.is_empty() => (stripped.to_owned(), true),
            _ => (request.name().to_owned(), false),
        };
        let Some(parent) = request.parent() else {
            return Ok(request.clone());
        };
        let artifact_path = parent.child(&artifact_name);
        let Some(requested) = ModuleCoordinates::parse(&artifact_path) else {
            return Ok(request.clone());
        };

        let candidates = self.candidates(&parent, &requested)?;
        let winner = match repo.snapshot_policy {
            SnapshotPolicy::Deployer => pick_latest_modified(candidates),
            _ => pick_greatest_version(candidates),
        };
        match winner {
            Some(resolved) => {
                let name = if is_metadata {
                    format!("{}{metadata_suffix}", resolved.name)
                } else {
                    resolved.name
                };
                let resolved_path = parent.child(&name);
                debug!("resolved {request} to {resolved_path}");
                Ok(resolved_path)
            }
            None => Ok(request.clone()),
        }
    }

    /// Sibling files of the request that are the same module, excluding
    /// sidecars and metadata. An absent parent yields no candidates.
    fn candidates(
        &self,
        parent: &RepoPath,
        requested: &ModuleCoordinates,
    ) -> Result<Vec<(NodeRecord, ModuleCoordinates)>> {
        let mut matching = Vec::new();
        for child in self.db.list_children(parent)? {
            if child.kind != NodeKind::File
                || layout::is_checksum_sidecar(&child.name)
                || layout::is_maven_metadata(&child.name)
            {
                continue;
            }
            let Some(coords) = ModuleCoordinates::parse(&child.repo_path) else {
                continue;
            };
            if coords.same_module_as(requested) {
                matching.push((child, coords));
            }
        }
        Ok(matching)
    }
}

/// DEPLOYER policy: greatest last-modified wins. On an exact timestamp tie
/// the last candidate in the store's name-ascending child order wins,
/// which is implementation-defined but deterministic for a single process.
fn pick_latest_modified(candidates: Vec<(NodeRecord, ModuleCoordinates)>) -> Option<NodeRecord> {
    let mut best: Option<NodeRecord> = None;
    for (candidate, _) in candidates {
        match &best {
            Some(current) if current.modified > candidate.modified => {}
            _ => best = Some(candidate),
        }
    }
    best
}

/// Version-ordering policy: candidates must carry a concrete file
/// integration revision; the greatest `{base}-{integration}` under the
/// Maven-aware comparator wins, regardless of scan order.
fn pick_greatest_version(candidates: Vec<(NodeRecord, ModuleCoordinates)>) -> Option<NodeRecord> {
    let mut best: Option<(MavenVersion, NodeRecord)> = None;
    for (candidate, coords) in candidates {
        let Some(revision) = &coords.file_integration_revision else {
            continue;
        };
        let version = MavenVersion::parse(&format!("{}-{revision}", coords.base_revision));
        match &best {
            Some((current, _)) if *current >= version => {}
            _ => best = Some((version, candidate)),
        }
    }
    best.map(|(_, record)| record)
}
