// SPDX-FileCopyrightText: 2026 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Retention of unique snapshot groups per module.

use std::collections::{BTreeMap, BTreeSet};
use std::time::SystemTime;

use tracing::{debug, error};

use quarry_core::{
    layout::{self, SNAPSHOT},
    CancellationFlag, ModuleCoordinates, RepoKind, RepoPath, RepoRegistry, UniqueRevision,
};
use quarry_store_db::{IndexDb, NodeKind, NodeQuery};

use crate::Result;

/// Ordering key of one snapshot group.
///
/// Deployments with a parseable unique revision group and order by it;
/// non-conforming files fall back to their modified time and sort below
/// every revision-keyed group, so legacy stragglers are evicted first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum GroupKey {
    Modified(SystemTime),
    Revision(UniqueRevision),
}

/// Outcome of one cleanup pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupStats {
    pub evicted_groups: usize,
    pub deleted_items: usize,
    pub deleted_folders: usize,
}

impl std::ops::AddAssign for CleanupStats {
    fn add_assign(&mut self, other: Self) {
        self.evicted_groups += other.evicted_groups;
        self.deleted_items += other.deleted_items;
        self.deleted_folders += other.deleted_folders;
    }
}

/// Enforces `max_unique_snapshots` after artifact creation.
///
/// Deletions are immediate and non-transactional per item; one failed
/// deletion is logged and never aborts the rest of the sweep.
pub struct IntegrationCleaner<'a> {
    db: &'a IndexDb,
    registry: &'a RepoRegistry,
}

impl<'a> IntegrationCleaner<'a> {
    pub fn new(db: &'a IndexDb, registry: &'a RepoRegistry) -> Self {
        Self { db, registry }
    }

    /// Clean the module a newly created artifact belongs to.
    ///
    /// No-op for non-local repositories, repositories without a retention
    /// limit, and paths without parseable coordinates.
    pub fn clean_for_artifact(
        &self,
        artifact: &RepoPath,
        cancel: &CancellationFlag,
    ) -> Result<CleanupStats> {
        let Some(repo) = self.registry.get(artifact.repo_key()) else {
            return Ok(CleanupStats::default());
        };
        if repo.kind != RepoKind::Local || repo.max_unique_snapshots == 0 {
            return Ok(CleanupStats::default());
        }
        let Some(coords) = ModuleCoordinates::parse(artifact) else {
            debug!("skipping cleanup for {artifact}: no parseable module coordinates");
            return Ok(CleanupStats::default());
        };

        let (mut groups, mut group_folders) = self.collect_groups(artifact.repo_key(), &coords)?;
        let max = repo.max_unique_snapshots as usize;
        let mut stats = CleanupStats::default();

        while groups.len() > max {
            if cancel.is_cancelled() {
                debug!(
                    "cleanup of {} cancelled with {} groups remaining",
                    coords.module_folder_path(),
                    groups.len()
                );
                break;
            }
            let Some((key, items)) = groups.pop_first() else {
                break;
            };
            stats.evicted_groups += 1;

            let mut folders: BTreeSet<RepoPath> = BTreeSet::new();
            for item in items {
                if let Some(parent) = item.parent() {
                    folders.insert(parent);
                }
                match self.db.delete_node(&item) {
                    Ok(rows) if rows > 0 => stats.deleted_items += 1,
                    // Already gone, a concurrent deletion won the race
                    Ok(_) => {}
                    Err(e) => error!("failed to delete {item}: {e}"),
                }
            }
            if let Some(folder) = group_folders.remove(&key) {
                folders.insert(folder);
            }
            for folder in folders {
                if let Err(e) = self.remove_folder_if_fileless(&folder, &coords, &mut stats) {
                    error!("failed to remove integration folder {folder}: {e}");
                }
            }
        }
        Ok(stats)
    }

    /// Clean every integration module of a repository.
    ///
    /// The externally triggerable counterpart of the per-artifact hook:
    /// scans the repository's files once, finds each module with
    /// integration deployments, and runs one cleanup per module.
    pub fn clean_repository(
        &self,
        repo_key: &str,
        cancel: &CancellationFlag,
    ) -> Result<CleanupStats> {
        let Some(repo) = self.registry.get(repo_key) else {
            return Ok(CleanupStats::default());
        };
        if repo.kind != RepoKind::Local || repo.max_unique_snapshots == 0 {
            return Ok(CleanupStats::default());
        }

        let files = self.db.execute_query(&NodeQuery::files().in_repo(repo_key))?;
        let mut seen_modules: BTreeSet<String> = BTreeSet::new();
        let mut stats = CleanupStats::default();
        for file in files {
            if cancel.is_cancelled() {
                debug!("repository cleanup of {repo_key} cancelled");
                break;
            }
            let Some(coords) = ModuleCoordinates::parse(&file.repo_path) else {
                continue;
            };
            if coords.folder_integration_revision.is_none()
                && coords.file_integration_revision.is_none()
            {
                continue;
            }
            if !seen_modules.insert(coords.module_folder_path()) {
                continue;
            }
            stats += self.clean_for_artifact(&file.repo_path, cancel)?;
        }
        Ok(stats)
    }

    /// Snapshot groups of the module, oldest first.
    ///
    /// Covers both layouts: unique-named files inside a `-SNAPSHOT` version
    /// folder (grouped by their file revision) and one version folder per
    /// deployment (grouped by the folder's revision).
    fn collect_groups(
        &self,
        repo_key: &str,
        coords: &ModuleCoordinates,
    ) -> Result<(BTreeMap<GroupKey, Vec<RepoPath>>, BTreeMap<GroupKey, RepoPath>)> {
        let module_folder = RepoPath::new(repo_key, &coords.module_folder_path())?;
        let mut groups: BTreeMap<GroupKey, Vec<RepoPath>> = BTreeMap::new();
        let mut group_folders: BTreeMap<GroupKey, RepoPath> = BTreeMap::new();

        for folder in self.db.list_children(&module_folder)? {
            if folder.kind != NodeKind::Folder {
                continue;
            }
            let (base, integration) = layout::split_version_folder(&folder.name);
            if base != coords.base_revision {
                continue;
            }
            match integration.as_deref() {
                None => {}
                Some(SNAPSHOT) => {
                    for file in self.db.list_children(&folder.repo_path)? {
                        if file.kind != NodeKind::File || is_module_metadata(&file.name) {
                            continue;
                        }
                        let key = ModuleCoordinates::parse(&file.repo_path)
                            .and_then(|c| c.file_integration_revision)
                            .map_or(GroupKey::Modified(file.modified), GroupKey::Revision);
                        groups.entry(key).or_default().push(file.repo_path);
                    }
                }
                Some(other) => {
                    let Some(revision) = UniqueRevision::parse(other) else {
                        continue;
                    };
                    let key = GroupKey::Revision(revision);
                    for file in self.db.list_children(&folder.repo_path)? {
                        if file.kind != NodeKind::File || is_module_metadata(&file.name) {
                            continue;
                        }
                        groups.entry(key.clone()).or_default().push(file.repo_path);
                    }
                    group_folders.insert(key, folder.repo_path);
                }
            }
        }
        Ok((groups, group_folders))
    }

    /// Delete an integration folder once no descendant file remains.
    ///
    /// Folders holding any file, at any depth, are never deleted here.
    fn remove_folder_if_fileless(
        &self,
        folder: &RepoPath,
        coords: &ModuleCoordinates,
        stats: &mut CleanupStats,
    ) -> Result<()> {
        let (base, integration) = layout::split_version_folder(folder.name());
        if integration.is_none() || base != coords.base_revision {
            return Ok(());
        }
        if self.db.get_node(folder)?.is_none() || self.db.has_descendant_files(folder)? {
            return Ok(());
        }
        if self.db.delete_node(folder)? > 0 {
            stats.deleted_folders += 1;
            debug!("removed empty integration folder {folder}");
        }
        Ok(())
    }
}

/// Module-level `maven-metadata.xml` (or one of its sidecars), which is
/// regenerated and never part of a snapshot group. Artifact-attached
/// metadata still groups with its artifact.
fn is_module_metadata(name: &str) -> bool {
    layout::strip_sidecar_suffixes(name) == layout::MAVEN_METADATA_NAME
}
