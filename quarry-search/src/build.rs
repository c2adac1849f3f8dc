// SPDX-FileCopyrightText: 2026 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Build run resolution by name and by checksum linkage.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use quarry_core::{BuildRun, BuildsRoot, Checksum, ChecksumAlgorithm};
use quarry_store_db::{IndexDb, NodeQuery, PropertyKey};

use crate::Result;

/// Read-only search over the build namespace.
pub struct BuildSearchEngine<'a> {
    db: &'a IndexDb,
    root: &'a BuildsRoot,
}

impl<'a> BuildSearchEngine<'a> {
    pub fn new(db: &'a IndexDb, root: &'a BuildsRoot) -> Self {
        Self { db, root }
    }

    /// The most recent run of every build name.
    ///
    /// Per name the run with the greatest start time wins; exact ties
    /// break toward the lexicographically greatest build number so the
    /// result is deterministic regardless of scan order.
    pub fn latest_builds_by_name(&self) -> Result<HashSet<BuildRun>> {
        let mut latest: HashMap<String, BuildRun> = HashMap::new();
        for name_node in self.db.list_children(self.root.path())? {
            for number_node in self.db.list_children(&name_node.repo_path)? {
                for run_node in self.db.list_children(&number_node.repo_path)? {
                    let Some(run) = self.root.parse_run(&run_node.repo_path) else {
                        warn!(
                            "skipping malformed build node {}",
                            run_node.repo_path
                        );
                        continue;
                    };
                    match latest.get(&run.name) {
                        Some(best)
                            if (best.started_ms, &best.number)
                                >= (run.started_ms, &run.number) => {}
                        _ => {
                            latest.insert(run.name.clone(), run);
                        }
                    }
                }
            }
        }
        Ok(latest.into_values().collect())
    }

    /// Builds that produced an artifact with one of the given checksums.
    pub fn find_by_artifact_checksum(&self, sha1: &str, md5: &str) -> Result<Vec<BuildRun>> {
        self.find_by_checksum(PropertyKey::BuildArtifactChecksums, sha1, md5)
    }

    /// Builds that consumed a dependency with one of the given checksums.
    pub fn find_by_dependency_checksum(&self, sha1: &str, md5: &str) -> Result<Vec<BuildRun>> {
        self.find_by_checksum(PropertyKey::BuildDependencyChecksums, sha1, md5)
    }

    /// The checksum property is an inverted index from checksum to owning
    /// build path, but it is not populated exclusively under the builds
    /// root. The query therefore runs unscoped and results are
    /// post-filtered to the build namespace.
    fn find_by_checksum(
        &self,
        key: PropertyKey,
        sha1: &str,
        md5: &str,
    ) -> Result<Vec<BuildRun>> {
        let mut terms = Vec::new();
        for (algorithm, digest) in [
            (ChecksumAlgorithm::Sha1, sha1),
            (ChecksumAlgorithm::Md5, md5),
        ] {
            if digest.trim().is_empty() {
                continue;
            }
            // The stored form is canonical, so a malformed digest cannot
            // match anything; drop it instead of querying
            match Checksum::new(algorithm, digest) {
                Ok(checksum) => terms.push(checksum.to_string()),
                Err(e) => debug!("ignoring checksum criterion: {e}"),
            }
        }
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = NodeQuery::any_kind();
        for term in &terms {
            query = query.property_value(key, term);
        }

        let mut runs = Vec::new();
        for record in self.db.execute_query(&query)? {
            if !self.root.contains(&record.repo_path) {
                continue;
            }
            match self.root.parse_run(&record.repo_path) {
                Some(run) => runs.push(run),
                None => {
                    warn!(
                        "skipping checksum hit {}: too few path segments for a build run",
                        record.repo_path
                    );
                }
            }
        }
        Ok(runs)
    }
}
