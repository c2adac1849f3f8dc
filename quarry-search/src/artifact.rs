// SPDX-FileCopyrightText: 2026 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Free-text and coordinate search over the artifact tree.

use std::time::SystemTime;

use tracing::{debug, warn};

use quarry_core::{ModuleCoordinates, RepoPath, RepoRegistry, layout};
use quarry_store_db::{IndexDb, LikePattern, NodeQuery, NodeRecord, PropertyKey, ResultOrder};

use crate::access::AccessPolicy;
use crate::gavc::GavcCriteria;
use crate::Result;

/// Engine-level search configuration.
///
/// The result order is the index's declared order; the engine never
/// re-sorts on top of it. Both orderings appear in deployments, so this is
/// configuration, not a constant.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchConfig {
    pub order: ResultOrder,
}

/// One accepted search hit.
#[derive(Debug, Clone)]
pub struct ArtifactMatch {
    pub path: RepoPath,
    pub coordinates: ModuleCoordinates,
    pub modified: SystemTime,
    /// Set when the expected `latest build` property is missing. Bereaved
    /// records are returned, not hidden; the flag is for operator
    /// attention.
    pub bereaved: bool,
}

/// Search outcome in encounter order.
#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    pub matches: Vec<ArtifactMatch>,
    /// Whether at least one further match exists past the result cap.
    pub truncated: bool,
}

/// Read-only artifact search over the indexed tree.
pub struct ArtifactSearchEngine<'a, P> {
    db: &'a IndexDb,
    registry: &'a RepoRegistry,
    policy: &'a P,
    config: SearchConfig,
}

impl<'a, P: AccessPolicy> ArtifactSearchEngine<'a, P> {
    pub fn new(
        db: &'a IndexDb,
        registry: &'a RepoRegistry,
        policy: &'a P,
        config: SearchConfig,
    ) -> Self {
        Self {
            db,
            registry,
            policy,
            config,
        }
    }

    /// Case-insensitive substring search over artifact names.
    ///
    /// `max_results` is a soft cap: scanning stops once that many matches
    /// were accepted, with one-past-limit peeking to flag truncation.
    pub fn search_by_name(&self, term: &str, max_results: usize) -> Result<SearchResult> {
        let query = NodeQuery::files()
            .name_like(LikePattern::contains(term.trim()))
            .order(self.config.order);
        self.collect(query, max_results)
    }

    /// GAVC coordinate search. Blank fields are full wildcards.
    pub fn search_by_coordinates(
        &self,
        criteria: &GavcCriteria,
        max_results: usize,
    ) -> Result<SearchResult> {
        let mut query = NodeQuery::files().order(self.config.order);
        if let Some(pattern) = criteria.group_path_pattern() {
            query = query.path_like(pattern);
        }
        if let Some(pattern) = criteria.file_name_pattern() {
            query = query.name_like(pattern);
        }
        if let Some(pattern) = criteria.classifier_pattern() {
            query = query.name_like(pattern);
        }
        self.collect(query, max_results)
    }

    /// Streamed candidate scan. Rows stop being read at the first
    /// accepted match past the cap, which only flags truncation.
    fn collect(&self, query: NodeQuery, max_results: usize) -> Result<SearchResult> {
        let mut result = SearchResult::default();
        self.db.execute_query_streamed::<crate::Error, _>(&query, |record| {
            let Some(found) = self.accept(&record)? else {
                return Ok(true);
            };
            if result.matches.len() >= max_results {
                result.truncated = true;
                return Ok(false);
            }
            result.matches.push(found);
            Ok(true)
        })?;
        Ok(result)
    }

    /// The per-candidate filter chain. `None` means the row is skipped;
    /// only denied access and sidecars are silent, the rest log why.
    fn accept(&self, record: &NodeRecord) -> Result<Option<ArtifactMatch>> {
        let path = &record.repo_path;
        match self.registry.get(path.repo_key()) {
            None => {
                debug!("skipping stale index entry {path}: repository not configured");
                return Ok(None);
            }
            Some(repo) if !repo.holds_artifacts() => {
                debug!("skipping {path}: repository holds no artifacts");
                return Ok(None);
            }
            Some(_) => {}
        }
        if layout::is_checksum_sidecar(&record.name) {
            return Ok(None);
        }
        if !self.policy.can_read(path) {
            return Ok(None);
        }
        let Some(coordinates) = ModuleCoordinates::parse(path) else {
            debug!("skipping {path}: no parseable module coordinates");
            return Ok(None);
        };
        let bereaved = self.db.get_property(record.id, PropertyKey::LatestBuild)?.is_none();
        if bereaved {
            warn!("bereaved record {path}: latest-build property missing");
        }
        Ok(Some(ArtifactMatch {
            path: path.clone(),
            coordinates,
            modified: record.modified,
            bereaved,
        }))
    }
}
