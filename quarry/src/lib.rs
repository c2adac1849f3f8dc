// SPDX-FileCopyrightText: 2026 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Facade over the artifact index.
//!
//! [`RepositoryService`] wires the repository registry, the SQLite node
//! index, the unique-id allocator and the search, snapshot and cleanup
//! engines behind one surface. Outer layers (transport, UI glue) talk to
//! this crate only; the engine crates stay internal.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;

use quarry_core::{BuildsRoot, RepoRegistry};
use quarry_ids::IdAllocator;
use quarry_search::{ArtifactSearchEngine, BuildSearchEngine, SearchConfig};
use quarry_snapshot::{IntegrationCleaner, SnapshotVersionResolver};
use quarry_store_db::{IndexDb, ResultOrder};

pub use quarry_core::{BuildRun, CancellationFlag, RepoPath};
pub use quarry_maintenance::{Config, ConfigError, SearchOrder};
pub use quarry_search::{AccessPolicy, AllowAll, ArtifactMatch, GavcCriteria, SearchResult};
pub use quarry_snapshot::CleanupStats;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] quarry_store_db::Error),
    #[error(transparent)]
    Search(#[from] quarry_search::Error),
    #[error(transparent)]
    Snapshot(#[from] quarry_snapshot::Error),
    #[error(transparent)]
    Ids(#[from] quarry_ids::Error),
    #[error("invalid builds root: {0}")]
    BuildsRoot(#[from] quarry_core::RepoPathError),
    #[error("index lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, Error>;

/// The service surface of the artifact index.
///
/// Holds the index behind a mutex shared with the background sweeper;
/// every operation locks it for its own duration, so calls from
/// concurrent request handlers serialize at the index.
pub struct RepositoryService<P = AllowAll> {
    db: Arc<Mutex<IndexDb>>,
    registry: RepoRegistry,
    builds: BuildsRoot,
    ids: IdAllocator<Arc<Mutex<IndexDb>>>,
    policy: P,
    max_results: usize,
    search: SearchConfig,
}

impl RepositoryService<AllowAll> {
    /// Service without access control; every indexed path is readable.
    pub fn new(config: &Config, db: Arc<Mutex<IndexDb>>) -> Result<Self> {
        Self::with_policy(config, db, AllowAll)
    }
}

impl<P: AccessPolicy> RepositoryService<P> {
    pub fn with_policy(config: &Config, db: Arc<Mutex<IndexDb>>, policy: P) -> Result<Self> {
        let builds = BuildsRoot::new(RepoPath::new(&config.builds_repo, &config.builds_path)?);
        let ids = IdAllocator::new(db.clone(), config.id_step)?;
        let search = SearchConfig {
            order: match config.search_order {
                SearchOrder::NameAscending => ResultOrder::NameAscending,
                SearchOrder::IndexOrder => ResultOrder::IndexOrder,
            },
        };
        Ok(Self {
            db,
            registry: config.registry(),
            builds,
            ids,
            policy,
            max_results: config.max_search_results,
            search,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, IndexDb>> {
        self.db.lock().map_err(|_| Error::LockPoisoned)
    }

    /// Case-insensitive substring search over artifact file names.
    ///
    /// The caller's limit is clamped to the configured maximum.
    pub fn search_artifacts_by_name(&self, term: &str, limit: usize) -> Result<SearchResult> {
        let db = self.lock()?;
        let engine = ArtifactSearchEngine::new(&db, &self.registry, &self.policy, self.search);
        Ok(engine.search_by_name(term, limit.min(self.max_results))?)
    }

    /// GAVC coordinate search; blank criteria fields are full wildcards.
    pub fn search_artifacts_by_coordinates(&self, criteria: &GavcCriteria) -> Result<SearchResult> {
        let db = self.lock()?;
        let engine = ArtifactSearchEngine::new(&db, &self.registry, &self.policy, self.search);
        Ok(engine.search_by_coordinates(criteria, self.max_results)?)
    }

    /// The most recent run of every build name.
    pub fn latest_builds_by_name(&self) -> Result<HashSet<BuildRun>> {
        let db = self.lock()?;
        Ok(BuildSearchEngine::new(&db, &self.builds).latest_builds_by_name()?)
    }

    /// Builds that produced an artifact with one of the given checksums.
    pub fn find_builds_by_artifact_checksum(&self, sha1: &str, md5: &str) -> Result<Vec<BuildRun>> {
        let db = self.lock()?;
        Ok(BuildSearchEngine::new(&db, &self.builds).find_by_artifact_checksum(sha1, md5)?)
    }

    /// Builds that consumed a dependency with one of the given checksums.
    pub fn find_builds_by_dependency_checksum(
        &self,
        sha1: &str,
        md5: &str,
    ) -> Result<Vec<BuildRun>> {
        let db = self.lock()?;
        Ok(BuildSearchEngine::new(&db, &self.builds).find_by_dependency_checksum(sha1, md5)?)
    }

    /// Rewrite a `-SNAPSHOT` request to the latest deployed unique
    /// snapshot. Requests that do not resolve come back unchanged.
    pub fn resolve_snapshot_request(&self, request: &RepoPath) -> Result<RepoPath> {
        let db = self.lock()?;
        Ok(SnapshotVersionResolver::new(&db, &self.registry).resolve(request)?)
    }

    /// Evict old integration deployments across a repository, down to its
    /// retention limit per module.
    pub fn run_integration_cleanup(
        &self,
        repo_key: &str,
        cancel: &CancellationFlag,
    ) -> Result<CleanupStats> {
        let db = self.lock()?;
        Ok(IntegrationCleaner::new(&db, &self.registry).clean_repository(repo_key, cancel)?)
    }

    /// Next unique id from the batched allocator.
    pub fn next_id(&self) -> Result<i64> {
        Ok(self.ids.next_id()?)
    }

    pub fn registry(&self) -> &RepoRegistry {
        &self.registry
    }
}
