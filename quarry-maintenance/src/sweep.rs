// SPDX-FileCopyrightText: 2026 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Scheduled background maintenance.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{debug, error};

use quarry_archive::{ArchiveIndexer, BlobStore, SweepStats};
use quarry_core::{CancellationFlag, RepoPath, RepoRegistry};
use quarry_ids::{CounterStore, IdAllocator};
use quarry_snapshot::{CleanupStats, IntegrationCleaner};
use quarry_store_db::IndexDb;

use crate::{Error, Result};

/// Outcome of one maintenance tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    pub cleaned_modules: usize,
    pub cleanup: CleanupStats,
    pub archive: SweepStats,
}

/// Background sweep driver.
///
/// Artifact-creation notifications queue module cleanups; each tick drains
/// the queue through the [`IntegrationCleaner`] and then re-indexes marked
/// archives. Both sweeps check the shared cancellation flag at item
/// boundaries; whatever an interrupted tick leaves behind is picked up by
/// the next one.
pub struct Sweeper<B, C: CounterStore> {
    db: Arc<Mutex<IndexDb>>,
    registry: Arc<RepoRegistry>,
    blobs: Arc<B>,
    ids: Arc<IdAllocator<C>>,
    interval: Duration,
    cancel: CancellationFlag,
    queue: Mutex<VecDeque<RepoPath>>,
}

impl<B: BlobStore, C: CounterStore> Sweeper<B, C> {
    pub fn new(
        db: Arc<Mutex<IndexDb>>,
        registry: Arc<RepoRegistry>,
        blobs: Arc<B>,
        ids: Arc<IdAllocator<C>>,
        interval: Duration,
    ) -> Self {
        Self {
            db,
            registry,
            blobs,
            ids,
            interval,
            cancel: CancellationFlag::new(),
            queue: Mutex::new(VecDeque::new()),
        }
    }

    /// Shared handle to stop running sweeps and the scheduler loop.
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    /// Queue the module of a newly created artifact for cleanup.
    pub fn notify_artifact_created(&self, path: RepoPath) {
        match self.queue.lock() {
            Ok(mut queue) => queue.push_back(path),
            Err(_) => error!("cleanup queue lock poisoned, dropping {path}"),
        }
    }

    /// Run scheduled ticks until cancelled.
    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first interval tick fires immediately; skip it so a freshly
        // started service sweeps after one full interval.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if self.cancel.is_cancelled() {
                debug!("maintenance scheduler stopped");
                return;
            }
            match self.tick() {
                Ok(stats) => debug!("maintenance tick done: {stats:?}"),
                Err(e) => error!("maintenance tick failed: {e}"),
            }
        }
    }

    /// One maintenance pass: drain queued cleanups, then sweep archives.
    pub fn tick(&self) -> Result<TickStats> {
        let pending: Vec<RepoPath> = {
            let mut queue = self.queue.lock().map_err(|_| Error::LockPoisoned)?;
            queue.drain(..).collect()
        };

        let mut stats = TickStats::default();
        {
            let db = self.db.lock().map_err(|_| Error::LockPoisoned)?;
            let cleaner = IntegrationCleaner::new(&db, &self.registry);
            for artifact in pending {
                if self.cancel.is_cancelled() {
                    break;
                }
                match cleaner.clean_for_artifact(&artifact, &self.cancel) {
                    Ok(cleaned) => {
                        stats.cleaned_modules += 1;
                        stats.cleanup += cleaned;
                    }
                    // One bad module must not block cleanup of the rest
                    Err(e) => error!("cleanup after {artifact} failed: {e}"),
                }
            }
        }

        // The indexer locks the index per step, around blob reads
        let indexer = ArchiveIndexer::new(&self.db, &*self.blobs, &self.ids);
        stats.archive = indexer.sweep(&self.cancel)?;
        Ok(stats)
    }
}
