// SPDX-FileCopyrightText: 2026 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Entry-name indexing of jar-variant archives.
//!
//! Newly deployed jars (and wars, ears, zips) get an `indexed = false`
//! sentinel; a background sweep opens each marked archive and stores its
//! entry names as a searchable property plus one indexed row per entry.
//! Archive corruption is logged and skipped, never escalated - a bad file
//! must not abort a bulk re-index.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;
use tracing::{debug, warn};

use quarry_core::{layout, CancellationFlag, RepoPath};
use quarry_ids::{CounterStore, IdAllocator};
use quarry_store_db::{IndexDb, NodeKind, NodeQuery, PropertyKey};

#[derive(Error, Debug)]
pub enum Error {
    #[error("index access failed: {0}")]
    Store(#[from] quarry_store_db::Error),
    #[error("entry id allocation failed: {0}")]
    Ids(#[from] quarry_ids::Error),
    #[error("index lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Byte access to archive content, provided by the storage layer.
pub trait BlobStore {
    /// `None` when the blob is missing; read errors are the implementor's
    /// to log.
    fn open(&self, path: &RepoPath) -> Option<Vec<u8>>;
}

/// In-memory blob store for tests and tooling.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: HashMap<RepoPath, Vec<u8>>,
}

impl MemoryBlobStore {
    pub fn insert(&mut self, path: RepoPath, bytes: Vec<u8>) {
        self.blobs.insert(path, bytes);
    }
}

impl BlobStore for MemoryBlobStore {
    fn open(&self, path: &RepoPath) -> Option<Vec<u8>> {
        self.blobs.get(path).cloned()
    }
}

/// Outcome of one indexing sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub indexed: usize,
    pub failed: usize,
}

/// Marks and re-indexes jar-variant archive entry listings.
///
/// The index lock is taken per step, never across blob reads or id
/// allocation, so a long sweep interleaves with concurrent reads and
/// writes to the same tree.
pub struct ArchiveIndexer<'a, B, C: CounterStore> {
    db: &'a Mutex<IndexDb>,
    blobs: &'a B,
    ids: &'a IdAllocator<C>,
}

impl<'a, B: BlobStore, C: CounterStore> ArchiveIndexer<'a, B, C> {
    pub fn new(db: &'a Mutex<IndexDb>, blobs: &'a B, ids: &'a IdAllocator<C>) -> Self {
        Self { db, blobs, ids }
    }

    fn lock(&self) -> Result<MutexGuard<'a, IndexDb>> {
        self.db.lock().map_err(|_| Error::LockPoisoned)
    }

    /// Flag a jar-variant file for the next indexing sweep.
    ///
    /// Returns whether the file was marked. Non-archives are ignored, and
    /// an already-marked or already-indexed file is only re-marked with
    /// `force`.
    pub fn mark_for_indexing(&self, path: &RepoPath, force: bool) -> Result<bool> {
        let db = self.lock()?;
        let Some(node) = db.get_node(path)? else {
            return Ok(false);
        };
        if node.kind != NodeKind::File || !is_indexable_archive(&node.name) {
            return Ok(false);
        }
        if !force && db.get_property(node.id, PropertyKey::ArchiveIndexed)?.is_some() {
            return Ok(false);
        }
        db.set_property(node.id, PropertyKey::ArchiveIndexed, "false")?;
        Ok(true)
    }

    /// Index one archive's entry names.
    ///
    /// On success the entry names are stored space-concatenated, each entry
    /// gets an indexed row, and the sentinel flips to `true`. Any failure
    /// to open or read the archive leaves the prior indexed state.
    pub fn index(&self, path: &RepoPath) -> Result<bool> {
        let Some(node) = self.lock()?.get_node(path)? else {
            debug!("not indexing {path}: node is gone");
            return Ok(false);
        };
        let Some(bytes) = self.blobs.open(path) else {
            warn!("not indexing {path}: blob is missing");
            return Ok(false);
        };
        let entries = match read_entry_names(&bytes) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("not indexing {path}: unreadable archive: {e}");
                return Ok(false);
            }
        };
        let mut entry_ids = Vec::with_capacity(entries.len());
        for _ in &entries {
            entry_ids.push(self.ids.next_id()?);
        }

        let db = self.lock()?;
        // The node can vanish while the archive was read
        if db.get_node(path)?.is_none_or(|n| n.id != node.id) {
            debug!("not indexing {path}: node replaced during read");
            return Ok(false);
        }
        db.clear_archive_entries(node.id)?;
        for (entry_id, name) in entry_ids.into_iter().zip(&entries) {
            db.insert_archive_entry(entry_id, node.id, name)?;
        }
        db.set_property(node.id, PropertyKey::ArchiveEntryNames, &entries.join(" "))?;
        db.set_property(node.id, PropertyKey::ArchiveIndexed, "true")?;
        Ok(true)
    }

    /// Re-index every file still flagged `indexed = false`.
    ///
    /// Checks the cancellation flag between files; an interrupted sweep
    /// leaves the remainder flagged for the next run.
    pub fn sweep(&self, cancel: &CancellationFlag) -> Result<SweepStats> {
        let pending = self
            .lock()?
            .execute_query(&NodeQuery::files().property_value(PropertyKey::ArchiveIndexed, "false"))?;
        let mut stats = SweepStats::default();
        for (done, node) in pending.iter().enumerate() {
            if cancel.is_cancelled() {
                debug!("archive sweep cancelled, {} file(s) left", pending.len() - done);
                break;
            }
            if self.index(&node.repo_path)? {
                stats.indexed += 1;
            } else {
                stats.failed += 1;
            }
        }
        Ok(stats)
    }
}

/// Jar-variant check on a bare file name.
fn is_indexable_archive(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((_, extension)) => layout::is_jar_variant(extension),
        None => false,
    }
}

/// Names of all non-directory entries, in archive order.
fn read_entry_names(bytes: &[u8]) -> std::result::Result<Vec<String>, zip::result::ZipError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut names = Vec::new();
    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        names.push(entry.name().to_owned());
    }
    Ok(names)
}
