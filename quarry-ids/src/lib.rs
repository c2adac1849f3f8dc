// SPDX-FileCopyrightText: 2026 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Batched unique-id allocation over a persisted counter row.
//!
//! Components that mint persistent row identifiers (builds, archive
//! entries) share one process-wide [`IdAllocator`]. Ids are pre-reserved
//! in batches of `step`: the common path is a single atomic increment, and
//! only every `step`-th allocation touches the database to push the
//! persisted high-water mark forward. The persisted value is an exclusive
//! upper bound on everything ever handed out, so a restart can never
//! replay an id - at worst the remainder of the last batch is abandoned.

use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use thiserror::Error;
use tracing::debug;

use quarry_store_db::IndexDb;

/// Counter row used when callers don't need separate id spaces.
pub const DEFAULT_ID_TYPE: &str = "general";

/// Result type for id allocation.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during id allocation.
#[derive(Error, Debug)]
pub enum Error {
    /// The configured batch size is unusable. Fatal at initialization.
    #[error("id allocation step must be positive, got {0}")]
    InvalidStep(i64),

    /// Persisting the high-water mark failed. Fatal for the allocation:
    /// handing out an id the store doesn't cover risks duplicates.
    #[error("counter persistence failed: {0}")]
    Store(#[from] quarry_store_db::Error),

    /// A previous caller panicked while holding the reservation lock.
    #[error("id allocator lock poisoned")]
    LockPoisoned,
}

/// Persisted access to one named counter row.
///
/// The row is owned exclusively by the allocator; no other component
/// touches it.
pub trait CounterStore: Send {
    fn select(&self, id_type: &str) -> Result<Option<i64>>;
    fn insert(&self, id_type: &str, value: i64) -> Result<()>;
    fn update(&self, id_type: &str, value: i64) -> Result<()>;
}

impl CounterStore for IndexDb {
    fn select(&self, id_type: &str) -> Result<Option<i64>> {
        Ok(self.select_counter(id_type)?)
    }

    fn insert(&self, id_type: &str, value: i64) -> Result<()> {
        Ok(self.insert_counter(id_type, value)?)
    }

    fn update(&self, id_type: &str, value: i64) -> Result<()> {
        Ok(self.update_counter(id_type, value)?)
    }
}

impl CounterStore for std::sync::Arc<Mutex<IndexDb>> {
    fn select(&self, id_type: &str) -> Result<Option<i64>> {
        let db = self.lock().map_err(|_| Error::LockPoisoned)?;
        Ok(db.select_counter(id_type)?)
    }

    fn insert(&self, id_type: &str, value: i64) -> Result<()> {
        let db = self.lock().map_err(|_| Error::LockPoisoned)?;
        Ok(db.insert_counter(id_type, value)?)
    }

    fn update(&self, id_type: &str, value: i64) -> Result<()> {
        let db = self.lock().map_err(|_| Error::LockPoisoned)?;
        Ok(db.update_counter(id_type, value)?)
    }
}

/// Process-wide monotonic unique-id allocator.
pub struct IdAllocator<C: CounterStore> {
    id_type: String,
    step: i64,
    /// Next id to hand out.
    current: AtomicI64,
    /// Exclusive upper bound of the persisted reservation.
    reserved: AtomicI64,
    store: Mutex<C>,
}

impl<C: CounterStore> IdAllocator<C> {
    /// Create an allocator over the default counter row.
    pub fn new(store: C, step: i64) -> Result<Self> {
        Self::with_id_type(store, DEFAULT_ID_TYPE, step)
    }

    /// Create an allocator over a named counter row.
    ///
    /// Seeds the row at 1 on first start; otherwise resumes from the
    /// persisted high-water mark.
    pub fn with_id_type(store: C, id_type: &str, step: i64) -> Result<Self> {
        if step <= 0 {
            return Err(Error::InvalidStep(step));
        }
        let start = match store.select(id_type)? {
            Some(value) => value,
            None => {
                store.insert(id_type, 1)?;
                debug!("seeded unique-id counter '{id_type}' at 1");
                1
            }
        };
        Ok(Self {
            id_type: id_type.to_owned(),
            step,
            current: AtomicI64::new(start),
            reserved: AtomicI64::new(start),
            store: Mutex::new(store),
        })
    }

    /// Allocate the next id.
    ///
    /// Lock-free unless the batch reservation is exhausted; the boundary
    /// crossing serializes, double-checks, and persists the extended
    /// reservation before the id is released to the caller.
    pub fn next_id(&self) -> Result<i64> {
        let id = self.current.fetch_add(1, Ordering::AcqRel);
        if id < self.reserved.load(Ordering::Acquire) {
            return Ok(id);
        }

        let store = self.store.lock().map_err(|_| Error::LockPoisoned)?;
        let mut reserved = self.reserved.load(Ordering::Acquire);
        if id < reserved {
            // Another boundary-crosser already extended past us
            return Ok(id);
        }
        while reserved <= id {
            reserved += self.step;
        }
        store.update(&self.id_type, reserved)?;
        self.reserved.store(reserved, Ordering::Release);
        Ok(id)
    }

    pub fn step(&self) -> i64 {
        self.step
    }
}
