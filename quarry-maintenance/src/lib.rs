// SPDX-FileCopyrightText: 2026 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Configuration loading and scheduled background maintenance.
//!
//! Configuration comes from a TOML file and is validated at load; invalid
//! values (a non-positive id allocation step, a zero sweep interval) are
//! fatal at initialization rather than surfacing later. The [`Sweeper`]
//! drives integration cleanup and archive indexing on a tokio interval,
//! interruptible at item boundaries.

mod config;
mod sweep;

pub use config::{Config, ConfigError, SearchOrder};
pub use sweep::{Sweeper, TickStats};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cleanup failed: {0}")]
    Cleanup(#[from] quarry_snapshot::Error),
    #[error("archive indexing failed: {0}")]
    Archive(#[from] quarry_archive::Error),
    #[error("index lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, Error>;
