// SPDX-FileCopyrightText: 2026 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Snapshot version resolution and integration cleanup.
//!
//! [`SnapshotVersionResolver`] rewrites `-SNAPSHOT` requests to the latest
//! deployed unique snapshot under the repository's configured policy.
//! [`IntegrationCleaner`] enforces the per-module retention limit on unique
//! snapshot groups after new deployments.

mod cleaner;
mod resolver;

pub use cleaner::{CleanupStats, IntegrationCleaner};
pub use resolver::SnapshotVersionResolver;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("index access failed: {0}")]
    Store(#[from] quarry_store_db::Error),
    #[error(transparent)]
    Path(#[from] quarry_core::RepoPathError),
}

pub type Result<T> = std::result::Result<T, Error>;
