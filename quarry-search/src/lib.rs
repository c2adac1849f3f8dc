// SPDX-FileCopyrightText: 2026 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Artifact and build search over the metadata index.
//!
//! Two read-only engines: [`ArtifactSearchEngine`] answers free-text name
//! and GAVC coordinate searches, [`BuildSearchEngine`] resolves build runs
//! by name or checksum linkage. Both construct structured
//! [`NodeQuery`](quarry_store_db::NodeQuery) expressions; user-supplied
//! criteria travel exclusively through escaped
//! [`LikePattern`](quarry_store_db::LikePattern)s and bound parameters.

mod access;
mod artifact;
mod build;
mod gavc;

pub use access::{AccessPolicy, AllowAll};
pub use artifact::{ArtifactMatch, ArtifactSearchEngine, SearchConfig, SearchResult};
pub use build::BuildSearchEngine;
pub use gavc::GavcCriteria;

use thiserror::Error;

/// Errors that can occur while executing a search.
///
/// Per-row problems (stale repos, unparseable paths) are never errors; they
/// are logged and skipped so one bad row cannot abort a whole search.
#[derive(Error, Debug)]
pub enum Error {
    #[error("index query failed: {0}")]
    Store(#[from] quarry_store_db::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
