// SPDX-FileCopyrightText: 2026 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! SQLite node/property index for the artifact repository tree.
//!
//! This crate provides read and write access to the repository's metadata
//! index: one row per tree node (file or folder), multi-valued string
//! properties, archive entry listings and the persisted unique-id counter
//! rows. Search engines build [`NodeQuery`] values against it; the binary
//! content itself lives in an external blob store and is never touched here.
//!
//! # Key Features
//!
//! - Structured, injection-safe queries (every user value is a bound
//!   parameter; wildcard matching goes through [`LikePattern`])
//! - Typed property access over a closed key set
//! - Idempotent recursive node deletion
//! - In-memory database for testing
//!
//! # Example
//!
//! ```ignore
//! use quarry_store_db::{IndexDb, NodeQuery};
//!
//! let db = IndexDb::open_memory()?;
//! let hits = db.execute_query(&NodeQuery::files().name_like(LikePattern::contains("log4j")))?;
//! ```

mod connection;
mod error;
mod pattern;
mod query;
mod schema;
mod types;
mod write;

pub use connection::{IndexDb, OpenMode};
pub use error::{Error, Result};
pub use pattern::LikePattern;
pub use query::{NodeQuery, ResultOrder};
pub use schema::SCHEMA_VERSION;
pub use types::*;
