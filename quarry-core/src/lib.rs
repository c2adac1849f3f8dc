// SPDX-FileCopyrightText: 2026 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Core artifact repository semantics.
//!
//! This crate provides the fundamental types and pure computation logic for
//! working with an artifact repository tree: repository paths, Maven layout
//! coordinates, snapshot/integration revision handling, checksum encoding and
//! the path segment codec used for flat indexed keys. It is intentionally
//! IO-free - all operations are pure functions that operate on values,
//! enabling easy testing and composition.
//!
//! # Key Modules
//!
//! - `repo_path` - Repository tree node identifiers
//! - `layout` - Maven coordinate parsing from repository paths
//! - `path_codec` - Escaping of reserved characters in stored segments
//! - `version` - Maven-aware version ordering
//! - `checksum` - Textual `sha1:`/`md5:` checksum encoding
//! - `build` - Build run identity and build-tree path parsing
//! - `registry` - Repository descriptors and the explicit registry cache
//!
//! # Design Principles
//!
//! 1. **No IO**: No filesystem, no network, no database handles
//! 2. **Pure functions**: Deterministic, testable, referentially transparent
//! 3. **Explicit errors**: All fallible operations return `Result` or `Option`
//! 4. **Parse once**: Structured values are constructed at the boundary and
//!    never re-derived by splitting strings downstream

pub mod build;
pub mod cancel;
pub mod checksum;
pub mod layout;
pub mod path_codec;
pub mod repo_path;
pub mod registry;
pub mod version;

pub use build::{BuildRun, BuildsRoot};
pub use cancel::CancellationFlag;
pub use checksum::{Checksum, ChecksumAlgorithm};
pub use layout::{ModuleCoordinates, UniqueRevision};
pub use registry::{RepoDescriptor, RepoKind, RepoRegistry, SnapshotPolicy};
pub use repo_path::{RepoPath, RepoPathError};
pub use version::MavenVersion;
