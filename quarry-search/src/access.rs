// SPDX-FileCopyrightText: 2026 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Read-permission filtering at the search boundary.

use quarry_core::RepoPath;

/// Capability check supplied by the authorization layer.
///
/// Denied items are silently excluded from result sets; to a searching
/// caller a denied artifact is indistinguishable from an absent one.
pub trait AccessPolicy {
    fn can_read(&self, path: &RepoPath) -> bool;
}

/// Policy that permits everything. Used by internal sweeps and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl AccessPolicy for AllowAll {
    fn can_read(&self, _path: &RepoPath) -> bool {
        true
    }
}

impl<F: Fn(&RepoPath) -> bool> AccessPolicy for F {
    fn can_read(&self, path: &RepoPath) -> bool {
        self(path)
    }
}
