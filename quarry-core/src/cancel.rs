// SPDX-FileCopyrightText: 2026 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Cooperative cancellation for long-running sweeps.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A shared flag checked between sweep items.
///
/// Sweeps over large trees (archive indexing, integration cleanup) check
/// this at iteration boundaries; an interrupted sweep leaves remaining
/// items for the next scheduled run. Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
