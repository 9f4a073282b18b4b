// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Results of writes that span more than one store.

use crate::entity::EntityId;
use crate::tag::{Tag, TagId};

/// Outcome of a dual-store write.
///
/// `stored` is the entity store step, `indexed` the search index step. A
/// write that reached the store but not the index is durable yet not
/// searchable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    pub id: EntityId,
    pub stored: bool,
    pub indexed: bool,
}

impl WriteOutcome {
    /// Both steps succeeded
    #[must_use]
    pub fn is_synced(&self) -> bool {
        self.stored && self.indexed
    }
}

/// Result of a batch operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    /// Total items in the batch
    pub total: usize,
    /// Successfully processed items
    pub succeeded: usize,
    /// Failed items
    pub failed: usize,
}

impl BatchResult {
    /// Check if all items succeeded
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Add another batch's counts to this one
    pub fn merge(&mut self, other: BatchResult) {
        self.total += other.total;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
    }
}

/// Report of a cascading tag delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDeletion {
    /// The tag the delete was requested for
    pub tag: Tag,
    /// Every removed tag id, deepest first, requested tag last
    pub removed: Vec<TagId>,
    /// Place reference scrubbing across the whole subtree
    pub references: BatchResult,
}
