// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Tag Hierarchy Cache
//!
//! Caches the built forest per tag type. Writers invalidate the type they
//! touched; readers rebuild lazily on the next miss.
//!
//! # Flow
//!
//! ```text
//! hierarchy_for_type(t)
//!       │
//!       ▼
//! ┌──────────────────────────────┐
//! │  get(t)                      │
//! └──────────────────────────────┘
//!       │
//!       ├─→ Hit  → shared forest
//!       │
//!       └─→ Miss → gen = generation(t)
//!                  load tags, build forest
//!                  put(t, gen, forest)   (dropped if t was invalidated meanwhile)
//! ```
//!
//! Every `invalidate` bumps the type's generation, so a forest built from
//! rows read before a concurrent write never lands in the cache.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::hierarchy::TagNode;
use crate::metrics;

/// Shared, immutable forest for one tag type
pub type Forest = Arc<Vec<TagNode>>;

/// Per-type tag forest cache with oldest-eviction
pub struct HierarchyCache {
    /// tag type → forest
    forests: DashMap<String, Forest>,
    /// tag type → invalidation generation
    generations: DashMap<String, u64>,
    /// Insertion order for eviction (oldest first)
    order: Mutex<VecDeque<String>>,
    /// Maximum number of cached types
    max_types: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    invalidations: AtomicU64,
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct HierarchyCacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Number of `invalidate` calls
    pub invalidations: u64,
    /// Current number of cached types
    pub entry_count: usize,
    /// Hit rate (0.0 - 1.0)
    pub hit_rate: f64,
}

impl HierarchyCache {
    pub fn new(max_types: usize) -> Self {
        Self {
            forests: DashMap::new(),
            generations: DashMap::new(),
            order: Mutex::new(VecDeque::new()),
            max_types: max_types.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            invalidations: AtomicU64::new(0),
        }
    }

    /// Cached forest for a type, if present
    pub fn get(&self, tag_type: &str) -> Option<Forest> {
        let found = self.forests.get(tag_type).map(|f| Arc::clone(f.value()));
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        metrics::record_hierarchy_cache(found.is_some());
        found
    }

    /// Current generation of a type; read it before loading rows for `put`
    pub fn generation(&self, tag_type: &str) -> u64 {
        self.generations.get(tag_type).map_or(0, |g| *g)
    }

    /// Cache a forest built at `generation`.
    ///
    /// Returns false (and caches nothing) when the type was invalidated
    /// after that generation was read.
    pub fn put(&self, tag_type: &str, generation: u64, forest: Forest) -> bool {
        // Holding the order lock serialises puts against each other and
        // against invalidate's generation bump.
        let mut order = self.order.lock();
        if self.generation(tag_type) != generation {
            return false;
        }

        let is_new = self.forests.insert(tag_type.to_string(), forest).is_none();
        if is_new {
            order.push_back(tag_type.to_string());
            while self.forests.len() > self.max_types {
                match order.pop_front() {
                    Some(oldest) => {
                        self.forests.remove(&oldest);
                    }
                    None => break,
                }
            }
        }
        metrics::set_hierarchy_cache_entries(self.forests.len());
        true
    }

    /// Drop the forest for one type
    pub fn invalidate(&self, tag_type: &str) {
        let mut order = self.order.lock();
        *self.generations.entry(tag_type.to_string()).or_insert(0) += 1;
        if self.forests.remove(tag_type).is_some() {
            order.retain(|t| t != tag_type);
        }
        self.invalidations.fetch_add(1, Ordering::Relaxed);
        metrics::set_hierarchy_cache_entries(self.forests.len());
    }

    /// Drop every cached forest
    pub fn clear(&self) {
        let mut order = self.order.lock();
        for t in order.drain(..) {
            *self.generations.entry(t).or_insert(0) += 1;
        }
        self.forests.clear();
        metrics::set_hierarchy_cache_entries(0);
    }

    pub fn stats(&self) -> HierarchyCacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;

        HierarchyCacheStats {
            hits,
            misses,
            invalidations: self.invalidations.load(Ordering::Relaxed),
            entry_count: self.forests.len(),
            hit_rate: if total > 0 {
                hits as f64 / total as f64
            } else {
                0.0
            },
        }
    }
}

impl Default for HierarchyCache {
    fn default() -> Self {
        Self::new(256)
    }
}
