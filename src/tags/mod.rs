// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Tag hierarchy management.
//!
//! Tags of one type form a forest. [`TagHierarchyManager`] owns every tag
//! write, cascades deletes through descendants and serves the forest view
//! from a per-type [`HierarchyCache`].

mod cache;
mod hierarchy;
mod manager;

pub use cache::{Forest, HierarchyCache, HierarchyCacheStats};
pub use hierarchy::{build_forest, TagNode};
pub use manager::{TagHierarchyManager, TagUpdate};
