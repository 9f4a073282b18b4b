// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Venue directory coordinator.
//!
//! [`VenueDirectory`] is the surface thin REST controllers call. It wires
//! the components together and adds request validation:
//! - [`PlaceIndexSynchronizer`] for every place write
//! - [`ResultHydrator`] for text, tag and nearby searches
//! - [`TagHierarchyManager`] for tag CRUD and the forest view
//!
//! # Example
//!
//! ```rust
//! use venue_directory::{DirectoryConfig, PageRequest, Place, Tag, VenueDirectory};
//!
//! # #[tokio::main]
//! # async fn main() -> venue_directory::Result<()> {
//! let directory = VenueDirectory::in_memory(DirectoryConfig::default());
//!
//! let cafes = directory.create_tag(Tag::new("category", "Cafe")).await?;
//! let cafe_id = cafes.id.unwrap_or_default();
//!
//! let (place, outcome) = directory
//!     .create_place(Place::new("Blue Door").with_city("Bangkok").with_tags([cafe_id]))
//!     .await?;
//! assert!(outcome.indexed);
//!
//! let page = directory
//!     .search_places_by_text("bangkok", &[cafe_id], &PageRequest::first(10))
//!     .await?;
//! assert_eq!(page.items[0].id, place.id);
//! # Ok(())
//! # }
//! ```

mod place_api;
mod tag_api;
mod types;

pub use crate::outcome::{BatchResult, TagDeletion, WriteOutcome};
pub use types::PageRequest;

use std::sync::Arc;

use tracing::info;

use crate::config::DirectoryConfig;
use crate::hydrator::ResultHydrator;
use crate::place::Place;
use crate::search::{InMemorySearchIndex, SearchIndex};
use crate::storage::{EntityStore, InMemoryEntityStore};
use crate::synchronizer::PlaceIndexSynchronizer;
use crate::tag::Tag;
use crate::tags::{HierarchyCache, TagHierarchyManager};

/// Venue directory over an entity store and a search index.
///
/// `Send + Sync`; share it behind an `Arc`. No operation takes a lock
/// across store calls.
pub struct VenueDirectory {
    pub(super) config: DirectoryConfig,
    /// Places, read side (writes go through `synchronizer`)
    pub(super) places: Arc<dyn EntityStore<Place>>,
    pub(super) synchronizer: Arc<PlaceIndexSynchronizer>,
    pub(super) hydrator: ResultHydrator,
    pub(super) tags: TagHierarchyManager,
}

impl VenueDirectory {
    /// Wire a directory over caller-provided adapters.
    pub fn new(
        config: DirectoryConfig,
        places: Arc<dyn EntityStore<Place>>,
        tags: Arc<dyn EntityStore<Tag>>,
        index: Arc<dyn SearchIndex>,
    ) -> Self {
        let synchronizer = Arc::new(PlaceIndexSynchronizer::new(
            Arc::clone(&places),
            Arc::clone(&index),
        ));
        let hydrator = ResultHydrator::new(Arc::clone(&places), index);
        let cache = config
            .hierarchy_cache_enabled
            .then(|| HierarchyCache::new(config.hierarchy_cache_max_types));
        let tags = TagHierarchyManager::new(tags, Arc::clone(&synchronizer), cache);

        info!(
            default_page_size = config.default_page_size,
            max_page_size = config.max_page_size,
            hierarchy_cache = config.hierarchy_cache_enabled,
            "Venue directory ready"
        );

        Self {
            config,
            places,
            synchronizer,
            hydrator,
            tags,
        }
    }

    /// Directory backed by the in-memory adapters.
    pub fn in_memory(config: DirectoryConfig) -> Self {
        Self::new(
            config,
            Arc::new(InMemoryEntityStore::<Place>::new()),
            Arc::new(InMemoryEntityStore::<Tag>::new()),
            Arc::new(InMemorySearchIndex::new()),
        )
    }

    /// Get the effective configuration
    #[must_use]
    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    pub(super) fn page_size(&self, request: &PageRequest) -> usize {
        self.config.effective_page_size(request.page_size)
    }
}
