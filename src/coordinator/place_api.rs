// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Place API for VenueDirectory
//!
//! # Architecture
//!
//! ```text
//! create / update / delete
//!       │
//!       ├─→ validate (name, location, parent place)
//!       └─→ PlaceIndexSynchronizer (store, then index)
//!
//! list_*                    search_* / nearby_places
//!       │                          │
//!       └─→ EntityStore::query_page└─→ QueryBuilder → ResultHydrator
//! ```

use std::collections::HashSet;

use tracing::{debug, info};

use crate::error::{DirectoryError, Result};
use crate::place::{fields, Place, PlaceId};
use crate::search::{GeoFilter, QueryBuilder};
use crate::storage::{EqualityFilter, Page};
use crate::tag::TagId;

use super::{PageRequest, VenueDirectory, WriteOutcome};

impl VenueDirectory {
    // ═══════════════════════════════════════════════════════════════════════════
    // Writes
    // ═══════════════════════════════════════════════════════════════════════════

    /// Create a place. Any caller-supplied id is ignored.
    ///
    /// Returns the stored place (with its new id) and how far the write got.
    /// `indexed: false` means the place is stored but not yet searchable.
    pub async fn create_place(&self, mut place: Place) -> Result<(Place, WriteOutcome)> {
        place.id = None;
        place.created_at = 0;
        self.validate_place(&place).await?;

        let outcome = self.synchronizer.persist(&mut place).await?;
        debug!(id = outcome.id, indexed = outcome.indexed, "Place created");
        Ok((place, outcome))
    }

    /// Replace a place's fields. Fails NotFound when it does not exist.
    ///
    /// A parent that is the place itself or one of its descendants is a
    /// BadRequest.
    pub async fn update_place(
        &self,
        id: PlaceId,
        mut place: Place,
    ) -> Result<(Place, WriteOutcome)> {
        let stored = self.get_place(id).await?;
        place.inherit_server_fields(&stored);
        if let Some(parent_id) = place.parent_id {
            self.reject_place_cycle(id, parent_id).await?;
        }
        self.validate_place(&place).await?;

        let outcome = self.synchronizer.persist(&mut place).await?;
        debug!(id, indexed = outcome.indexed, "Place updated");
        Ok((place, outcome))
    }

    pub async fn delete_place(&self, id: PlaceId) -> Result<WriteOutcome> {
        self.get_place(id).await?;
        let outcome = self.synchronizer.delete(id).await?;
        info!(id, indexed = outcome.indexed, "Place deleted");
        Ok(outcome)
    }

    /// Re-derive a stored place's search document.
    ///
    /// For places whose earlier write came back with `indexed: false`.
    pub async fn reindex_place(&self, id: PlaceId) -> Result<WriteOutcome> {
        let mut place = self.get_place(id).await?;
        self.synchronizer.persist(&mut place).await
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Reads
    // ═══════════════════════════════════════════════════════════════════════════

    pub async fn get_place(&self, id: PlaceId) -> Result<Place> {
        self.places
            .get(id)
            .await?
            .ok_or_else(|| DirectoryError::not_found("place", id))
    }

    /// All places, in store order.
    pub async fn list_places(&self, page: &PageRequest) -> Result<Page<Place>> {
        self.list(None, page).await
    }

    /// Direct children of a place. Fails NotFound when the parent is missing.
    pub async fn list_places_for_parent(
        &self,
        parent_id: PlaceId,
        page: &PageRequest,
    ) -> Result<Page<Place>> {
        self.get_place(parent_id).await?;
        self.list(Some(EqualityFilter::new(fields::PARENT_ID, parent_id)), page)
            .await
    }

    /// Places with no parent.
    pub async fn list_root_places(&self, page: &PageRequest) -> Result<Page<Place>> {
        self.list(Some(EqualityFilter::new(fields::PARENT_ID, None::<PlaceId>)), page)
            .await
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Search
    // ═══════════════════════════════════════════════════════════════════════════

    /// Free-text search over name and city, optionally narrowed to tags.
    ///
    /// Blank text with no tags is a BadRequest.
    pub async fn search_places_by_text(
        &self,
        text: &str,
        tags: &[TagId],
        page: &PageRequest,
    ) -> Result<Page<Place>> {
        let request = QueryBuilder::new()
            .text(text)
            .tags(tags.iter().copied())
            .build()?;
        self.hydrator
            .search(&request, page.cursor.as_deref(), self.page_size(page))
            .await
    }

    /// Places carrying every one of `tags`.
    pub async fn search_places_by_tags(
        &self,
        tags: &[TagId],
        page: &PageRequest,
    ) -> Result<Page<Place>> {
        let request = QueryBuilder::new().tags(tags.iter().copied()).build()?;
        self.hydrator
            .search(&request, page.cursor.as_deref(), self.page_size(page))
            .await
    }

    /// Places within `radius` metres, nearest first, optionally narrowed to tags.
    pub async fn nearby_places(
        &self,
        latitude: f64,
        longitude: f64,
        radius: f64,
        tags: &[TagId],
        page: &PageRequest,
    ) -> Result<Page<Place>> {
        let request = QueryBuilder::new()
            .near(GeoFilter::new(latitude, longitude, radius))
            .tags(tags.iter().copied())
            .build()?;
        self.hydrator
            .search(&request, page.cursor.as_deref(), self.page_size(page))
            .await
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Internal
    // ═══════════════════════════════════════════════════════════════════════════

    async fn list(
        &self,
        filter: Option<EqualityFilter>,
        page: &PageRequest,
    ) -> Result<Page<Place>> {
        Ok(self
            .places
            .query_page(filter.as_ref(), self.page_size(page), page.cursor.as_deref())
            .await?)
    }

    /// Walk up from `new_parent`; reaching `id` means the move would close a loop.
    async fn reject_place_cycle(&self, id: PlaceId, new_parent: PlaceId) -> Result<()> {
        let mut seen = HashSet::new();
        let mut cursor = Some(new_parent);
        while let Some(ancestor) = cursor {
            if ancestor == id {
                return Err(DirectoryError::bad_request(format!(
                    "place {new_parent} is place {id} or one of its descendants"
                )));
            }
            if !seen.insert(ancestor) {
                break;
            }
            cursor = self.places.get(ancestor).await?.and_then(|p| p.parent_id);
        }
        Ok(())
    }

    async fn validate_place(&self, place: &Place) -> Result<()> {
        if place.name.trim().is_empty() {
            return Err(DirectoryError::bad_request("place name must not be blank"));
        }
        if let Some(location) = place.location {
            if !location.is_valid() {
                return Err(DirectoryError::bad_request(format!(
                    "location out of range: ({}, {})",
                    location.latitude, location.longitude
                )));
            }
        }
        if let Some(parent_id) = place.parent_id {
            self.get_place(parent_id).await?;
        }
        Ok(())
    }
}
