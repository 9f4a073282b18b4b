// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Place write path.
//!
//! Every place write goes through [`PlaceIndexSynchronizer`], which keeps the
//! entity store (system of record) and the search index (read-side
//! projection) in step:
//!
//! ```text
//! persist(place)                      delete(id)
//!   │                                   │
//!   ├─→ EntityStore::put   (stored)     ├─→ EntityStore::delete (stored)
//!   │     failure → Err                 │     failure → Err
//!   │                                   │
//!   └─→ SearchIndex::upsert (indexed)   └─→ SearchIndex::remove (indexed)
//!         failure → warn, indexed=false       failure → warn, indexed=false
//! ```
//!
//! The two steps are not a transaction. The entity write commits first and
//! an index failure never rolls it back; the place stays durable with its
//! searchability degraded until the next successful write.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::Result;
use crate::metrics;
use crate::outcome::{BatchResult, WriteOutcome};
use crate::place::{fields, Place, PlaceId};
use crate::search::{SearchDocument, SearchIndex};
use crate::storage::{EntityStore, EqualityFilter};
use crate::tag::TagId;

/// Owns all place writes and their search documents.
pub struct PlaceIndexSynchronizer {
    places: Arc<dyn EntityStore<Place>>,
    index: Arc<dyn SearchIndex>,
}

impl PlaceIndexSynchronizer {
    pub fn new(places: Arc<dyn EntityStore<Place>>, index: Arc<dyn SearchIndex>) -> Self {
        Self { places, index }
    }

    /// Write a place and re-derive its search document.
    ///
    /// Assigns an id to new places. Store failures are returned; index
    /// failures are logged and reported as `indexed: false`.
    pub async fn persist(&self, place: &mut Place) -> Result<WriteOutcome> {
        let id = self.places.put(place).await?;
        debug!(id, name = %place.name, "Place stored");

        let indexed = self.index_place(place).await;
        Ok(WriteOutcome {
            id,
            stored: true,
            indexed,
        })
    }

    /// Delete a place, then its search document.
    pub async fn delete(&self, id: PlaceId) -> Result<WriteOutcome> {
        self.places.delete(id).await?;
        debug!(id, "Place removed from store");

        let indexed = match self.index.remove(id).await {
            Ok(()) => {
                metrics::record_index_operation("remove", true);
                true
            }
            Err(e) => {
                metrics::record_index_operation("remove", false);
                warn!(
                    id,
                    error = %e,
                    "Search document removal failed; orphaned document left in index"
                );
                false
            }
        };

        Ok(WriteOutcome {
            id,
            stored: true,
            indexed,
        })
    }

    /// Remove `tag_id` from every place carrying it.
    ///
    /// Each affected place is re-persisted so its document is regenerated.
    /// Best effort: a failing place is logged and counted, the rest still get
    /// cleaned. Safe to re-run since removing an absent tag id is a no-op.
    pub async fn delete_tag_reference(&self, tag_id: TagId) -> Result<BatchResult> {
        let tagged = self
            .places
            .query(&EqualityFilter::new(fields::TAGS, tag_id))
            .await?;

        let mut result = BatchResult {
            total: tagged.len(),
            succeeded: 0,
            failed: 0,
        };

        for mut place in tagged {
            place.remove_tag(tag_id);
            match self.persist(&mut place).await {
                Ok(_) => result.succeeded += 1,
                Err(e) => {
                    result.failed += 1;
                    warn!(
                        tag_id,
                        place_id = ?place.id,
                        error = %e,
                        "Failed to scrub tag reference"
                    );
                }
            }
        }

        if result.total > 0 {
            debug!(
                tag_id,
                scrubbed = result.succeeded,
                failed = result.failed,
                "Tag references scrubbed"
            );
        }
        Ok(result)
    }

    async fn index_place(&self, place: &Place) -> bool {
        let Some(document) = SearchDocument::from_place(place) else {
            return false;
        };
        let id = document.id;

        match self.index.upsert(document).await {
            Ok(()) => {
                metrics::record_index_operation("upsert", true);
                true
            }
            Err(e) => {
                metrics::record_index_operation("upsert", false);
                warn!(
                    id,
                    error = %e,
                    "Search document upsert failed; place stored but not searchable"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{InMemorySearchIndex, Query, SearchError, SearchHits, SortSpec};
    use crate::storage::InMemoryEntityStore;
    use async_trait::async_trait;

    struct DownIndex;

    #[async_trait]
    impl SearchIndex for DownIndex {
        async fn upsert(&self, _document: SearchDocument) -> std::result::Result<(), SearchError> {
            Err(SearchError::Transient("index offline".into()))
        }

        async fn remove(&self, _id: PlaceId) -> std::result::Result<(), SearchError> {
            Err(SearchError::Transient("index offline".into()))
        }

        async fn search(
            &self,
            _query: &Query,
            _sort: Option<&SortSpec>,
            _limit: usize,
            _cursor: Option<&str>,
        ) -> std::result::Result<SearchHits, SearchError> {
            Err(SearchError::Transient("index offline".into()))
        }
    }

    fn setup() -> (
        Arc<InMemoryEntityStore<Place>>,
        Arc<InMemorySearchIndex>,
        PlaceIndexSynchronizer,
    ) {
        let store = Arc::new(InMemoryEntityStore::new());
        let index = Arc::new(InMemorySearchIndex::new());
        let sync = PlaceIndexSynchronizer::new(store.clone(), index.clone());
        (store, index, sync)
    }

    #[tokio::test]
    async fn test_persist_writes_both_stores() {
        let (store, index, sync) = setup();
        let mut place = Place::new("Cafe").with_tags([1, 2]);

        let outcome = sync.persist(&mut place).await.unwrap();

        assert!(outcome.stored && outcome.indexed);
        assert!(store.get(outcome.id).await.unwrap().is_some());
        assert_eq!(index.document(outcome.id).unwrap().text_field("tags"), Some("1 2"));
    }

    #[tokio::test]
    async fn test_persist_regenerates_document() {
        let (_store, index, sync) = setup();
        let mut place = Place::new("Cafe").with_city("Oslo");
        let id = sync.persist(&mut place).await.unwrap().id;

        place.city = None;
        sync.persist(&mut place).await.unwrap();

        assert!(index.document(id).unwrap().text_field("city").is_none());
    }

    #[tokio::test]
    async fn test_index_failure_keeps_entity() {
        let store = Arc::new(InMemoryEntityStore::new());
        let sync = PlaceIndexSynchronizer::new(store.clone(), Arc::new(DownIndex));
        let mut place = Place::new("Durable");

        let outcome = sync.persist(&mut place).await.unwrap();

        assert!(outcome.stored);
        assert!(!outcome.indexed);
        assert!(store.get(outcome.id).await.unwrap().is_some());

        let deleted = sync.delete(outcome.id).await.unwrap();
        assert!(!deleted.indexed);
        assert!(store.get(outcome.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_removes_both() {
        let (store, index, sync) = setup();
        let mut place = Place::new("Gone");
        let id = sync.persist(&mut place).await.unwrap().id;

        let outcome = sync.delete(id).await.unwrap();

        assert!(outcome.indexed);
        assert!(store.get(id).await.unwrap().is_none());
        assert!(!index.contains(id));
    }

    #[tokio::test]
    async fn test_delete_tag_reference_is_idempotent() {
        let (store, index, sync) = setup();
        let a = sync.persist(&mut Place::new("a").with_tags([1, 2])).await.unwrap().id;
        let b = sync.persist(&mut Place::new("b").with_tags([2])).await.unwrap().id;
        let c = sync.persist(&mut Place::new("c").with_tags([3])).await.unwrap().id;

        let first = sync.delete_tag_reference(2).await.unwrap();
        assert_eq!(first, BatchResult { total: 2, succeeded: 2, failed: 0 });
        let after_once = store.get_many(&[a, b, c]).await.unwrap();

        let second = sync.delete_tag_reference(2).await.unwrap();
        assert_eq!(second.total, 0);

        let mut after_twice = store.get_many(&[a, b, c]).await.unwrap();
        let mut after_once = after_once;
        after_once.sort_by_key(|p| p.id);
        after_twice.sort_by_key(|p| p.id);
        let tags = |ps: &[Place]| ps.iter().map(|p| p.tags.clone()).collect::<Vec<_>>();
        assert_eq!(tags(&after_once), tags(&after_twice));

        assert_eq!(index.document(a).unwrap().text_field("tags"), Some("1"));
        assert!(index.document(b).unwrap().text_field("tags").is_none());
    }
}
