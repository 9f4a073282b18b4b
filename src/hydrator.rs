// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search result hydration.
//!
//! The index answers with ranked ids; callers want places. The hydrator
//! runs the query, bulk-loads the hits from the entity store and puts them
//! back in rank order, since bulk lookups give no ordering guarantee.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::Result;
use crate::metrics::{self, LatencyTimer};
use crate::place::{Place, PlaceId};
use crate::search::{ExpressionTranslator, SearchIndex, SearchRequest};
use crate::storage::{EntityStore, Page};

/// Resolves search hits to full places in rank order.
pub struct ResultHydrator {
    places: Arc<dyn EntityStore<Place>>,
    index: Arc<dyn SearchIndex>,
}

impl ResultHydrator {
    pub fn new(places: Arc<dyn EntityStore<Place>>, index: Arc<dyn SearchIndex>) -> Self {
        Self { places, index }
    }

    /// Run a search and return one page of places.
    ///
    /// Ids the index returns but the store no longer has are skipped, and
    /// further index pages are pulled until the page is full or the index
    /// runs out. A page never comes back empty while a cursor remains.
    pub async fn search(
        &self,
        request: &SearchRequest,
        cursor: Option<&str>,
        page_size: usize,
    ) -> Result<Page<Place>> {
        let _timer = LatencyTimer::new("place");
        debug!(
            expression = %ExpressionTranslator::translate(&request.query),
            sort = ?request.sort.as_ref().map(ExpressionTranslator::translate_sort),
            page_size,
            has_cursor = cursor.is_some(),
            "Searching places"
        );

        let mut places: Vec<Place> = Vec::with_capacity(page_size);
        let mut cursor = cursor.map(str::to_string);
        let mut rounds = 0usize;

        while places.len() < page_size {
            let wanted = page_size - places.len();
            let hits = match self
                .index
                .search(&request.query, request.sort.as_ref(), wanted, cursor.as_deref())
                .await
            {
                Ok(hits) => hits,
                Err(e) => {
                    metrics::record_search_query("place", "error");
                    return Err(e.into());
                }
            };
            metrics::record_search_query("place", "success");
            rounds += 1;

            if hits.ids.is_empty() {
                cursor = None;
                break;
            }

            let loaded = self.places.get_many(&hits.ids).await?;
            places.extend(Self::in_rank_order(&hits.ids, loaded));
            cursor = hits.cursor;

            if cursor.is_none() {
                break;
            }
        }

        metrics::record_search_results(places.len());
        debug!(hydrated = places.len(), rounds, has_more = cursor.is_some(), "Search hydrated");

        if places.is_empty() {
            return Ok(Page::empty());
        }
        Ok(Page::new(places, cursor))
    }

    fn in_rank_order(ranked: &[PlaceId], loaded: Vec<Place>) -> Vec<Place> {
        let mut by_id: HashMap<PlaceId, Place> = loaded
            .into_iter()
            .filter_map(|p| p.id.map(|id| (id, p)))
            .collect();

        let ordered: Vec<Place> = ranked.iter().filter_map(|id| by_id.remove(id)).collect();

        let missing = ranked.len() - ordered.len();
        if missing > 0 {
            metrics::record_hydration_misses(missing);
            warn!(missing, "Search hits missing from entity store; index is stale");
        }
        ordered
    }
}
