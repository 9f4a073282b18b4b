// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! In-memory search index.
//!
//! Evaluates the query AST directly against stored documents:
//!
//! - term queries match when every word of the value occurs as a token of the
//!   field (case-insensitive, split on whitespace and punctuation)
//! - distance queries use the haversine great-circle distance in metres
//! - without a sort, hits rank by ascending document id
//!
//! The cursor is the hex-encoded offset of the next hit.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use crate::place::{GeoPoint, PlaceId};
use super::document::SearchDocument;
use super::expression::ExpressionTranslator;
use super::query_builder::{Query, QueryNode, SortDirection, SortExpression, SortSpec};
use super::traits::{SearchError, SearchHits, SearchIndex};

/// Mean earth radius in metres
const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Great-circle distance between two points in metres
pub fn haversine_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat1, lat2) = (a.latitude.to_radians(), b.latitude.to_radians());
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

/// Concurrent in-memory text+geo index
#[derive(Default)]
pub struct InMemorySearchIndex {
    documents: RwLock<BTreeMap<PlaceId, SearchDocument>>,
}

impl InMemorySearchIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of indexed documents
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// Whether a document with this id is indexed
    #[must_use]
    pub fn contains(&self, id: PlaceId) -> bool {
        self.documents.read().contains_key(&id)
    }

    /// Snapshot of a stored document
    #[must_use]
    pub fn document(&self, id: PlaceId) -> Option<SearchDocument> {
        self.documents.read().get(&id).cloned()
    }

    fn matches(doc: &SearchDocument, node: &QueryNode) -> bool {
        match node {
            QueryNode::Term(term) => {
                let Some(text) = doc.text_field(&term.field) else {
                    return false;
                };
                let tokens: Vec<String> = tokenize(text).collect();
                let mut wanted = tokenize(&term.value).peekable();
                wanted.peek().is_some() && wanted.all(|w| tokens.contains(&w))
            }
            QueryNode::Distance(distance) => doc
                .geo_field(&distance.field)
                .map_or(false, |point| {
                    haversine_distance(distance.origin, point) < distance.radius
                }),
            QueryNode::And(nodes) => nodes.iter().all(|n| Self::matches(doc, n)),
            QueryNode::Or(nodes) => nodes.iter().any(|n| Self::matches(doc, n)),
        }
    }

    fn sort_key(doc: &SearchDocument, sort: &SortSpec) -> f64 {
        match &sort.expression {
            SortExpression::Distance { field, origin } => doc
                .geo_field(field)
                .map_or(sort.default_value, |point| haversine_distance(*origin, point)),
        }
    }

    fn decode_cursor(cursor: &str) -> Result<usize, SearchError> {
        let bytes = hex::decode(cursor).map_err(|e| SearchError::InvalidCursor(e.to_string()))?;
        let bytes: [u8; 8] = bytes
            .try_into()
            .map_err(|_| SearchError::InvalidCursor(format!("bad length: {cursor}")))?;
        Ok(u64::from_be_bytes(bytes) as usize)
    }

    fn encode_cursor(offset: usize) -> String {
        hex::encode((offset as u64).to_be_bytes())
    }
}

#[async_trait]
impl SearchIndex for InMemorySearchIndex {
    async fn upsert(&self, document: SearchDocument) -> Result<(), SearchError> {
        self.documents.write().insert(document.id, document);
        Ok(())
    }

    async fn remove(&self, id: PlaceId) -> Result<(), SearchError> {
        self.documents.write().remove(&id);
        Ok(())
    }

    async fn search(
        &self,
        query: &Query,
        sort: Option<&SortSpec>,
        limit: usize,
        cursor: Option<&str>,
    ) -> Result<SearchHits, SearchError> {
        let offset = cursor.map(Self::decode_cursor).transpose()?.unwrap_or(0);
        debug!(query = %ExpressionTranslator::translate(query), offset, limit, "In-memory search");

        let mut ranked: Vec<(f64, PlaceId)> = {
            let documents = self.documents.read();
            documents
                .values()
                .filter(|doc| Self::matches(doc, &query.root))
                .map(|doc| (sort.map_or(0.0, |s| Self::sort_key(doc, s)), doc.id))
                .collect()
        };

        let descending = matches!(sort.map(|s| s.direction), Some(SortDirection::Descending));
        ranked.sort_by(|a, b| {
            let by_key = a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal);
            let by_key = if descending { by_key.reverse() } else { by_key };
            // Ties broken by id keeps paging deterministic
            by_key.then(a.1.cmp(&b.1))
        });

        let total = ranked.len();
        let ids: Vec<PlaceId> = ranked
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|(_, id)| id)
            .collect();

        let next = offset + ids.len();
        let cursor = (!ids.is_empty() && next < total).then(|| Self::encode_cursor(next));

        Ok(SearchHits { ids, total, cursor })
    }
}
