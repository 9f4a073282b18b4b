// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use async_trait::async_trait;
use thiserror::Error;

use crate::place::PlaceId;
use super::document::SearchDocument;
use super::query_builder::{Query, SortSpec};

#[derive(Error, Debug)]
pub enum SearchError {
    /// Temporary backend trouble; the operation may succeed if retried later
    #[error("Search index temporarily unavailable: {0}")]
    Transient(String),
    #[error("Invalid cursor token: {0}")]
    InvalidCursor(String),
    #[error("Search backend error: {0}")]
    Backend(String),
}

/// One page of ranked search hits
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHits {
    /// Document ids in rank order
    pub ids: Vec<PlaceId>,
    /// Total matching documents across all pages
    pub total: usize,
    /// Continuation token, present when more hits may follow
    pub cursor: Option<String>,
}

/// Secondary text+geo index over places
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Insert or fully replace a document
    async fn upsert(&self, document: SearchDocument) -> Result<(), SearchError>;

    /// Remove a document. Removing a missing id is not an error.
    async fn remove(&self, id: PlaceId) -> Result<(), SearchError>;

    /// Run a query, returning at most `limit` ranked ids.
    async fn search(
        &self,
        query: &Query,
        sort: Option<&SortSpec>,
        limit: usize,
        cursor: Option<&str>,
    ) -> Result<SearchHits, SearchError>;
}
