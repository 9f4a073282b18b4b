// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entity::{Entity, EntityId, FieldValue};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage backend error: {0}")]
    Backend(String),
    #[error("Invalid cursor token: {0}")]
    InvalidCursor(String),
}

/// `field == value` filter evaluated by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqualityFilter {
    pub field: String,
    pub value: FieldValue,
}

impl EqualityFilter {
    pub fn new(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// One page of a paginated listing.
///
/// `cursor` is present only when more results may follow. Callers pass it
/// back verbatim to fetch the next page and must not parse it. An empty
/// `items` list is the authoritative end-of-results signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, cursor: Option<String>) -> Self {
        Self { items, cursor }
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            cursor: None,
        }
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        !self.items.is_empty() && self.cursor.is_some()
    }
}

/// Primary key/value persistence for one entity kind.
#[async_trait]
pub trait EntityStore<E: Entity>: Send + Sync {
    /// Write an entity, assigning an id when it has none.
    ///
    /// Stamps timestamps on `entity` and returns its id.
    async fn put(&self, entity: &mut E) -> Result<EntityId, StorageError>;

    async fn get(&self, id: EntityId) -> Result<Option<E>, StorageError>;

    /// Fetch several entities by id. Missing ids are skipped and the
    /// returned order is unspecified.
    async fn get_many(&self, ids: &[EntityId]) -> Result<Vec<E>, StorageError>;

    /// Delete by id. Deleting a missing id is not an error.
    async fn delete(&self, id: EntityId) -> Result<(), StorageError>;

    /// Delete several ids. Default implementation falls back to sequential deletes.
    async fn delete_many(&self, ids: &[EntityId]) -> Result<usize, StorageError> {
        for id in ids {
            self.delete(*id).await?;
        }
        Ok(ids.len())
    }

    /// All entities matching an equality filter.
    async fn query(&self, filter: &EqualityFilter) -> Result<Vec<E>, StorageError>;

    /// One page in store-native order, optionally filtered.
    async fn query_page(
        &self,
        filter: Option<&EqualityFilter>,
        page_size: usize,
        cursor: Option<&str>,
    ) -> Result<Page<E>, StorageError>;
}
