// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::entity::{now_millis, Entity, EntityId};
use crate::metrics;
use super::traits::{EntityStore, EqualityFilter, Page, StorageError};

/// Concurrent in-memory entity store.
///
/// Ids are handed out from a monotonically increasing counter starting at 1.
/// Pages are ordered by id and the cursor is the hex-encoded id of the last
/// item of the previous page.
pub struct InMemoryEntityStore<E: Entity> {
    data: DashMap<EntityId, E>,
    next_id: AtomicU64,
}

impl<E: Entity> InMemoryEntityStore<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Get current entity count
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Clear all entities
    pub fn clear(&self) {
        self.data.clear();
    }

    fn encode_cursor(last_id: EntityId) -> String {
        hex::encode(last_id.to_be_bytes())
    }

    fn decode_cursor(cursor: &str) -> Result<EntityId, StorageError> {
        let bytes = hex::decode(cursor).map_err(|e| StorageError::InvalidCursor(e.to_string()))?;
        let bytes: [u8; 8] = bytes
            .try_into()
            .map_err(|_| StorageError::InvalidCursor(format!("bad length: {cursor}")))?;
        Ok(EntityId::from_be_bytes(bytes))
    }
}

impl<E: Entity> Default for InMemoryEntityStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Entity> EntityStore<E> for InMemoryEntityStore<E> {
    async fn put(&self, entity: &mut E) -> Result<EntityId, StorageError> {
        let id = match entity.id() {
            Some(id) => {
                // Keep the counter ahead of externally chosen ids
                self.next_id.fetch_max(id + 1, Ordering::SeqCst);
                id
            }
            None => self.next_id.fetch_add(1, Ordering::SeqCst),
        };
        entity.set_id(id);
        entity.touch(now_millis());
        self.data.insert(id, entity.clone());
        metrics::record_store_operation(E::KIND, "put", "success");
        Ok(id)
    }

    async fn get(&self, id: EntityId) -> Result<Option<E>, StorageError> {
        Ok(self.data.get(&id).map(|r| r.value().clone()))
    }

    async fn get_many(&self, ids: &[EntityId]) -> Result<Vec<E>, StorageError> {
        // Hash-set walk: no ordering promise to the caller
        let wanted: HashSet<EntityId> = ids.iter().copied().collect();
        Ok(wanted
            .into_iter()
            .filter_map(|id| self.data.get(&id).map(|r| r.value().clone()))
            .collect())
    }

    async fn delete(&self, id: EntityId) -> Result<(), StorageError> {
        self.data.remove(&id);
        metrics::record_store_operation(E::KIND, "delete", "success");
        Ok(())
    }

    async fn query(&self, filter: &EqualityFilter) -> Result<Vec<E>, StorageError> {
        let mut matches: Vec<E> = self
            .data
            .iter()
            .filter(|r| r.value().matches(&filter.field, &filter.value))
            .map(|r| r.value().clone())
            .collect();
        matches.sort_by_key(|e| e.id());
        Ok(matches)
    }

    async fn query_page(
        &self,
        filter: Option<&EqualityFilter>,
        page_size: usize,
        cursor: Option<&str>,
    ) -> Result<Page<E>, StorageError> {
        let after = cursor.map(Self::decode_cursor).transpose()?;

        let mut ids: Vec<EntityId> = self
            .data
            .iter()
            .filter(|r| after.map_or(true, |a| *r.key() > a))
            .filter(|r| filter.map_or(true, |f| r.value().matches(&f.field, &f.value)))
            .map(|r| *r.key())
            .collect();
        ids.sort_unstable();

        let has_more = ids.len() > page_size;
        ids.truncate(page_size);

        let items: Vec<E> = ids
            .iter()
            .filter_map(|id| self.data.get(id).map(|r| r.value().clone()))
            .collect();

        let cursor = match (has_more, ids.last()) {
            (true, Some(last)) => Some(Self::encode_cursor(*last)),
            _ => None,
        };
        Ok(Page::new(items, cursor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::FieldValue;
    use crate::place::{fields, Place};

    async fn store_with(n: usize) -> InMemoryEntityStore<Place> {
        let store = InMemoryEntityStore::new();
        for i in 0..n {
            store.put(&mut Place::new(format!("place-{}", i))).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_new_store_is_empty() {
        let store: InMemoryEntityStore<Place> = InMemoryEntityStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_put_assigns_id_and_timestamps() {
        let store = InMemoryEntityStore::new();
        let mut place = Place::new("Cafe");

        let id = store.put(&mut place).await.unwrap();

        assert_eq!(place.id, Some(id));
        assert!(place.created_at > 0);
        let stored = store.get(id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Cafe");
    }

    #[tokio::test]
    async fn test_put_overwrites_existing_id() {
        let store = InMemoryEntityStore::new();
        let mut place = Place::new("v1");
        let id = store.put(&mut place).await.unwrap();

        place.name = "v2".into();
        let id2 = store.put(&mut place).await.unwrap();

        assert_eq!(id, id2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(id).await.unwrap().unwrap().name, "v2");
    }

    #[tokio::test]
    async fn test_get_nonexistent_returns_none() {
        let store: InMemoryEntityStore<Place> = InMemoryEntityStore::new();
        assert!(store.get(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_nonexistent_is_ok() {
        let store: InMemoryEntityStore<Place> = InMemoryEntityStore::new();
        assert!(store.delete(42).await.is_ok());
    }

    #[tokio::test]
    async fn test_get_many_skips_missing() {
        let store = InMemoryEntityStore::new();
        let mut a = Place::new("a");
        let mut b = Place::new("b");
        let a_id = store.put(&mut a).await.unwrap();
        let b_id = store.put(&mut b).await.unwrap();

        let mut found: Vec<_> = store
            .get_many(&[b_id, 999, a_id])
            .await
            .unwrap()
            .into_iter()
            .filter_map(|p| p.id)
            .collect();
        found.sort_unstable();
        assert_eq!(found, vec![a_id, b_id]);
    }

    #[tokio::test]
    async fn test_query_by_tag_membership() {
        let store = InMemoryEntityStore::new();
        store.put(&mut Place::new("one").with_tags([1, 2])).await.unwrap();
        store.put(&mut Place::new("two").with_tags([2])).await.unwrap();
        store.put(&mut Place::new("three")).await.unwrap();

        let tagged = store
            .query(&EqualityFilter::new(fields::TAGS, FieldValue::Id(2)))
            .await
            .unwrap();
        assert_eq!(tagged.len(), 2);
    }

    #[tokio::test]
    async fn test_pages_walk_all_items_once() {
        let store = store_with(5).await;
        let first = store.query_page(None, 2, None).await.unwrap();
        let second = store.query_page(None, 2, first.cursor.as_deref()).await.unwrap();
        let third = store.query_page(None, 2, second.cursor.as_deref()).await.unwrap();

        assert_eq!(first.items.len(), 2);
        assert_eq!(second.items.len(), 2);
        assert_eq!(third.items.len(), 1);
        assert!(third.cursor.is_none());

        let mut ids: Vec<_> = first
            .items
            .iter()
            .chain(&second.items)
            .chain(&third.items)
            .filter_map(|p| p.id)
            .collect();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[tokio::test]
    async fn test_exact_page_has_no_cursor() {
        let store = InMemoryEntityStore::new();
        store.put(&mut Place::new("a")).await.unwrap();
        store.put(&mut Place::new("b")).await.unwrap();

        let page = store.query_page(None, 2, None).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(page.cursor.is_none());
    }

    #[tokio::test]
    async fn test_filtered_page() {
        let store = InMemoryEntityStore::new();
        let parent = store.put(&mut Place::new("brand")).await.unwrap();
        store.put(&mut Place::new("branch").with_parent(parent)).await.unwrap();
        store.put(&mut Place::new("other")).await.unwrap();

        let filter = EqualityFilter::new(fields::PARENT_ID, parent);
        let page = store.query_page(Some(&filter), 10, None).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "branch");
    }

    #[tokio::test]
    async fn test_garbage_cursor_is_rejected() {
        let store: InMemoryEntityStore<Place> = InMemoryEntityStore::new();
        let result = store.query_page(None, 2, Some("not-hex")).await;
        assert!(matches!(result, Err(StorageError::InvalidCursor(_))));
    }

    #[tokio::test]
    async fn test_concurrent_access() {
        use std::sync::Arc;

        let store = Arc::new(InMemoryEntityStore::<Place>::new());
        let mut handles = vec![];

        for batch in 0..10 {
            let store_clone = store.clone();
            let handle = tokio::spawn(async move {
                for i in 0..10 {
                    let mut place = Place::new(format!("batch-{}-place-{}", batch, i));
                    store_clone.put(&mut place).await.unwrap();
                }
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.await.unwrap();
        }

        // Every put got its own id
        assert_eq!(store.len(), 100);
    }
}
