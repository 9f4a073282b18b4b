// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Tag CRUD, cascading delete and the cached hierarchy view.
//!
//! # Cascading delete
//!
//! ```text
//! delete_tag(root)
//!   │
//!   ├─→ walk subtree (work stack, children by parent_id filter)
//!   │     pre-order: root, a, a1, b ...
//!   │
//!   ├─→ scrub place references, deepest first
//!   │     PlaceIndexSynchronizer::delete_tag_reference(id)
//!   │
//!   ├─→ delete all rows in one batch, bottom-up
//!   │
//!   └─→ invalidate cached forest for the type
//! ```
//!
//! Nothing here locks. A child created under a tag while that tag is being
//! deleted is caught by the parent re-check in [`TagHierarchyManager::create_tag`].

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::cache::{Forest, HierarchyCache, HierarchyCacheStats};
use super::hierarchy::build_forest;
use crate::error::{DirectoryError, Result};
use crate::metrics;
use crate::outcome::{BatchResult, TagDeletion};
use crate::synchronizer::PlaceIndexSynchronizer;
use crate::storage::{EntityStore, EqualityFilter};
use crate::tag::{fields, Tag, TagId};

/// Partial tag update. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagUpdate {
    pub tag_type: Option<String>,
    pub parent_id: Option<TagId>,
    pub name: Option<String>,
    pub image_url: Option<String>,
}

/// Owns tag writes and the per-type forest cache.
pub struct TagHierarchyManager {
    tags: Arc<dyn EntityStore<Tag>>,
    places: Arc<PlaceIndexSynchronizer>,
    cache: Option<HierarchyCache>,
}

impl TagHierarchyManager {
    /// `cache: None` rebuilds the forest on every hierarchy read.
    pub fn new(
        tags: Arc<dyn EntityStore<Tag>>,
        places: Arc<PlaceIndexSynchronizer>,
        cache: Option<HierarchyCache>,
    ) -> Self {
        Self { tags, places, cache }
    }

    pub fn cache_stats(&self) -> Option<HierarchyCacheStats> {
        self.cache.as_ref().map(HierarchyCache::stats)
    }

    pub async fn get_tag(&self, id: TagId) -> Result<Tag> {
        self.tags
            .get(id)
            .await?
            .ok_or_else(|| DirectoryError::not_found("tag", id))
    }

    /// Create a root or child tag. Any caller-supplied id is ignored.
    pub async fn create_tag(&self, mut tag: Tag) -> Result<Tag> {
        tag.id = None;
        tag.created_at = 0;
        validate_labels(&tag)?;
        if let Some(parent_id) = tag.parent_id {
            self.require_parent(parent_id, &tag.tag_type).await?;
        }

        let id = self.tags.put(&mut tag).await?;

        if let Some(parent_id) = tag.parent_id {
            if self.tags.get(parent_id).await?.is_none() {
                // Parent deleted while we were inserting; don't leave an orphan
                self.tags.delete(id).await?;
                self.invalidate(&tag.tag_type);
                warn!(id, parent_id, "Parent tag vanished during create");
                return Err(DirectoryError::Conflict(format!(
                    "parent tag {parent_id} was deleted concurrently"
                )));
            }
        }

        self.invalidate(&tag.tag_type);
        debug!(id, tag_type = %tag.tag_type, parent_id = ?tag.parent_id, "Tag created");
        Ok(tag)
    }

    pub async fn update_tag(&self, id: TagId, update: TagUpdate) -> Result<Tag> {
        let current = self.get_tag(id).await?;
        let old_type = current.tag_type.clone();

        let mut tag = current;
        if let Some(tag_type) = update.tag_type {
            tag.tag_type = tag_type;
        }
        if let Some(name) = update.name {
            tag.name = name;
        }
        if update.image_url.is_some() {
            tag.image_url = update.image_url;
        }
        if update.parent_id.is_some() {
            tag.parent_id = update.parent_id;
        }
        validate_labels(&tag)?;

        if let Some(parent_id) = tag.parent_id {
            if parent_id == id {
                return Err(DirectoryError::bad_request("a tag cannot be its own parent"));
            }
            self.require_parent(parent_id, &tag.tag_type).await?;
            if update.parent_id.is_some() {
                self.reject_cycle(id, parent_id).await?;
            }
        }

        if tag.tag_type != old_type {
            let children = self.children_of(id).await?;
            if !children.is_empty() {
                return Err(DirectoryError::bad_request(format!(
                    "tag {id} has {} children and cannot change type",
                    children.len()
                )));
            }
        }

        self.tags.put(&mut tag).await?;

        self.invalidate(&old_type);
        if tag.tag_type != old_type {
            self.invalidate(&tag.tag_type);
        }
        debug!(id, tag_type = %tag.tag_type, "Tag updated");
        Ok(tag)
    }

    /// Delete a tag with all its descendants and scrub every place reference.
    #[tracing::instrument(skip(self))]
    pub async fn delete_tag(&self, id: TagId) -> Result<TagDeletion> {
        let tag = self.get_tag(id).await?;
        let subtree = self.collect_subtree(id).await?;

        let mut references = BatchResult::default();
        for tag_id in subtree.iter().rev() {
            references.merge(self.places.delete_tag_reference(*tag_id).await?);
        }

        let bottom_up: Vec<TagId> = subtree.into_iter().rev().collect();
        self.tags.delete_many(&bottom_up).await?;
        self.invalidate(&tag.tag_type);

        metrics::record_tag_cascade(bottom_up.len(), references.succeeded);
        info!(
            id,
            removed = bottom_up.len(),
            places_scrubbed = references.succeeded,
            places_failed = references.failed,
            "Tag cascade completed"
        );

        Ok(TagDeletion {
            tag,
            removed: bottom_up,
            references,
        })
    }

    /// Forest of all tags of one type, served from cache when possible.
    pub async fn hierarchy_for_type(&self, tag_type: &str) -> Result<Forest> {
        let Some(cache) = &self.cache else {
            return Ok(Arc::new(build_forest(self.tags_of_type(tag_type).await?)));
        };

        if let Some(forest) = cache.get(tag_type) {
            return Ok(forest);
        }

        let generation = cache.generation(tag_type);
        let forest = Arc::new(build_forest(self.tags_of_type(tag_type).await?));
        if !cache.put(tag_type, generation, Arc::clone(&forest)) {
            debug!(tag_type, "Tag type changed while building; forest not cached");
        }
        Ok(forest)
    }

    /// Direct children of a tag.
    pub async fn tags_for_parent(&self, parent_id: TagId) -> Result<Vec<Tag>> {
        self.get_tag(parent_id).await?;
        self.children_of(parent_id).await
    }

    async fn tags_of_type(&self, tag_type: &str) -> Result<Vec<Tag>> {
        Ok(self
            .tags
            .query(&EqualityFilter::new(fields::TYPE, tag_type))
            .await?)
    }

    async fn children_of(&self, id: TagId) -> Result<Vec<Tag>> {
        Ok(self
            .tags
            .query(&EqualityFilter::new(fields::PARENT_ID, id))
            .await?)
    }

    async fn require_parent(&self, parent_id: TagId, tag_type: &str) -> Result<Tag> {
        let parent = self.get_tag(parent_id).await?;
        if parent.tag_type != tag_type {
            return Err(DirectoryError::bad_request(format!(
                "parent tag {parent_id} is of type '{}', not '{tag_type}'",
                parent.tag_type
            )));
        }
        Ok(parent)
    }

    /// Reject moving `id` under one of its own descendants.
    async fn reject_cycle(&self, id: TagId, new_parent: TagId) -> Result<()> {
        let mut seen = HashSet::new();
        let mut cursor = Some(new_parent);
        while let Some(ancestor) = cursor {
            if ancestor == id {
                return Err(DirectoryError::bad_request(format!(
                    "tag {new_parent} is a descendant of tag {id}"
                )));
            }
            if !seen.insert(ancestor) {
                break;
            }
            cursor = self.tags.get(ancestor).await?.and_then(|t| t.parent_id);
        }
        Ok(())
    }

    /// Subtree ids in pre-order, root first.
    async fn collect_subtree(&self, root: TagId) -> Result<Vec<TagId>> {
        let mut order = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![root];

        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            order.push(id);
            for child in self.children_of(id).await? {
                if let Some(child_id) = child.id {
                    stack.push(child_id);
                }
            }
        }
        Ok(order)
    }

    fn invalidate(&self, tag_type: &str) {
        if let Some(cache) = &self.cache {
            cache.invalidate(tag_type);
        }
    }
}

fn validate_labels(tag: &Tag) -> Result<()> {
    if tag.name.trim().is_empty() {
        return Err(DirectoryError::bad_request("tag name must not be blank"));
    }
    if tag.tag_type.trim().is_empty() {
        return Err(DirectoryError::bad_request("tag type must not be blank"));
    }
    Ok(())
}
