// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Tag API for VenueDirectory

use crate::error::Result;
use crate::tag::{Tag, TagId};
use crate::tags::{Forest, HierarchyCacheStats, TagUpdate};

use super::{TagDeletion, VenueDirectory};

impl VenueDirectory {
    /// Create a root tag, or a child when `tag.parent_id` is set.
    pub async fn create_tag(&self, tag: Tag) -> Result<Tag> {
        self.tags.create_tag(tag).await
    }

    pub async fn update_tag(&self, id: TagId, update: TagUpdate) -> Result<Tag> {
        self.tags.update_tag(id, update).await
    }

    pub async fn get_tag(&self, id: TagId) -> Result<Tag> {
        self.tags.get_tag(id).await
    }

    /// Delete a tag and its descendants, scrubbing them from every place.
    pub async fn delete_tag(&self, id: TagId) -> Result<TagDeletion> {
        self.tags.delete_tag(id).await
    }

    /// Tag forest for one type.
    pub async fn tag_hierarchy(&self, tag_type: &str) -> Result<Forest> {
        self.tags.hierarchy_for_type(tag_type).await
    }

    /// Direct children of a tag.
    pub async fn tags_for_parent(&self, parent_id: TagId) -> Result<Vec<Tag>> {
        self.tags.tags_for_parent(parent_id).await
    }

    /// `None` when the hierarchy cache is disabled
    #[must_use]
    pub fn hierarchy_cache_stats(&self) -> Option<HierarchyCacheStats> {
        self.tags.cache_stats()
    }
}
