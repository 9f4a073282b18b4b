// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Tag record.
//!
//! Tags are partitioned by `tag_type` ("location", "category", ...) into
//! independent forests. A child always points at a parent of the same type.

use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityId, FieldValue, Identifiable, Timestamped};

pub type TagId = EntityId;

/// Equality-filterable tag fields.
pub mod fields {
    pub const TYPE: &str = "type";
    pub const PARENT_ID: &str = "parent_id";
    pub const NAME: &str = "name";
}

/// A typed, hierarchical classification label.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default)]
    pub id: Option<TagId>,
    /// Forest this tag belongs to, e.g. "location"
    #[serde(rename = "type")]
    pub tag_type: String,
    #[serde(default)]
    pub parent_id: Option<TagId>,
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl Tag {
    pub fn new(tag_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            tag_type: tag_type.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_parent(mut self, parent_id: TagId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

impl Identifiable for Tag {
    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }
}

impl Timestamped for Tag {
    fn created_at(&self) -> i64 {
        self.created_at
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn touch(&mut self, now_millis: i64) {
        if self.created_at == 0 {
            self.created_at = now_millis;
        }
        self.updated_at = now_millis;
    }
}

impl Entity for Tag {
    const KIND: &'static str = "tag";

    fn field_values(&self, field: &str) -> Vec<FieldValue> {
        match field {
            fields::TYPE => vec![FieldValue::Text(self.tag_type.clone())],
            fields::PARENT_ID => vec![FieldValue::from(self.parent_id)],
            fields::NAME => vec![FieldValue::Text(self.name.clone())],
            _ => Vec::new(),
        }
    }
}
