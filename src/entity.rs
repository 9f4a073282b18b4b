// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Entity capability traits.
//!
//! Places and tags are flat records. Storage adapters only see them through
//! the capabilities below, so one [`EntityStore`](crate::storage::EntityStore)
//! implementation serves both.

use std::time::{SystemTime, UNIX_EPOCH};

/// Store-assigned entity identifier.
pub type EntityId = u64;

/// Something the entity store can key by id.
pub trait Identifiable {
    /// Store-assigned id, `None` until first persisted.
    fn id(&self) -> Option<EntityId>;
    fn set_id(&mut self, id: EntityId);
}

/// Something carrying creation/update timestamps (epoch millis).
pub trait Timestamped {
    fn created_at(&self) -> i64;
    fn updated_at(&self) -> i64;

    /// Stamp a write. Sets `created_at` on first write only.
    fn touch(&mut self, now_millis: i64);
}

/// Scalar value used by equality filters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldValue {
    Id(EntityId),
    Text(String),
    /// Matches an absent optional field (e.g. a root tag's parent).
    Null,
}

impl From<EntityId> for FieldValue {
    fn from(id: EntityId) -> Self {
        FieldValue::Id(id)
    }
}

impl From<Option<EntityId>> for FieldValue {
    fn from(id: Option<EntityId>) -> Self {
        id.map_or(FieldValue::Null, FieldValue::Id)
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        FieldValue::Text(text.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        FieldValue::Text(text)
    }
}

/// A record an [`EntityStore`](crate::storage::EntityStore) can hold.
pub trait Entity: Identifiable + Timestamped + Clone + Send + Sync + 'static {
    /// Entity kind, used in logs, metrics and error messages.
    const KIND: &'static str;

    /// Values of `field` for equality filtering.
    ///
    /// Multi-valued fields return every member; a filter matches when any
    /// member equals the filter value. Unknown fields return an empty list.
    fn field_values(&self, field: &str) -> Vec<FieldValue>;

    /// Whether this entity satisfies `field == value`.
    fn matches(&self, field: &str, value: &FieldValue) -> bool {
        self.field_values(field).iter().any(|v| v == value)
    }
}

/// Current wall clock in epoch millis.
pub(crate) fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
