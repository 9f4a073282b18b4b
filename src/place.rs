// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Place record.
//!
//! A [`Place`] is the venue being searched and browsed. It is owned by the
//! entity store and only ever written through the
//! [`PlaceIndexSynchronizer`](crate::synchronizer::PlaceIndexSynchronizer),
//! which keeps its search document in step.
//!
//! # Example
//!
//! ```
//! use venue_directory::{Place, GeoPoint};
//!
//! let place = Place::new("Blue Door Cafe")
//!     .with_city("Bangkok")
//!     .with_tags([3, 7])
//!     .with_location(GeoPoint::new(13.7563, 100.5018));
//!
//! assert!(place.id.is_none());
//! assert!(place.tags.contains(&7));
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityId, FieldValue, Identifiable, Timestamped};
use crate::tag::TagId;

pub type PlaceId = EntityId;

/// Equality-filterable place fields.
pub mod fields {
    pub const PARENT_ID: &str = "parent_id";
    pub const TAGS: &str = "tags";
    pub const NAME: &str = "name";
    pub const CITY: &str = "city";
}

/// Latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Both coordinates finite and inside their ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// A venue in the directory.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Place {
    /// Assigned by the entity store on first persist
    #[serde(default)]
    pub id: Option<PlaceId>,
    /// Owning place (e.g. a brand for a branch)
    #[serde(default)]
    pub parent_id: Option<PlaceId>,
    pub name: String,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// One entry per weekday
    #[serde(default)]
    pub opening_hours: Vec<String>,
    /// Tag ids, unordered and without duplicates
    #[serde(default)]
    pub tags: BTreeSet<TagId>,

    // Address
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city_area: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub county: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub location: Option<GeoPoint>,

    // Contact
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
    #[serde(default)]
    pub facebook_url: Option<String>,
    #[serde(default)]
    pub twitter_url: Option<String>,

    // Images
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,

    /// Epoch millis, set by the store
    #[serde(default)]
    pub created_at: i64,
    /// Epoch millis, set by the store
    #[serde(default)]
    pub updated_at: i64,
}

impl Place {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = TagId>) -> Self {
        self.tags.extend(tags);
        self
    }

    pub fn with_location(mut self, location: GeoPoint) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_parent(mut self, parent_id: PlaceId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Remove a tag id. Returns whether it was present.
    pub fn remove_tag(&mut self, tag_id: TagId) -> bool {
        self.tags.remove(&tag_id)
    }

    /// Copy server-managed fields from the stored version onto an update.
    pub(crate) fn inherit_server_fields(&mut self, stored: &Place) {
        self.id = stored.id;
        self.created_at = stored.created_at;
    }
}

impl Identifiable for Place {
    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }
}

impl Timestamped for Place {
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

impl Entity for Place {
    const KIND: &'static str = "place";

    fn field_values(&self, field: &str) -> Vec<FieldValue> {
        match field {
            fields::PARENT_ID => vec![FieldValue::from(self.parent_id)],
            fields::TAGS => self.tags.iter().map(|t| FieldValue::Id(*t)).collect(),
            fields::NAME => vec![FieldValue::Text(self.name.clone())],
            fields::CITY => vec![self.city.clone().map_or(FieldValue::Null, FieldValue::Text)],
            _ => Vec::new(),
        }
    }
}
