// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search Document
//!
//! The index-side projection of a [`Place`]. Never edited on its own: it is
//! regenerated wholesale from the place on every write.
//!
//! ```text
//! id        = place id
//! name      TEXT   (when non-empty)
//! city      TEXT   (when non-empty)
//! tags      TEXT   tag ids space-joined, e.g. "3 7 12"
//! location  GEO    (when the place has one)
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::place::{GeoPoint, Place, PlaceId};

pub const FIELD_NAME: &str = "name";
pub const FIELD_CITY: &str = "city";
pub const FIELD_TAGS: &str = "tags";
pub const FIELD_LOCATION: &str = "location";

/// Field value stored in a search document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DocumentField {
    /// Full-text searchable field
    Text(String),
    /// Geographic point
    Geo(GeoPoint),
}

/// Search index document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchDocument {
    /// Same id as the place it projects
    pub id: PlaceId,
    pub fields: BTreeMap<String, DocumentField>,
}

impl SearchDocument {
    /// Create an empty document
    pub fn new(id: PlaceId) -> Self {
        Self {
            id,
            fields: BTreeMap::new(),
        }
    }

    /// Add a text field. Empty values are skipped.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.fields.insert(name.into(), DocumentField::Text(value));
        }
        self
    }

    /// Add a geo field
    pub fn geo(mut self, name: impl Into<String>, point: GeoPoint) -> Self {
        self.fields.insert(name.into(), DocumentField::Geo(point));
        self
    }

    /// Project a persisted place. Returns `None` when the place has no id yet.
    pub fn from_place(place: &Place) -> Option<Self> {
        let id = place.id?;
        let tags = place
            .tags
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(" ");

        let mut doc = Self::new(id)
            .text(FIELD_NAME, place.name.as_str())
            .text(FIELD_CITY, place.city.clone().unwrap_or_default())
            .text(FIELD_TAGS, tags);
        if let Some(location) = place.location {
            doc = doc.geo(FIELD_LOCATION, location);
        }
        Some(doc)
    }

    /// Text value of a field, if it is a text field
    pub fn text_field(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(DocumentField::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Point value of a field, if it is a geo field
    pub fn geo_field(&self, name: &str) -> Option<GeoPoint> {
        match self.fields.get(name) {
            Some(DocumentField::Geo(point)) => Some(*point),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsaved_place_has_no_document() {
        assert!(SearchDocument::from_place(&Place::new("Draft")).is_none());
    }

    #[test]
    fn test_full_projection() {
        let mut place = Place::new("Blue Door")
            .with_city("Bangkok")
            .with_tags([12, 3, 7])
            .with_location(GeoPoint::new(13.75, 100.5));
        place.id = Some(9);
        place.description = Some("not indexed".into());

        let doc = SearchDocument::from_place(&place).unwrap();

        assert_eq!(doc.id, 9);
        assert_eq!(doc.text_field(FIELD_NAME), Some("Blue Door"));
        assert_eq!(doc.text_field(FIELD_CITY), Some("Bangkok"));
        assert_eq!(doc.text_field(FIELD_TAGS), Some("3 7 12"));
        assert_eq!(doc.geo_field(FIELD_LOCATION), Some(GeoPoint::new(13.75, 100.5)));
        assert_eq!(doc.fields.len(), 4);
    }

    #[test]
    fn test_missing_fields_are_omitted() {
        let mut place = Place::new("Bare");
        place.id = Some(1);

        let doc = SearchDocument::from_place(&place).unwrap();

        assert!(doc.text_field(FIELD_CITY).is_none());
        assert!(doc.text_field(FIELD_TAGS).is_none());
        assert!(doc.geo_field(FIELD_LOCATION).is_none());
    }
}
