// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query Builder - AST for place searches
//!
//! Turns the three search criteria a caller can supply (free text, tag ids,
//! geo filter) into one boolean query plus an optional sort.
//!
//! # Rules
//!
//! - Tag ids are ANDed: a hit must carry every listed tag.
//! - Free text expands to `(name:text OR city:text)` and is ANDed with the rest.
//! - A geo filter adds `distance(location, origin) < radius` and a sort by
//!   ascending distance whose default (for documents without a location) is
//!   `radius + 1`, so they always rank after genuine nearby matches.
//! - Blank text and empty tag lists count as absent. With nothing left the
//!   builder refuses to build rather than matching everything.
//!
//! # Example
//!
//! ```rust
//! use venue_directory::search::{GeoFilter, QueryBuilder, QueryNode};
//!
//! let request = QueryBuilder::new()
//!     .tags([3])
//!     .near(GeoFilter::new(59.33, 18.06, 500.0))
//!     .build()
//!     .unwrap();
//!
//! assert!(matches!(request.query.root, QueryNode::And(_)));
//! assert_eq!(request.sort.unwrap().default_value, 501.0);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::place::GeoPoint;
use crate::tag::TagId;
use super::document::{FIELD_CITY, FIELD_LOCATION, FIELD_NAME, FIELD_TAGS};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("No search criteria supplied")]
    NoCriteria,
    #[error("Invalid geo filter: {0}")]
    InvalidGeoFilter(String),
}

/// Search query AST
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Root query node
    pub root: QueryNode,
}

impl Query {
    /// Create a new query from a root node
    pub fn new(root: QueryNode) -> Self {
        Self { root }
    }

    /// Create a term query: field:value
    pub fn term(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(QueryNode::Term(TermQuery {
            field: field.into(),
            value: value.into(),
        }))
    }

    /// Create a distance query: distance(field, geopoint(lat, lon)) < radius
    pub fn within(field: impl Into<String>, origin: GeoPoint, radius: f64) -> Self {
        Self::new(QueryNode::Distance(DistanceQuery {
            field: field.into(),
            origin,
            radius,
        }))
    }

    /// Combine with AND
    pub fn and(self, other: Query) -> Self {
        Self::new(QueryNode::And(vec![self.root, other.root]))
    }

    /// Combine with OR
    pub fn or(self, other: Query) -> Self {
        Self::new(QueryNode::Or(vec![self.root, other.root]))
    }
}

/// Query AST node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryNode {
    /// Keyword match on a text field: field:value
    Term(TermQuery),
    /// Geo distance strictly below a radius in metres
    Distance(DistanceQuery),
    /// Boolean AND: (query1 AND query2)
    And(Vec<QueryNode>),
    /// Boolean OR: (query1 OR query2)
    Or(Vec<QueryNode>),
}

/// Term query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermQuery {
    /// Field name (e.g., "name", "city", "tags")
    pub field: String,
    /// Text to match; every word must occur in the field
    pub value: String,
}

/// Geo distance query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceQuery {
    /// Geo field name
    pub field: String,
    pub origin: GeoPoint,
    /// Exclusive upper bound in metres
    pub radius: f64,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Value a sort orders by
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SortExpression {
    /// Distance in metres from `origin` to the document's `field`
    Distance { field: String, origin: GeoPoint },
}

/// Sort specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortSpec {
    pub expression: SortExpression,
    pub direction: SortDirection,
    /// Used for documents the expression cannot be evaluated on
    pub default_value: f64,
}

/// Nearby filter: origin plus radius in metres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoFilter {
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f64,
}

impl GeoFilter {
    pub fn new(latitude: f64, longitude: f64, radius: f64) -> Self {
        Self {
            latitude,
            longitude,
            radius,
        }
    }

    pub fn origin(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    fn validate(&self) -> Result<(), QueryError> {
        if !self.origin().is_valid() {
            return Err(QueryError::InvalidGeoFilter(format!(
                "coordinates out of range: ({}, {})",
                self.latitude, self.longitude
            )));
        }
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(QueryError::InvalidGeoFilter(format!(
                "radius must be positive: {}",
                self.radius
            )));
        }
        Ok(())
    }
}

/// A built query ready for the search index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: Query,
    pub sort: Option<SortSpec>,
}

/// Builder for place search queries
#[derive(Debug, Default, Clone)]
pub struct QueryBuilder {
    text: Option<String>,
    tag_ids: Vec<TagId>,
    geo: Option<GeoFilter>,
}

impl QueryBuilder {
    /// Create a new query builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Free text matched against name and city. Blank text is ignored.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        let trimmed = text.trim();
        self.text = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }

    /// Optional variant of [`QueryBuilder::text`]
    pub fn maybe_text(self, text: Option<&str>) -> Self {
        match text {
            Some(text) => self.text(text),
            None => self,
        }
    }

    /// Tag ids a hit must all carry. Duplicates are dropped, order kept.
    pub fn tags(mut self, tag_ids: impl IntoIterator<Item = TagId>) -> Self {
        for id in tag_ids {
            if !self.tag_ids.contains(&id) {
                self.tag_ids.push(id);
            }
        }
        self
    }

    /// Restrict to a radius around a point and sort by distance
    pub fn near(mut self, geo: GeoFilter) -> Self {
        self.geo = Some(geo);
        self
    }

    /// Build the query. Fails when no criterion is left.
    pub fn build(self) -> Result<SearchRequest, QueryError> {
        let mut nodes: Vec<QueryNode> = self
            .tag_ids
            .iter()
            .map(|id| Query::term(FIELD_TAGS, id.to_string()).root)
            .collect();

        if let Some(text) = &self.text {
            let text_query = Query::term(FIELD_NAME, text.as_str())
                .or(Query::term(FIELD_CITY, text.as_str()));
            nodes.push(text_query.root);
        }

        let mut sort = None;
        if let Some(geo) = self.geo {
            geo.validate()?;
            nodes.push(Query::within(FIELD_LOCATION, geo.origin(), geo.radius).root);
            sort = Some(SortSpec {
                expression: SortExpression::Distance {
                    field: FIELD_LOCATION.to_string(),
                    origin: geo.origin(),
                },
                direction: SortDirection::Ascending,
                default_value: geo.radius + 1.0,
            });
        }

        let root = match nodes.len() {
            0 => return Err(QueryError::NoCriteria),
            1 => nodes.remove(0),
            _ => QueryNode::And(nodes),
        };

        Ok(SearchRequest {
            query: Query::new(root),
            sort,
        })
    }
}
