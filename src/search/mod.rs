// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search Infrastructure
//!
//! Text, tag and geo search over places through a secondary index.
//!
//! # Architecture
//!
//! ```text
//! QueryBuilder (text, tag ids, geo filter)
//!     ↓
//! SearchRequest { Query AST, SortSpec }
//!     ↓
//!     ├─→ ExpressionTranslator → boolean expression string
//!     └─→ SearchIndex::search → ranked ids + opaque cursor
//! ```
//!
//! Documents are [`SearchDocument`] projections of places, written only by
//! the [`PlaceIndexSynchronizer`](crate::synchronizer::PlaceIndexSynchronizer).
//!
//! # Query Language
//!
//! ```text
//! tags:3                                         - Tag id keyword
//! (name:pizza OR city:pizza)                     - Free text
//! distance(location, geopoint(59.3, 18.0)) < 500 - Geo radius (metres)
//! (tags:3 AND tags:7)                            - Every tag required
//! ```

mod document;
mod expression;
mod memory;
mod query_builder;
mod traits;

pub use document::{
    DocumentField, SearchDocument, FIELD_CITY, FIELD_LOCATION, FIELD_NAME, FIELD_TAGS,
};
pub use expression::ExpressionTranslator;
pub use memory::{haversine_distance, InMemorySearchIndex};
pub use query_builder::{
    DistanceQuery, GeoFilter, Query, QueryBuilder, QueryError, QueryNode, SearchRequest,
    SortDirection, SortExpression, SortSpec, TermQuery,
};
pub use traits::{SearchError, SearchHits, SearchIndex};
