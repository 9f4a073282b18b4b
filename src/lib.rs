//! # Venue Directory
//!
//! Searchable directory of places (venues) with hierarchical tags.
//!
//! ## Architecture
//!
//! Places live in a primary entity store and are projected into a secondary
//! text+geo search index. Tags form one forest per tag type.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      VenueDirectory                         │
//! │  • Validation, paging defaults                             │
//! └─────────────────────────────────────────────────────────────┘
//!          │                    │                     │
//!          ▼                    ▼                     ▼
//! ┌──────────────────┐ ┌──────────────────┐ ┌──────────────────────┐
//! │ PlaceIndex-      │ │ ResultHydrator   │ │ TagHierarchyManager  │
//! │ Synchronizer     │ │ • ranked ids     │ │ • CRUD, cascade      │
//! │ • store, then    │ │ • bulk load      │ │ • per-type cached    │
//! │   index          │ │ • re-order       │ │   forest             │
//! └──────────────────┘ └──────────────────┘ └──────────────────────┘
//!          │                    │                     │
//!          ▼                    ▼                     ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  EntityStore<Place>   SearchIndex        EntityStore<Tag>   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The entity store is the system of record. The search index is an
//! eventually-consistent view: an index failure on write is logged and
//! reported, never rolled back.
//!
//! ## Quick Start
//!
//! ```rust
//! use venue_directory::{DirectoryConfig, GeoPoint, PageRequest, Place, VenueDirectory};
//!
//! #[tokio::main]
//! async fn main() -> venue_directory::Result<()> {
//!     let directory = VenueDirectory::in_memory(DirectoryConfig::default());
//!
//!     directory
//!         .create_place(Place::new("Harbour Fish").with_location(GeoPoint::new(59.91, 10.75)))
//!         .await?;
//!
//!     let nearby = directory
//!         .nearby_places(59.9105, 10.75, 500.0, &[], &PageRequest::first(10))
//!         .await?;
//!     assert_eq!(nearby.items.len(), 1);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`coordinator`]: The [`VenueDirectory`] facade
//! - [`synchronizer`]: Dual-store place writes
//! - [`hydrator`]: Search hits to ordered places
//! - [`tags`]: Tag forest, cache and cascading delete
//! - [`search`]: Query building, expressions, search index
//! - [`storage`]: Entity store trait and in-memory adapter

pub mod config;
pub mod coordinator;
pub mod entity;
pub mod error;
pub mod hydrator;
pub mod metrics;
pub mod outcome;
pub mod place;
pub mod search;
pub mod storage;
pub mod synchronizer;
pub mod tag;
pub mod tags;

// Note: We don't expose a `tracing` module to avoid conflict with the tracing crate

pub use config::DirectoryConfig;
pub use coordinator::{BatchResult, PageRequest, TagDeletion, VenueDirectory, WriteOutcome};
pub use entity::{Entity, EntityId, FieldValue, Identifiable, Timestamped};
pub use error::{DirectoryError, Result};
pub use hydrator::ResultHydrator;
pub use place::{GeoPoint, Place, PlaceId};
pub use search::{
    ExpressionTranslator, GeoFilter, InMemorySearchIndex, Query, QueryBuilder, SearchDocument,
    SearchError, SearchIndex, SearchRequest,
};
pub use storage::{EntityStore, EqualityFilter, InMemoryEntityStore, Page, StorageError};
pub use synchronizer::PlaceIndexSynchronizer;
pub use tag::{Tag, TagId};
pub use tags::{Forest, HierarchyCache, TagHierarchyManager, TagNode, TagUpdate};
pub use metrics::LatencyTimer;
