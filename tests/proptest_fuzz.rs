//! Property-based tests (fuzzing) for the venue directory.
//!
//! Uses proptest to generate random forests, tag sets and malformed inputs,
//! and checks the directory keeps its invariants and only returns clean
//! errors.
//!
//! Run with: `cargo test --test proptest_fuzz`

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use proptest::prelude::*;

use venue_directory::tags::build_forest;
use venue_directory::{
    DirectoryConfig, DirectoryError, EntityStore, ExpressionTranslator, GeoFilter, GeoPoint,
    InMemoryEntityStore, InMemorySearchIndex, PageRequest, Place, PlaceIndexSynchronizer,
    QueryBuilder, Tag, TagId, TagNode, VenueDirectory,
};

// =============================================================================
// Strategies for generating test data
// =============================================================================

/// Random forest as `parents[i]`: `None` for a root, else an index below `i`
fn forest_strategy() -> impl Strategy<Value = Vec<Option<usize>>> {
    prop::collection::vec(any::<Option<prop::sample::Index>>(), 0..60).prop_map(|picks| {
        picks
            .into_iter()
            .enumerate()
            .map(|(i, pick)| match pick {
                Some(index) if i > 0 => Some(index.index(i)),
                _ => None,
            })
            .collect()
    })
}

fn tags_from_parents(parents: &[Option<usize>]) -> Vec<Tag> {
    parents
        .iter()
        .enumerate()
        .map(|(i, parent)| Tag {
            id: Some(i as TagId + 1),
            parent_id: parent.map(|p| p as TagId + 1),
            ..Tag::new("location", format!("tag {i}"))
        })
        .collect()
}

fn text() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[A-Za-z0-9 ,.'-]{0,40}")
}

prop_compose! {
    /// A valid, unsaved root place with every optional field in play
    fn place_strategy()(
        name in "[A-Za-z][A-Za-z0-9 ]{0,30}",
        descriptions in (text(), text()),
        opening_hours in prop::collection::vec("[0-9:-]{0,11}", 0..8),
        tags in prop::collection::btree_set(1u64..1000, 0..6),
        address in (text(), text(), text(), text(), text(), text()),
        location in prop::option::of((-90.0f64..=90.0, -180.0f64..=180.0)),
        contact in (text(), text(), text(), text(), text()),
        logo_url in text(),
        image_urls in prop::collection::vec("https://[a-z]{1,10}\\.example/[a-z0-9]{1,8}", 0..4),
    ) -> Place {
        let (short_description, description) = descriptions;
        let (street, city_area, city, county, postal_code, country) = address;
        let (phone_number, email, web_url, facebook_url, twitter_url) = contact;
        Place {
            id: None,
            parent_id: None,
            name,
            short_description,
            description,
            opening_hours,
            tags,
            street,
            city_area,
            city,
            county,
            postal_code,
            country,
            location: location.map(|(lat, lon)| GeoPoint::new(lat, lon)),
            phone_number,
            email,
            web_url,
            facebook_url,
            twitter_url,
            logo_url,
            image_urls,
            created_at: 0,
            updated_at: 0,
        }
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

/// Record every (parent, child) edge and node id seen in a forest
fn walk(nodes: &[TagNode], parent: Option<TagId>, edges: &mut Vec<(Option<TagId>, TagId)>) {
    for node in nodes {
        let id = node.tag.id.unwrap();
        edges.push((parent, id));
        walk(&node.children, Some(id), edges);
    }
}

// =============================================================================
// Hierarchy
// =============================================================================

proptest! {
    /// Every node's children are exactly the tags pointing at it
    #[test]
    fn fuzz_forest_children_match_parent_ids(
        (parents, order) in forest_strategy().prop_flat_map(|parents| {
            let n = parents.len();
            (Just(parents), Just((0..n).collect::<Vec<_>>()).prop_shuffle())
        })
    ) {
        let tags = tags_from_parents(&parents);
        let shuffled: Vec<Tag> = order.iter().map(|&i| tags[i].clone()).collect();

        let forest = build_forest(shuffled);
        let mut edges = Vec::new();
        walk(&forest, None, &mut edges);

        // Each tag appears once
        let seen: HashSet<TagId> = edges.iter().map(|(_, id)| *id).collect();
        prop_assert_eq!(seen.len(), edges.len());
        prop_assert_eq!(edges.len(), tags.len());

        // The parent it is attached under is its own parent_id
        let expected: HashMap<TagId, Option<TagId>> =
            tags.iter().map(|t| (t.id.unwrap(), t.parent_id)).collect();
        for (parent, id) in &edges {
            prop_assert_eq!(expected[id], *parent);
        }
    }

    /// The cached view served by the directory matches a fresh build
    #[test]
    fn fuzz_directory_hierarchy_matches_store(parents in forest_strategy()) {
        runtime().block_on(async {
            let dir = VenueDirectory::in_memory(DirectoryConfig::default());
            let mut ids: Vec<TagId> = Vec::new();
            for (i, parent) in parents.iter().enumerate() {
                let mut tag = Tag::new("location", format!("tag {i}"));
                tag.parent_id = parent.map(|p| ids[p]);
                let created = dir.create_tag(tag).await.unwrap();
                ids.push(created.id.unwrap());
                // Read between writes so stale cache entries would show up
                dir.tag_hierarchy("location").await.unwrap();
            }

            let forest = dir.tag_hierarchy("location").await.unwrap();
            let mut edges = Vec::new();
            walk(&forest, None, &mut edges);
            prop_assert_eq!(edges.len(), parents.len());

            for (parent, id) in edges {
                let tag = dir.get_tag(id).await.unwrap();
                prop_assert_eq!(tag.parent_id, parent);
            }
            Ok(())
        })?;
    }
}

// =============================================================================
// Persistence
// =============================================================================

proptest! {
    /// Reading a created place back returns every field as written
    #[test]
    fn fuzz_created_place_reads_back_unchanged(original in place_strategy()) {
        runtime().block_on(async {
            let dir = VenueDirectory::in_memory(DirectoryConfig::default());
            let (created, outcome) = dir.create_place(original.clone()).await.unwrap();
            prop_assert!(outcome.is_synced());

            let stored = dir.get_place(outcome.id).await.unwrap();
            prop_assert_eq!(&stored, &created);

            // Mask the fields the store assigns
            let mut masked = stored;
            prop_assert_eq!(masked.id, Some(outcome.id));
            prop_assert!(masked.created_at > 0);
            masked.id = None;
            masked.created_at = 0;
            masked.updated_at = 0;
            prop_assert_eq!(masked, original);
            Ok(())
        })?;
    }
}

// =============================================================================
// Reference removal
// =============================================================================

proptest! {
    /// Scrubbing a tag twice leaves the same places as scrubbing once
    #[test]
    fn fuzz_tag_reference_removal_is_idempotent(
        tag_sets in prop::collection::vec(prop::collection::btree_set(1u64..8, 0..5), 1..20),
        target in 1u64..8,
    ) {
        runtime().block_on(async {
            let store = Arc::new(InMemoryEntityStore::<Place>::new());
            let index = Arc::new(InMemorySearchIndex::new());
            let sync = PlaceIndexSynchronizer::new(store.clone(), index);

            let mut ids = Vec::new();
            for (i, tags) in tag_sets.iter().enumerate() {
                let mut place = Place::new(format!("p{i}")).with_tags(tags.iter().copied());
                ids.push(sync.persist(&mut place).await.unwrap().id);
            }

            let snapshot = |places: Vec<Place>| {
                let mut tags: Vec<(u64, BTreeSet<TagId>)> = places
                    .into_iter()
                    .map(|p| (p.id.unwrap(), p.tags))
                    .collect();
                tags.sort();
                tags
            };

            let first = sync.delete_tag_reference(target).await.unwrap();
            let once = snapshot(store.get_many(&ids).await.unwrap());
            let second = sync.delete_tag_reference(target).await.unwrap();
            let twice = snapshot(store.get_many(&ids).await.unwrap());

            let carrying = tag_sets.iter().filter(|t| t.contains(&target)).count();
            prop_assert_eq!(first.total, carrying);
            prop_assert_eq!(second.total, 0);
            prop_assert_eq!(&once, &twice);
            prop_assert!(once.iter().all(|(_, tags)| !tags.contains(&target)));
            Ok(())
        })?;
    }
}

// =============================================================================
// Query building and input fuzzing
// =============================================================================

proptest! {
    /// The builder never panics: it yields a query or a BadRequest
    #[test]
    fn fuzz_query_builder_never_panics(
        text in prop::option::of(".*"),
        tags in prop::collection::vec(any::<u64>(), 0..6),
        geo in prop::option::of((any::<f64>(), any::<f64>(), any::<f64>())),
    ) {
        let mut builder = QueryBuilder::new().maybe_text(text.as_deref()).tags(tags.clone());
        if let Some((lat, lon, radius)) = geo {
            builder = builder.near(GeoFilter::new(lat, lon, radius));
        }

        match builder.build() {
            Ok(request) => {
                let expression = ExpressionTranslator::translate(&request.query);
                prop_assert!(!expression.is_empty());
                prop_assert_eq!(request.sort.is_some(), geo.is_some());
            }
            Err(err) => {
                let err: DirectoryError = err.into();
                prop_assert!(err.is_bad_request());
            }
        }
    }

    /// Arbitrary cursor strings are rejected cleanly, never panic
    #[test]
    fn fuzz_cursor_tokens(cursor in ".*") {
        runtime().block_on(async {
            let dir = VenueDirectory::in_memory(DirectoryConfig::default());
            dir.create_place(Place::new("Only")).await.unwrap();
            let request = PageRequest::first(5).next(cursor);

            if let Err(err) = dir.list_places(&request).await {
                prop_assert!(err.is_bad_request());
            }
            if let Err(err) = dir.search_places_by_text("only", &[], &request).await {
                prop_assert!(err.is_bad_request());
            }
            Ok(())
        })?;
    }

    /// Place deserialization should never panic on arbitrary bytes
    #[test]
    fn fuzz_place_from_random_bytes(bytes in prop::collection::vec(any::<u8>(), 0..2000)) {
        let _ = serde_json::from_slice::<Place>(&bytes);
    }
}
