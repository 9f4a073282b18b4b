// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for the venue directory.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The host service is responsible for choosing the exporter (Prometheus, OTEL, etc.)
//!
//! # Metric Naming Convention
//! - `venue_directory_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `kind`: place, tag
//! - `operation`: put, delete, upsert, remove, search
//! - `status`: success, error

use metrics::{counter, gauge, histogram};
use std::time::{Duration, Instant};

/// Record an entity store operation
pub fn record_store_operation(kind: &str, operation: &str, status: &str) {
    counter!(
        "venue_directory_store_operations_total",
        "kind" => kind.to_string(),
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a search index write (upsert/remove)
pub fn record_index_operation(operation: &str, success: bool) {
    counter!(
        "venue_directory_index_operations_total",
        "operation" => operation.to_string(),
        "status" => if success { "success" } else { "error" }.to_string()
    )
    .increment(1);
}

/// Record a search query outcome
pub fn record_search_query(kind: &str, status: &str) {
    counter!(
        "venue_directory_search_queries_total",
        "kind" => kind.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record search latency (index query plus hydration)
pub fn record_search_latency(kind: &str, duration: Duration) {
    histogram!(
        "venue_directory_search_seconds",
        "kind" => kind.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record number of hydrated results per page
pub fn record_search_results(count: usize) {
    histogram!("venue_directory_search_results").record(count as f64);
}

/// Record ranked ids the entity store could not return
pub fn record_hydration_misses(count: usize) {
    counter!("venue_directory_hydration_misses_total").increment(count as u64);
}

/// Record hierarchy cache hit/miss
pub fn record_hierarchy_cache(hit: bool) {
    counter!(
        "venue_directory_hierarchy_cache_total",
        "result" => if hit { "hit" } else { "miss" }.to_string()
    )
    .increment(1);
}

/// Set number of cached tag forests
pub fn set_hierarchy_cache_entries(count: usize) {
    gauge!("venue_directory_hierarchy_cache_entries").set(count as f64);
}

/// Record a cascading tag delete
pub fn record_tag_cascade(removed_tags: usize, scrubbed_places: usize) {
    histogram!("venue_directory_tag_cascade_size").record(removed_tags as f64);
    counter!("venue_directory_tag_reference_scrubs_total").increment(scrubbed_places as u64);
}

/// A timing guard that records search latency on drop
pub struct LatencyTimer {
    kind: &'static str,
    start: Instant,
}

impl LatencyTimer {
    /// Start a new latency timer
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            start: Instant::now(),
        }
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        record_search_latency(self.kind, self.start.elapsed());
    }
}
