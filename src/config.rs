// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Configuration for the venue directory.
//!
//! # Example
//!
//! ```
//! use venue_directory::DirectoryConfig;
//!
//! // Minimal config (uses defaults)
//! let config = DirectoryConfig::default();
//! assert_eq!(config.default_page_size, 20);
//!
//! // Custom config
//! let config = DirectoryConfig {
//!     max_page_size: 50,
//!     hierarchy_cache_enabled: false,
//!     ..Default::default()
//! };
//! assert_eq!(config.effective_page_size(0), 20);
//! assert_eq!(config.effective_page_size(500), 50);
//! ```

use serde::Deserialize;

/// Configuration for the venue directory.
///
/// All fields have sensible defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryConfig {
    /// Page size used when a caller asks for 0 (default: 20)
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Larger page requests are clamped to this (default: 100)
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,

    /// Cache built tag forests per tag type (default: true)
    #[serde(default = "default_hierarchy_cache_enabled")]
    pub hierarchy_cache_enabled: bool,

    /// Max tag types with a cached forest; oldest evicted first (default: 256)
    #[serde(default = "default_hierarchy_cache_max_types")]
    pub hierarchy_cache_max_types: usize,
}

fn default_page_size() -> usize { 20 }
fn default_max_page_size() -> usize { 100 }
fn default_hierarchy_cache_enabled() -> bool { true }
fn default_hierarchy_cache_max_types() -> usize { 256 }

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            hierarchy_cache_enabled: default_hierarchy_cache_enabled(),
            hierarchy_cache_max_types: default_hierarchy_cache_max_types(),
        }
    }
}

impl DirectoryConfig {
    /// Resolve a requested page size against the configured bounds
    #[must_use]
    pub fn effective_page_size(&self, requested: usize) -> usize {
        let max = self.max_page_size.max(1);
        match requested {
            0 => self.default_page_size.clamp(1, max),
            n => n.min(max),
        }
    }
}
