// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Public types for the venue directory coordinator.

/// Page request for paginated listings and searches.
///
/// Pass no cursor for the first page, then the exact token from the
/// previous page. A `page_size` of 0 means the configured default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub cursor: Option<String>,
    pub page_size: usize,
}

impl PageRequest {
    #[must_use]
    pub fn first(page_size: usize) -> Self {
        Self {
            cursor: None,
            page_size,
        }
    }

    /// Request the page following the one that returned `cursor`
    #[must_use]
    pub fn next(&self, cursor: impl Into<String>) -> Self {
        Self {
            cursor: Some(cursor.into()),
            page_size: self.page_size,
        }
    }
}
