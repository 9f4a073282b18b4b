// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Primary entity storage.
//!
//! [`EntityStore`] is the narrow contract the directory needs from its
//! system of record; [`InMemoryEntityStore`] is the embedded implementation.

pub mod memory;
pub mod traits;

pub use memory::InMemoryEntityStore;
pub use traits::{EntityStore, EqualityFilter, Page, StorageError};
