// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Error taxonomy surfaced to callers.
//!
//! `NotFound`, `BadRequest` and `Conflict` are user-visible kinds the REST
//! layer maps to status codes. Transient index failures on the write path
//! never reach here: the synchronizer logs and swallows them.

use thiserror::Error;

use crate::entity::EntityId;
use crate::search::{QueryError, SearchError};
use crate::storage::StorageError;

pub type Result<T, E = DirectoryError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: EntityId },
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Search(#[from] SearchError),
}

impl DirectoryError {
    pub fn not_found(kind: &'static str, id: EntityId) -> Self {
        Self::NotFound { kind, id }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            Self::BadRequest(_)
                | Self::Storage(StorageError::InvalidCursor(_))
                | Self::Search(SearchError::InvalidCursor(_))
        )
    }

    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<QueryError> for DirectoryError {
    fn from(err: QueryError) -> Self {
        Self::BadRequest(err.to_string())
    }
}
