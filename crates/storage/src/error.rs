// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors from document store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("document already exists: {0}")]
    Conflict(String),

    #[error("version conflict on {id}: expected {expected}, found {actual}")]
    VersionConflict { id: String, expected: u64, actual: u64 },

    #[error("operation cancelled")]
    Cancelled,

    #[error("gave up after {attempts} attempts: {}", last_error(.errors))]
    RetriesExhausted { attempts: u32, errors: Vec<StoreError> },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Conflicts are resolved by re-reading and trying again.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict(_) | StoreError::VersionConflict { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, StoreError::Cancelled)
    }
}

fn last_error(errors: &[StoreError]) -> String {
    errors.last().map(ToString::to_string).unwrap_or_else(|| "no errors recorded".to_string())
}
