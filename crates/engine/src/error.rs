// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::hooks::HookError;
use ef_core::{DemandError, JobId};
use ef_storage::StoreError;
use thiserror::Error;

/// Errors surfaced by the orchestrator and job service
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("store error: {0}")]
    Store(StoreError),

    #[error("demand error: {0}")]
    Demand(#[from] DemandError),

    #[error("job event handler failed: {0}")]
    Hook(#[from] HookError),

    #[error("job not found: {0}")]
    NotFound(JobId),

    #[error("operation cancelled")]
    Cancelled,
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Cancelled => EngineError::Cancelled,
            other => EngineError::Store(other),
        }
    }
}

impl EngineError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, EngineError::Cancelled)
    }
}
