// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker liveness records, upserted from supervisor heartbeats.

use crate::document::{DocumentStore, Page, Versioned};
use crate::error::StoreError;
use crate::memory::MemoryStore;
use crate::retry::{check_cancelled, retry_on_conflict, RetryPolicy};
use ef_core::{SupervisorHeartbeat, WorkerId, WorkerStatus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Attempts before a liveness upsert gives up and surfaces every error.
pub const WORKER_UPSERT_RETRIES: u32 = 10;

/// Last known liveness of a worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerRecord {
    pub id: WorkerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub status: WorkerStatus,
    /// Epoch ms of the first heartbeat since registration
    pub first_seen_ms: u64,
    pub last_seen_ms: u64,
}

#[derive(Clone)]
pub struct WorkerRepository {
    store: Arc<dyn DocumentStore<WorkerRecord>>,
}

impl WorkerRepository {
    pub fn new(store: Arc<dyn DocumentStore<WorkerRecord>>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::<WorkerRecord>::new()))
    }

    /// Record a supervisor heartbeat received at `now_ms`.
    pub async fn heartbeat(
        &self,
        supervisor: &SupervisorHeartbeat,
        now_ms: u64,
        cancel: &CancellationToken,
    ) -> Result<WorkerRecord, StoreError> {
        let store = &self.store;
        let id = supervisor.supervisor_id.as_str();
        let policy = RetryPolicy::Bounded(WORKER_UPSERT_RETRIES);
        let result = retry_on_conflict(policy, cancel, move || async move {
            let existing = store.find(id).await?;
            let record = WorkerRecord {
                id: supervisor.supervisor_id.clone(),
                agent_id: supervisor.agent_id.clone(),
                status: supervisor.status,
                first_seen_ms: existing.as_ref().map_or(now_ms, |c| c.document.first_seen_ms),
                last_seen_ms: now_ms,
            };
            match existing {
                Some(current) => store.replace(&current, record).await,
                None => store.add(id, record).await,
            }
        })
        .await;

        match result {
            Ok(stored) => Ok(stored.document),
            Err(e) => {
                if !e.is_cancelled() {
                    tracing::warn!(worker = %id, error = %e, "worker heartbeat upsert failed");
                }
                Err(e)
            }
        }
    }

    pub async fn get(
        &self,
        id: &WorkerId,
        cancel: &CancellationToken,
    ) -> Result<Option<WorkerRecord>, StoreError> {
        check_cancelled(cancel)?;
        Ok(self.store.find(id.as_str()).await?.map(Versioned::into_document))
    }

    pub async fn list(
        &self,
        continuation: Option<&str>,
        page_size: usize,
        cancel: &CancellationToken,
    ) -> Result<Page<WorkerRecord>, StoreError> {
        check_cancelled(cancel)?;
        self.store.query(&|_: &WorkerRecord| true, continuation, page_size).await
    }

    /// Forget a worker. Returns false if it was not registered.
    pub async fn unregister(
        &self,
        id: &WorkerId,
        cancel: &CancellationToken,
    ) -> Result<bool, StoreError> {
        let store = &self.store;
        let id = id.as_str();
        retry_on_conflict(RetryPolicy::Unbounded, cancel, move || async move {
            let Some(current) = store.find(id).await? else {
                return Ok(false);
            };
            match store.delete(&current).await {
                Ok(()) => Ok(true),
                Err(StoreError::NotFound(_)) => Ok(false),
                Err(e) => Err(e),
            }
        })
        .await
    }
}

#[cfg(test)]
#[path = "workers_tests.rs"]
mod tests;
