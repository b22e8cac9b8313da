// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job documents keyed by job id.

use crate::document::{DocumentStore, Page, Versioned};
use crate::error::StoreError;
use crate::memory::MemoryStore;
use crate::retry::{
    check_cancelled, retry_on_conflict, update_document, RetryPolicy, UpdateOutcome,
};
use ef_core::{Job, JobId, JobStatus};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Filter for [`JobRepository::query`]. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobQuery {
    pub status: Option<JobStatus>,
    pub name: Option<String>,
    pub configuration_type: Option<String>,
}

impl JobQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jobs that may be handed out to workers.
    pub fn active() -> Self {
        Self::new().status(JobStatus::Active)
    }

    pub fn status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn configuration_type(mut self, kind: impl Into<String>) -> Self {
        self.configuration_type = Some(kind.into());
        self
    }

    pub fn matches(&self, job: &Job) -> bool {
        self.status.is_none_or(|s| job.status() == s)
            && self.name.as_deref().is_none_or(|n| job.name.as_deref() == Some(n))
            && self
                .configuration_type
                .as_deref()
                .is_none_or(|t| job.configuration_type.as_deref() == Some(t))
    }
}

/// Typed access to the job collection.
///
/// Job updates retry on conflict without bound; every attempt recomputes
/// against the latest stored copy.
#[derive(Clone)]
pub struct JobRepository {
    store: Arc<dyn DocumentStore<Job>>,
}

impl JobRepository {
    pub fn new(store: Arc<dyn DocumentStore<Job>>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::<Job>::new()))
    }

    /// Insert a new job. `Conflict` if the id is taken.
    pub async fn add(&self, job: Job, cancel: &CancellationToken) -> Result<Job, StoreError> {
        check_cancelled(cancel)?;
        let id = job.id.to_string();
        let added = self.store.add(&id, job).await?;
        tracing::debug!(job = %id, version = added.version, "job added");
        Ok(added.document)
    }

    pub async fn find(
        &self,
        id: &JobId,
        cancel: &CancellationToken,
    ) -> Result<Option<Job>, StoreError> {
        check_cancelled(cancel)?;
        Ok(self.store.find(id.as_str()).await?.map(Versioned::into_document))
    }

    /// Conditionally update a job; see [`update_document`].
    pub async fn update<R, F>(
        &self,
        id: &JobId,
        cancel: &CancellationToken,
        compute: F,
    ) -> Result<UpdateOutcome<Job, R>, StoreError>
    where
        F: FnMut(&mut Job) -> Option<R>,
    {
        let outcome =
            update_document(&*self.store, id.as_str(), RetryPolicy::Unbounded, cancel, compute)
                .await?;
        Ok(outcome.map_document(Versioned::into_document))
    }

    /// Insert `job`, or overwrite the stored copy if the id already exists.
    pub async fn add_or_update(
        &self,
        job: Job,
        cancel: &CancellationToken,
    ) -> Result<Job, StoreError> {
        let store = &self.store;
        let stored = retry_on_conflict(RetryPolicy::Unbounded, cancel, move || {
            let job = job.clone();
            async move {
                let id = job.id.to_string();
                match store.find(&id).await? {
                    Some(current) => store.replace(&current, job).await,
                    None => store.add(&id, job).await,
                }
            }
        })
        .await?;
        Ok(stored.document)
    }

    /// Remove a job. Returns the removed copy, or `None` if it was already gone.
    pub async fn delete(
        &self,
        id: &JobId,
        cancel: &CancellationToken,
    ) -> Result<Option<Job>, StoreError> {
        let store = &self.store;
        let id = id.as_str();
        retry_on_conflict(RetryPolicy::Unbounded, cancel, move || async move {
            let Some(current) = store.find(id).await? else {
                return Ok(None);
            };
            match store.delete(&current).await {
                Ok(()) => Ok(Some(current.document)),
                Err(StoreError::NotFound(_)) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
    }

    pub async fn list(
        &self,
        continuation: Option<&str>,
        page_size: usize,
        cancel: &CancellationToken,
    ) -> Result<Page<Job>, StoreError> {
        self.query(&JobQuery::new(), continuation, page_size, cancel).await
    }

    pub async fn query(
        &self,
        query: &JobQuery,
        continuation: Option<&str>,
        page_size: usize,
        cancel: &CancellationToken,
    ) -> Result<Page<Job>, StoreError> {
        check_cancelled(cancel)?;
        self.store.query(&|job: &Job| query.matches(job), continuation, page_size).await
    }
}

#[cfg(test)]
#[path = "jobs_tests.rs"]
mod tests;
