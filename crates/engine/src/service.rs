// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job lifecycle façade: create, update, cancel, restart, delete and read.

use crate::error::EngineError;
use crate::hooks::{JobEvent, JobEvents};
use ef_core::{Clock, Job, JobId, JobLifetime, JobStatus};
use ef_storage::{JobQuery, JobRepository, Page, StoreError, UpdateOutcome};
use tokio_util::sync::CancellationToken;

pub struct JobService<C: Clock> {
    jobs: JobRepository,
    events: JobEvents,
    clock: C,
}

impl<C: Clock> JobService<C> {
    pub fn new(jobs: JobRepository, events: JobEvents, clock: C) -> Self {
        Self { jobs, events, clock }
    }

    /// Persist a new job with a fresh lifetime.
    ///
    /// A missing id is generated. If the creating hooks or the write fail,
    /// the deleted hooks run as compensation and the original error is
    /// returned.
    pub async fn create_job(
        &self,
        mut job: Job,
        cancel: &CancellationToken,
    ) -> Result<Job, EngineError> {
        if job.id.is_empty() {
            job.id = JobId::generate();
        }
        job.lifetime = JobLifetime::started_at(self.clock.epoch_ms());

        let added = match self.events.emit(JobEvent::Creating, &job, cancel).await {
            Ok(()) => self.jobs.add(job.clone(), cancel).await.map_err(EngineError::from),
            Err(e) => Err(e.into()),
        };
        let created = match added {
            Ok(created) => created,
            Err(e) => {
                self.compensate(&job, cancel).await;
                return Err(e);
            }
        };

        self.events.emit(JobEvent::Created, &created, cancel).await?;
        tracing::info!(job = %created.id, "job created");
        Ok(created)
    }

    /// Load or create job `id` and let `mutate` edit it.
    ///
    /// `mutate` sees a fresh copy on every attempt; returning false skips the
    /// write and returns the job as it stands (or the unsaved template when
    /// the job does not exist). Changing the redundancy policy discards the
    /// job's processing bookkeeping.
    pub async fn create_or_update_job<F>(
        &self,
        id: &JobId,
        mut mutate: F,
        cancel: &CancellationToken,
    ) -> Result<Job, EngineError>
    where
        F: FnMut(&mut Job) -> bool,
    {
        let clock = &self.clock;
        loop {
            if self.jobs.find(id, cancel).await?.is_none() {
                let mut job = Job::new(id.clone());
                job.lifetime = JobLifetime::started_at(clock.epoch_ms());
                if !mutate(&mut job) {
                    return Ok(job);
                }
                job.id = id.clone();

                if let Err(e) = self.events.emit(JobEvent::Creating, &job, cancel).await {
                    self.compensate(&job, cancel).await;
                    return Err(e.into());
                }
                match self.jobs.add(job.clone(), cancel).await {
                    Ok(created) => {
                        self.events.emit(JobEvent::Created, &created, cancel).await?;
                        tracing::info!(job = %id, "job created");
                        return Ok(created);
                    }
                    Err(StoreError::Conflict(_)) => {
                        tracing::debug!(job = %id, "job created concurrently, updating instead");
                        self.compensate(&job, cancel).await;
                        continue;
                    }
                    Err(e) => {
                        self.compensate(&job, cancel).await;
                        return Err(e.into());
                    }
                }
            }

            let outcome = self
                .jobs
                .update(id, cancel, |job| {
                    let redundancy = job.redundancy;
                    if !mutate(job) {
                        return None;
                    }
                    job.id = id.clone();
                    if job.redundancy != redundancy {
                        job.lifetime.processing_status.clear();
                    }
                    job.lifetime.updated_at_ms = clock.epoch_ms();
                    Some(())
                })
                .await?;

            match outcome {
                UpdateOutcome::Updated { document, .. } => {
                    tracing::info!(job = %id, "job updated");
                    return Ok(document);
                }
                UpdateOutcome::Unchanged(job) => return Ok(job),
                UpdateOutcome::Missing => {
                    tracing::debug!(job = %id, "job deleted during update, recreating");
                }
            }
        }
    }

    pub async fn cancel_job(
        &self,
        id: &JobId,
        cancel: &CancellationToken,
    ) -> Result<Job, EngineError> {
        self.transition(id, JobStatus::Canceled, cancel).await
    }

    pub async fn restart_job(
        &self,
        id: &JobId,
        cancel: &CancellationToken,
    ) -> Result<Job, EngineError> {
        self.transition(id, JobStatus::Active, cancel).await
    }

    async fn transition(
        &self,
        id: &JobId,
        target: JobStatus,
        cancel: &CancellationToken,
    ) -> Result<Job, EngineError> {
        let clock = &self.clock;
        let outcome = self
            .jobs
            .update(id, cancel, |job| {
                if !job.status().can_transition_to(target) {
                    return None;
                }
                job.lifetime.status = target;
                job.lifetime.updated_at_ms = clock.epoch_ms();
                Some(())
            })
            .await?;

        match outcome {
            UpdateOutcome::Updated { document, .. } => {
                tracing::info!(job = %id, status = %target, "job status changed");
                Ok(document)
            }
            UpdateOutcome::Unchanged(job) => Ok(job),
            UpdateOutcome::Missing => Err(EngineError::NotFound(id.clone())),
        }
    }

    /// Delete a job. `Ok(None)` if it did not exist.
    pub async fn delete_job(
        &self,
        id: &JobId,
        cancel: &CancellationToken,
    ) -> Result<Option<Job>, EngineError> {
        let Some(job) = self.jobs.find(id, cancel).await? else {
            return Ok(None);
        };
        self.events.emit(JobEvent::Deleting, &job, cancel).await?;

        let Some(deleted) = self.jobs.delete(id, cancel).await? else {
            tracing::debug!(job = %id, "job deleted concurrently");
            return Ok(None);
        };
        self.events.emit(JobEvent::Deleted, &deleted, cancel).await?;
        tracing::info!(job = %id, "job deleted");
        Ok(Some(deleted))
    }

    pub async fn get_job(
        &self,
        id: &JobId,
        cancel: &CancellationToken,
    ) -> Result<Option<Job>, EngineError> {
        Ok(self.jobs.find(id, cancel).await?)
    }

    pub async fn list_jobs(
        &self,
        continuation: Option<&str>,
        page_size: usize,
        cancel: &CancellationToken,
    ) -> Result<Page<Job>, EngineError> {
        Ok(self.jobs.list(continuation, page_size, cancel).await?)
    }

    pub async fn query_jobs(
        &self,
        query: &JobQuery,
        continuation: Option<&str>,
        page_size: usize,
        cancel: &CancellationToken,
    ) -> Result<Page<Job>, EngineError> {
        Ok(self.jobs.query(query, continuation, page_size, cancel).await?)
    }

    /// Tell handlers a job that never made it to the store is gone.
    async fn compensate(&self, job: &Job, cancel: &CancellationToken) {
        if let Err(e) = self.events.emit(JobEvent::Deleted, job, cancel).await {
            tracing::warn!(job = %job.id, error = %e, "compensating deleted hooks failed");
        }
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
