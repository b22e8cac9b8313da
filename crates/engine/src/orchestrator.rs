// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job assignment and heartbeat processing.
//!
//! The orchestrator keeps no state of its own. Every decision is derived
//! from the job documents and committed with compare-and-swap, so any
//! number of orchestrators may serve the same store.

use crate::config::EngineConfig;
use crate::error::EngineError;
use ef_core::{
    demand, Capabilities, Clock, Heartbeat, HeartbeatInstruction, HeartbeatResult,
    HeartbeatResultEntry, Job, JobHeartbeat, JobId, JobInstruction, JobStatus, ProcessMode,
    ProcessingStatus, WorkerId,
};
use ef_storage::{JobQuery, JobRepository, UpdateOutcome, WorkerRepository};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Role `worker_id` should take on `job`, if the job still needs one.
///
/// Active slots are filled before passive ones. Only other workers with a
/// live heartbeat count toward a slot.
pub fn calculate_instruction(
    job: &Job,
    worker_id: &WorkerId,
    now_ms: u64,
    stale_time: Duration,
) -> Option<ProcessMode> {
    let processing = job.processing_status();
    [ProcessMode::Active, ProcessMode::Passive].into_iter().find(|&mode| {
        processing.count_live_others(mode, worker_id, now_ms, stale_time)
            < job.redundancy.desired(mode)
    })
}

/// Fold one job heartbeat into `job` and decide what the worker does next.
pub fn apply_heartbeat(
    job: &mut Job,
    worker_id: &WorkerId,
    report: &JobHeartbeat,
    now_ms: u64,
    stale_time: Duration,
) -> HeartbeatResultEntry {
    let mut entry = HeartbeatResultEntry {
        job_id: report.job_id.clone(),
        instruction: HeartbeatInstruction::Keep,
        last_active_heartbeat_ms: None,
        updated_job: None,
    };

    // An unhashable definition never matches the worker's copy
    let worker_copy_current = job.content_hash().is_ok_and(|hash| hash == report.job_hash);
    if !worker_copy_current {
        entry.updated_job =
            Some(JobInstruction { job: job.clone(), process_mode: report.process_mode });
    }

    if job.status().requires_cancel() {
        entry.instruction = HeartbeatInstruction::CancelProcessing;
        entry.updated_job = None;
        entry.last_active_heartbeat_ms = None;
    } else {
        job.lifetime.status = report.status;
    }

    let reported_mode = (report.status == JobStatus::Active).then_some(report.process_mode);
    job.lifetime.processing_status.insert(
        worker_id.clone(),
        ProcessingStatus {
            process_mode: reported_mode,
            last_known_heartbeat_ms: now_ms,
            last_known_state: report.state.clone(),
        },
    );

    let processing = &job.lifetime.processing_status;
    let needs_active = processing.count_live(ProcessMode::Active, now_ms, stale_time)
        < job.redundancy.desired(ProcessMode::Active);
    if job.status().is_active() && reported_mode == Some(ProcessMode::Passive) && needs_active {
        entry.instruction = HeartbeatInstruction::SwitchToActive;
        entry.last_active_heartbeat_ms = processing.last_active_heartbeat_ms();
        job.lifetime.processing_status.set_mode(worker_id, ProcessMode::Active);
    }

    entry
}

/// Hands out jobs to workers and keeps their roles in line with each job's
/// redundancy policy.
pub struct JobOrchestrator<C: Clock> {
    jobs: JobRepository,
    workers: Option<WorkerRepository>,
    config: EngineConfig,
    clock: C,
}

impl<C: Clock> JobOrchestrator<C> {
    pub fn new(jobs: JobRepository, config: EngineConfig, clock: C) -> Self {
        Self { jobs, workers: None, config, clock }
    }

    /// Also record supervisor liveness on every heartbeat.
    pub fn with_workers(mut self, workers: WorkerRepository) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Assign up to `max_job_count` active jobs whose demands `capabilities`
    /// satisfy and which still need an executor.
    pub async fn get_available_jobs(
        &self,
        worker_id: &WorkerId,
        capabilities: Option<&Capabilities>,
        max_job_count: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<JobInstruction>, EngineError> {
        let mut instructions = Vec::new();
        if max_job_count == 0 {
            return Ok(instructions);
        }

        let query = JobQuery::active();
        let stale_time = self.config.job_stale_time;
        let mut continuation: Option<String> = None;
        loop {
            let page = self
                .jobs
                .query(&query, continuation.as_deref(), self.config.job_query_page_size, cancel)
                .await?;

            for job in &page.items {
                if !demand::matches(&job.demands, capabilities)? {
                    continue;
                }
                // Cheap check on the listed copy before touching the store
                if calculate_instruction(job, worker_id, self.clock.epoch_ms(), stale_time)
                    .is_none()
                {
                    continue;
                }
                if let Some(instruction) = self.assign(&job.id, worker_id, cancel).await? {
                    instructions.push(instruction);
                    if instructions.len() >= max_job_count {
                        return Ok(instructions);
                    }
                }
            }

            match page.continuation {
                Some(next) => continuation = Some(next),
                None => return Ok(instructions),
            }
        }
    }

    /// [`Self::get_available_jobs`] with the configured per-pull maximum.
    pub async fn pull_jobs(
        &self,
        worker_id: &WorkerId,
        capabilities: Option<&Capabilities>,
        cancel: &CancellationToken,
    ) -> Result<Vec<JobInstruction>, EngineError> {
        self.get_available_jobs(worker_id, capabilities, self.config.max_jobs_per_pull, cancel)
            .await
    }

    /// Re-read the job and commit an assignment if one still applies.
    async fn assign(
        &self,
        job_id: &JobId,
        worker_id: &WorkerId,
        cancel: &CancellationToken,
    ) -> Result<Option<JobInstruction>, EngineError> {
        let clock = &self.clock;
        let stale_time = self.config.job_stale_time;
        let outcome = self
            .jobs
            .update(job_id, cancel, |job| {
                if !job.status().is_active() {
                    return None;
                }
                let now = clock.epoch_ms();
                let mode = calculate_instruction(job, worker_id, now, stale_time)?;
                job.lifetime
                    .processing_status
                    .insert(worker_id.clone(), ProcessingStatus::new(Some(mode), now));
                Some(mode)
            })
            .await?;

        match outcome {
            UpdateOutcome::Updated { document, output: mode } => {
                tracing::info!(job = %job_id, worker = %worker_id, mode = %mode, "job assigned");
                Ok(Some(JobInstruction { job: document, process_mode: mode }))
            }
            UpdateOutcome::Unchanged(_) => {
                tracing::debug!(job = %job_id, worker = %worker_id, "job filled before commit");
                Ok(None)
            }
            UpdateOutcome::Missing => {
                tracing::debug!(job = %job_id, worker = %worker_id, "job vanished before commit");
                Ok(None)
            }
        }
    }

    /// Record a worker heartbeat and return one instruction per reported job,
    /// in input order.
    pub async fn send_heartbeat(
        &self,
        heartbeat: &Heartbeat,
        cancel: &CancellationToken,
    ) -> Result<HeartbeatResult, EngineError> {
        if let Some(workers) = &self.workers {
            workers.heartbeat(&heartbeat.supervisor, self.clock.epoch_ms(), cancel).await?;
        }

        let worker_id = &heartbeat.supervisor.supervisor_id;
        let mut entries = Vec::with_capacity(heartbeat.jobs.len());
        for report in &heartbeat.jobs {
            entries.push(self.process_job_heartbeat(worker_id, report, cancel).await?);
        }
        Ok(HeartbeatResult { entries })
    }

    async fn process_job_heartbeat(
        &self,
        worker_id: &WorkerId,
        report: &JobHeartbeat,
        cancel: &CancellationToken,
    ) -> Result<HeartbeatResultEntry, EngineError> {
        let clock = &self.clock;
        let stale_time = self.config.job_stale_time;
        let outcome = self
            .jobs
            .update(&report.job_id, cancel, |job| {
                Some(apply_heartbeat(job, worker_id, report, clock.epoch_ms(), stale_time))
            })
            .await?;

        let entry = match outcome {
            UpdateOutcome::Updated { output, .. } => output,
            UpdateOutcome::Unchanged(_) | UpdateOutcome::Missing => {
                tracing::debug!(
                    job = %report.job_id,
                    worker = %worker_id,
                    "heartbeat for unknown job"
                );
                HeartbeatResultEntry::cancel(report.job_id.clone())
            }
        };
        match entry.instruction {
            HeartbeatInstruction::SwitchToActive => {
                tracing::info!(job = %entry.job_id, worker = %worker_id, "promoted to active");
            }
            HeartbeatInstruction::CancelProcessing => {
                tracing::info!(job = %entry.job_id, worker = %worker_id, "processing canceled");
            }
            HeartbeatInstruction::Keep => {}
        }
        Ok(entry)
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
