// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job identifier, definition, and lifetime bookkeeping.

use crate::demand::Demand;
use crate::processing::{ProcessMode, ProcessingStatusMap};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

crate::define_id! {
    /// Unique identifier for a job.
    ///
    /// Callers may supply their own ids; jobs created without one get a
    /// generated `job-` id.
    pub struct JobId("job-");
}

/// Lifecycle status of a job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Active,
    Canceled,
    Deleted,
    /// Reported by a worker that finished the job
    Completed,
    /// Reported by a worker that could not run the job
    Error,
}

crate::str_enum! {
    JobStatus {
        Active => "active",
        Canceled => "canceled",
        Deleted => "deleted",
        Completed => "completed",
        Error => "error",
    }
}

impl JobStatus {
    /// Only active jobs are handed out to workers.
    pub fn is_active(self) -> bool {
        self == JobStatus::Active
    }

    /// Workers holding a job in one of these states must stop processing it.
    pub fn requires_cancel(self) -> bool {
        matches!(self, JobStatus::Canceled | JobStatus::Deleted)
    }

    /// Whether an operator-driven change from `self` to `target` applies.
    ///
    /// Deleted is terminal. Only active jobs can be canceled; any stopped
    /// job can be restarted.
    pub fn can_transition_to(self, target: JobStatus) -> bool {
        match (self, target) {
            (JobStatus::Deleted, _) => false,
            (from, to) if from == to => false,
            (JobStatus::Active, JobStatus::Canceled) => true,
            (JobStatus::Canceled | JobStatus::Completed | JobStatus::Error, JobStatus::Active) => {
                true
            }
            _ => false,
        }
    }
}

/// How many concurrent executors of each role a job wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedundancyConfig {
    pub desired_active: u32,
    pub desired_passive: u32,
}

impl RedundancyConfig {
    pub fn new(desired_active: u32, desired_passive: u32) -> Self {
        Self { desired_active, desired_passive }
    }

    /// Number of executors wanted in `mode`.
    pub fn desired(&self, mode: ProcessMode) -> usize {
        match mode {
            ProcessMode::Active => self.desired_active as usize,
            ProcessMode::Passive => self.desired_passive as usize,
        }
    }
}

impl Default for RedundancyConfig {
    fn default() -> Self {
        Self::new(1, 0)
    }
}

/// Status and timestamps of a job plus its per-worker bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobLifetime {
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub created_at_ms: u64,
    #[serde(default)]
    pub updated_at_ms: u64,
    #[serde(default)]
    pub processing_status: ProcessingStatusMap,
}

impl JobLifetime {
    /// Fresh lifetime for a newly created job.
    pub fn started_at(epoch_ms: u64) -> Self {
        Self {
            status: JobStatus::Active,
            created_at_ms: epoch_ms,
            updated_at_ms: epoch_ms,
            processing_status: ProcessingStatusMap::new(),
        }
    }
}

/// A persisted unit of assignable work.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Job {
    #[serde(default)]
    pub id: JobId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub demands: Vec<Demand>,
    #[serde(default)]
    pub redundancy: RedundancyConfig,
    #[serde(default)]
    pub lifetime: JobLifetime,
    /// Opaque payload interpreted only by workers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration_type: Option<String>,
}

/// The parts of a job that define *what* runs; hashed for change detection.
#[derive(Serialize)]
struct JobDefinition<'a> {
    id: &'a JobId,
    name: &'a Option<String>,
    demands: &'a [Demand],
    redundancy: &'a RedundancyConfig,
    configuration: &'a Option<serde_json::Value>,
    configuration_type: &'a Option<String>,
}

impl Job {
    pub fn new(id: impl Into<JobId>) -> Self {
        Self { id: id.into(), ..Self::default() }
    }

    pub fn status(&self) -> JobStatus {
        self.lifetime.status
    }

    pub fn processing_status(&self) -> &ProcessingStatusMap {
        &self.lifetime.processing_status
    }

    /// SHA-256 (hex) of the job definition.
    ///
    /// Lifetime bookkeeping is excluded, so heartbeats never change the
    /// hash; workers compare it against the copy they run.
    pub fn content_hash(&self) -> Result<String, serde_json::Error> {
        let definition = JobDefinition {
            id: &self.id,
            name: &self.name,
            demands: &self.demands,
            redundancy: &self.redundancy,
            configuration: &self.configuration,
            configuration_type: &self.configuration_type,
        };
        let canonical = serde_json::to_vec(&definition)?;
        Ok(format!("{:x}", Sha256::digest(&canonical)))
    }
}

/// An assignment handed to a worker: run `job` in `process_mode`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobInstruction {
    pub job: Job,
    pub process_mode: ProcessMode,
}

#[cfg(any(test, feature = "test-support"))]
mod builder {
    use super::*;
    use crate::processing::ProcessingStatus;
    use crate::worker::WorkerId;

    /// Test builder for [`Job`].
    pub struct JobBuilder {
        job: Job,
    }

    impl Default for JobBuilder {
        fn default() -> Self {
            let mut job = Job::new("job-1");
            job.lifetime = JobLifetime::started_at(1_000_000);
            Self { job }
        }
    }

    impl JobBuilder {
        pub fn id(mut self, id: impl Into<JobId>) -> Self {
            self.job.id = id.into();
            self
        }

        pub fn name(mut self, name: impl Into<String>) -> Self {
            self.job.name = Some(name.into());
            self
        }

        pub fn demand(mut self, demand: Demand) -> Self {
            self.job.demands.push(demand);
            self
        }

        pub fn redundancy(mut self, desired_active: u32, desired_passive: u32) -> Self {
            self.job.redundancy = RedundancyConfig::new(desired_active, desired_passive);
            self
        }

        pub fn status(mut self, status: JobStatus) -> Self {
            self.job.lifetime.status = status;
            self
        }

        pub fn configuration(mut self, kind: &str, payload: serde_json::Value) -> Self {
            self.job.configuration_type = Some(kind.to_string());
            self.job.configuration = Some(payload);
            self
        }

        /// Record a worker entry with the given mode and last heartbeat.
        pub fn worker(
            mut self,
            worker_id: &str,
            mode: Option<ProcessMode>,
            last_heartbeat_ms: u64,
        ) -> Self {
            self.job
                .lifetime
                .processing_status
                .insert(WorkerId::new(worker_id), ProcessingStatus::new(mode, last_heartbeat_ms));
            self
        }

        pub fn build(self) -> Job {
            self.job
        }
    }

    impl Job {
        /// Create a builder with test defaults.
        pub fn builder() -> JobBuilder {
            JobBuilder::default()
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use builder::JobBuilder;

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
