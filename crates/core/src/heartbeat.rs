// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Heartbeat messages exchanged between workers and the orchestrator.

use crate::job::{JobId, JobInstruction, JobStatus};
use crate::processing::ProcessMode;
use crate::worker::{WorkerId, WorkerStatus};
use serde::{Deserialize, Serialize};

/// Identity and status of the process sending a heartbeat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupervisorHeartbeat {
    pub supervisor_id: WorkerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub status: WorkerStatus,
}

impl SupervisorHeartbeat {
    pub fn new(supervisor_id: impl Into<WorkerId>) -> Self {
        Self {
            supervisor_id: supervisor_id.into(),
            agent_id: None,
            status: WorkerStatus::default(),
        }
    }
}

/// What a worker currently believes about one job it holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobHeartbeat {
    pub job_id: JobId,
    /// Hash of the definition the worker is running
    pub job_hash: String,
    pub status: JobStatus,
    pub process_mode: ProcessMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<serde_json::Value>,
}

/// A periodic report from one worker covering every job it holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heartbeat {
    pub supervisor: SupervisorHeartbeat,
    #[serde(default)]
    pub jobs: Vec<JobHeartbeat>,
}

/// Instruction returned to a worker for one reported job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeartbeatInstruction {
    /// Keep running in the current mode
    Keep,
    /// Promote from passive to active
    SwitchToActive,
    /// Stop processing the job
    CancelProcessing,
}

crate::str_enum! {
    HeartbeatInstruction {
        Keep => "keep",
        SwitchToActive => "switch_to_active",
        CancelProcessing => "cancel_processing",
    }
}

/// Orchestrator response for one reported job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatResultEntry {
    pub job_id: JobId,
    pub instruction: HeartbeatInstruction,
    /// Most recent heartbeat of any active executor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_active_heartbeat_ms: Option<u64>,
    /// Present when the stored definition differs from the worker's copy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_job: Option<JobInstruction>,
}

impl HeartbeatResultEntry {
    /// Entry telling the worker to stop, with no job details.
    pub fn cancel(job_id: JobId) -> Self {
        Self {
            job_id,
            instruction: HeartbeatInstruction::CancelProcessing,
            last_active_heartbeat_ms: None,
            updated_job: None,
        }
    }
}

/// Orchestrator response to a [`Heartbeat`], one entry per reported job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatResult {
    #[serde(default)]
    pub entries: Vec<HeartbeatResultEntry>,
}

impl HeartbeatResult {
    pub fn entry(&self, job_id: &JobId) -> Option<&HeartbeatResultEntry> {
        self.entries.iter().find(|e| &e.job_id == job_id)
    }
}

#[cfg(any(test, feature = "test-support"))]
impl JobHeartbeat {
    /// Heartbeat for an active job the worker holds with `job_hash`.
    pub fn running(
        job_id: impl Into<JobId>,
        job_hash: impl Into<String>,
        mode: ProcessMode,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            job_hash: job_hash.into(),
            status: JobStatus::Active,
            process_mode: mode,
            state: None,
        }
    }
}

#[cfg(test)]
#[path = "heartbeat_tests.rs"]
mod tests;
