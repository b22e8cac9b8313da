// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-worker processing bookkeeping stored inside a job.
//!
//! Every worker that pulled or heartbeated a job has one entry. Liveness is
//! logical: an entry counts only while its last heartbeat is younger than
//! the configured stale time.

use crate::worker::WorkerId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Role a worker holds for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessMode {
    /// Primary executor
    Active,
    /// Standby executor, promoted when active executors go silent
    Passive,
}

crate::str_enum! {
    ProcessMode {
        Active => "active",
        Passive => "passive",
    }
}

/// Last known processing state of one worker for one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingStatus {
    /// `None` when the worker reported a non-active job status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_mode: Option<ProcessMode>,
    pub last_known_heartbeat_ms: u64,
    /// Opaque state blob echoed by the worker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_known_state: Option<serde_json::Value>,
}

impl ProcessingStatus {
    pub fn new(process_mode: Option<ProcessMode>, last_known_heartbeat_ms: u64) -> Self {
        Self { process_mode, last_known_heartbeat_ms, last_known_state: None }
    }

    /// True if the last heartbeat is within `stale_time` of `now_ms`.
    pub fn is_live(&self, now_ms: u64, stale_time: Duration) -> bool {
        let cutoff = now_ms.saturating_sub(stale_time.as_millis() as u64);
        self.last_known_heartbeat_ms > cutoff
    }

    fn is_live_in(&self, mode: ProcessMode, now_ms: u64, stale_time: Duration) -> bool {
        self.process_mode == Some(mode) && self.is_live(now_ms, stale_time)
    }
}

/// Worker id → processing status, ordered by worker id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessingStatusMap(BTreeMap<WorkerId, ProcessingStatus>);

impl ProcessingStatusMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, worker_id: &WorkerId) -> Option<&ProcessingStatus> {
        self.0.get(worker_id)
    }

    pub fn insert(&mut self, worker_id: WorkerId, status: ProcessingStatus) {
        self.0.insert(worker_id, status);
    }

    pub fn remove(&mut self, worker_id: &WorkerId) -> Option<ProcessingStatus> {
        self.0.remove(worker_id)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&WorkerId, &ProcessingStatus)> {
        self.0.iter()
    }

    /// Set the process mode of an existing entry. Returns false if absent.
    pub fn set_mode(&mut self, worker_id: &WorkerId, mode: ProcessMode) -> bool {
        match self.0.get_mut(worker_id) {
            Some(status) => {
                status.process_mode = Some(mode);
                true
            }
            None => false,
        }
    }

    /// Count live entries holding `mode`.
    pub fn count_live(&self, mode: ProcessMode, now_ms: u64, stale_time: Duration) -> usize {
        self.0.values().filter(|s| s.is_live_in(mode, now_ms, stale_time)).count()
    }

    /// Count live entries holding `mode`, ignoring `worker_id`'s own entry.
    pub fn count_live_others(
        &self,
        mode: ProcessMode,
        worker_id: &WorkerId,
        now_ms: u64,
        stale_time: Duration,
    ) -> usize {
        self.0
            .iter()
            .filter(|(id, s)| *id != worker_id && s.is_live_in(mode, now_ms, stale_time))
            .count()
    }

    /// Most recent heartbeat among entries in Active mode, live or not.
    pub fn last_active_heartbeat_ms(&self) -> Option<u64> {
        self.0
            .values()
            .filter(|s| s.process_mode == Some(ProcessMode::Active))
            .map(|s| s.last_known_heartbeat_ms)
            .max()
    }
}

impl FromIterator<(WorkerId, ProcessingStatus)> for ProcessingStatusMap {
    fn from_iter<I: IntoIterator<Item = (WorkerId, ProcessingStatus)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
#[path = "processing_tests.rs"]
mod tests;
