// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine tuning knobs.

use crate::env;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Heartbeats older than this no longer count toward redundancy
    pub job_stale_time: Duration,
    pub job_query_page_size: usize,
    pub max_jobs_per_pull: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            job_stale_time: env::DEFAULT_JOB_STALE_TIME,
            job_query_page_size: env::DEFAULT_JOB_QUERY_PAGE_SIZE,
            max_jobs_per_pull: env::DEFAULT_MAX_JOBS_PER_PULL,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `EF_*` environment variables.
    pub fn from_env() -> Self {
        Self {
            job_stale_time: env::job_stale_time(),
            job_query_page_size: env::job_query_page_size(),
            max_jobs_per_pull: env::max_jobs_per_pull(),
        }
    }

    pub fn with_job_stale_time(mut self, stale_time: Duration) -> Self {
        self.job_stale_time = stale_time;
        self
    }

    pub fn with_job_query_page_size(mut self, page_size: usize) -> Self {
        self.job_query_page_size = page_size.max(1);
        self
    }

    pub fn with_max_jobs_per_pull(mut self, max: usize) -> Self {
        self.max_jobs_per_pull = max;
        self
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
