// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the engine crate.

use std::time::Duration;

pub const DEFAULT_JOB_STALE_TIME: Duration = Duration::from_secs(10 * 60);
pub const DEFAULT_JOB_QUERY_PAGE_SIZE: usize = 100;
pub const DEFAULT_MAX_JOBS_PER_PULL: usize = 1;

/// How long a worker may stay silent before its role is up for grabs
/// (`EF_JOB_STALE_TIME_MS`).
pub fn job_stale_time() -> Duration {
    std::env::var("EF_JOB_STALE_TIME_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_JOB_STALE_TIME)
}

/// Page size when scanning active jobs (`EF_JOB_QUERY_PAGE_SIZE`, must be > 0).
pub fn job_query_page_size() -> usize {
    positive("EF_JOB_QUERY_PAGE_SIZE").unwrap_or(DEFAULT_JOB_QUERY_PAGE_SIZE)
}

/// Jobs handed out per pull when the caller does not ask for a count
/// (`EF_MAX_JOBS_PER_PULL`, must be > 0).
pub fn max_jobs_per_pull() -> usize {
    positive("EF_MAX_JOBS_PER_PULL").unwrap_or(DEFAULT_MAX_JOBS_PER_PULL)
}

fn positive(var: &str) -> Option<usize> {
    std::env::var(var).ok().and_then(|s| s.parse::<usize>().ok()).filter(|n| *n > 0)
}
