// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ef-storage: Optimistic-concurrency document storage for jobs and workers

mod document;
mod error;
mod jobs;
mod memory;
mod retry;
mod workers;

pub use document::{DocumentStore, Page, Versioned};
pub use error::StoreError;
pub use jobs::{JobQuery, JobRepository};
pub use memory::MemoryStore;
pub use retry::{
    check_cancelled, retry_on_conflict, update_document, Retry, RetryPolicy, UpdateOutcome,
};
pub use workers::{WorkerRecord, WorkerRepository, WORKER_UPSERT_RETRIES};
