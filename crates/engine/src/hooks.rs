// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job lifecycle hooks.
//!
//! Handlers run one at a time in registration order. The first failure
//! stops the fan-out and aborts the operation that triggered it.

use async_trait::async_trait;
use ef_core::Job;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Failure reported by a job event handler
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{handler}: {message}")]
pub struct HookError {
    pub handler: String,
    pub message: String,
}

impl HookError {
    pub fn new(handler: impl Into<String>, message: impl Into<String>) -> Self {
        Self { handler: handler.into(), message: message.into() }
    }
}

/// Lifecycle point at which handlers are notified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobEvent {
    /// Before a new job is persisted; failure prevents the write
    Creating,
    Created,
    /// Before a job is deleted; failure prevents the delete
    Deleting,
    /// After a delete, or as compensation when a create failed
    Deleted,
}

ef_core::str_enum! {
    JobEvent {
        Creating => "creating",
        Created => "created",
        Deleting => "deleting",
        Deleted => "deleted",
    }
}

/// Observer of job lifecycle changes. Lifecycle methods default to no-ops.
#[async_trait]
pub trait JobEventHandler: Send + Sync {
    /// Name used in logs and errors
    fn name(&self) -> &str;

    async fn on_job_creating(
        &self,
        _job: &Job,
        _cancel: &CancellationToken,
    ) -> Result<(), HookError> {
        Ok(())
    }

    async fn on_job_created(
        &self,
        _job: &Job,
        _cancel: &CancellationToken,
    ) -> Result<(), HookError> {
        Ok(())
    }

    async fn on_job_deleting(
        &self,
        _job: &Job,
        _cancel: &CancellationToken,
    ) -> Result<(), HookError> {
        Ok(())
    }

    async fn on_job_deleted(
        &self,
        _job: &Job,
        _cancel: &CancellationToken,
    ) -> Result<(), HookError> {
        Ok(())
    }
}

/// Ordered set of registered handlers.
#[derive(Clone, Default)]
pub struct JobEvents {
    handlers: Vec<Arc<dyn JobEventHandler>>,
}

impl JobEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Arc<dyn JobEventHandler>) {
        self.handlers.push(handler);
    }

    pub fn with(mut self, handler: Arc<dyn JobEventHandler>) -> Self {
        self.register(handler);
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Notify every handler of `event` for `job`, stopping at the first failure.
    pub async fn emit(
        &self,
        event: JobEvent,
        job: &Job,
        cancel: &CancellationToken,
    ) -> Result<(), HookError> {
        for handler in &self.handlers {
            let result = match event {
                JobEvent::Creating => handler.on_job_creating(job, cancel).await,
                JobEvent::Created => handler.on_job_created(job, cancel).await,
                JobEvent::Deleting => handler.on_job_deleting(job, cancel).await,
                JobEvent::Deleted => handler.on_job_deleted(job, cancel).await,
            };
            if let Err(e) = result {
                tracing::warn!(
                    job = %job.id,
                    event = %event,
                    handler = handler.name(),
                    error = %e,
                    "job event handler failed"
                );
                return Err(e);
            }
        }
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::{HookError, JobEvent, JobEventHandler};
    use async_trait::async_trait;
    use ef_core::{Job, JobId};
    use parking_lot::Mutex;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    /// Recorded handler invocation
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct HookCall {
        pub handler: String,
        pub event: JobEvent,
        pub job_id: JobId,
    }

    /// Invocation log shared by several handlers to observe ordering.
    #[derive(Clone, Default)]
    pub struct HookLog {
        calls: Arc<Mutex<Vec<HookCall>>>,
    }

    impl HookLog {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<HookCall> {
            self.calls.lock().clone()
        }

        /// `(handler, event)` pairs in invocation order.
        pub fn events(&self) -> Vec<(String, JobEvent)> {
            self.calls.lock().iter().map(|c| (c.handler.clone(), c.event)).collect()
        }
    }

    /// Fake handler that records calls and can be told to fail.
    #[derive(Clone)]
    pub struct RecordingHandler {
        name: String,
        log: HookLog,
        fail_on: Arc<Mutex<Option<JobEvent>>>,
    }

    impl RecordingHandler {
        pub fn new(name: &str, log: &HookLog) -> Self {
            Self { name: name.to_string(), log: log.clone(), fail_on: Arc::new(Mutex::new(None)) }
        }

        /// Fail every call for `event` after recording it.
        pub fn fail_on(&self, event: JobEvent) {
            *self.fail_on.lock() = Some(event);
        }

        fn record(&self, event: JobEvent, job: &Job) -> Result<(), HookError> {
            self.log.calls.lock().push(HookCall {
                handler: self.name.clone(),
                event,
                job_id: job.id.clone(),
            });
            if *self.fail_on.lock() == Some(event) {
                return Err(HookError::new(&self.name, format!("refused {event}")));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl JobEventHandler for RecordingHandler {
        fn name(&self) -> &str {
            &self.name
        }

        async fn on_job_creating(&self, job: &Job, _: &CancellationToken) -> Result<(), HookError> {
            self.record(JobEvent::Creating, job)
        }

        async fn on_job_created(&self, job: &Job, _: &CancellationToken) -> Result<(), HookError> {
            self.record(JobEvent::Created, job)
        }

        async fn on_job_deleting(&self, job: &Job, _: &CancellationToken) -> Result<(), HookError> {
            self.record(JobEvent::Deleting, job)
        }

        async fn on_job_deleted(&self, job: &Job, _: &CancellationToken) -> Result<(), HookError> {
            self.record(JobEvent::Deleted, job)
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{HookCall, HookLog, RecordingHandler};

#[cfg(test)]
#[path = "hooks_tests.rs"]
mod tests;
