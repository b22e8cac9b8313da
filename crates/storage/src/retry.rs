// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retry-on-conflict policy shared by every read → compute → write cycle.
//!
//! Conflicts are the only retryable failure. Cancellation is checked before
//! each attempt and before each write, and is never retried.

use crate::document::{DocumentStore, Versioned};
use crate::error::StoreError;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// How many times a conflicting operation may be attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Keep retrying until the write lands
    Unbounded,
    /// Give up after this many attempts with [`StoreError::RetriesExhausted`]
    Bounded(u32),
}

/// Attempt bookkeeping for one retry loop.
#[derive(Debug)]
pub struct Retry {
    policy: RetryPolicy,
    attempts: u32,
    errors: Vec<StoreError>,
}

impl Retry {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy, attempts: 0, errors: Vec::new() }
    }

    /// Start the next attempt, returning its 1-based number.
    pub fn begin(&mut self, cancel: &CancellationToken) -> Result<u32, StoreError> {
        check_cancelled(cancel)?;
        self.attempts += 1;
        Ok(self.attempts)
    }

    /// Record a failed attempt.
    ///
    /// `Ok(())` means try again; otherwise the error to surface.
    pub fn record(&mut self, error: StoreError) -> Result<(), StoreError> {
        if !error.is_conflict() {
            return Err(error);
        }
        tracing::debug!(attempt = self.attempts, error = %error, "write conflict, retrying");
        if let RetryPolicy::Bounded(max) = self.policy {
            self.errors.push(error);
            if self.attempts >= max {
                tracing::warn!(attempts = self.attempts, "conflict retries exhausted");
                return Err(StoreError::RetriesExhausted {
                    attempts: self.attempts,
                    errors: std::mem::take(&mut self.errors),
                });
            }
        }
        Ok(())
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

pub fn check_cancelled(cancel: &CancellationToken) -> Result<(), StoreError> {
    if cancel.is_cancelled() {
        return Err(StoreError::Cancelled);
    }
    Ok(())
}

/// Run `op` until it succeeds, fails with a non-conflict error, or the
/// policy gives up.
pub async fn retry_on_conflict<T, F, Fut>(
    policy: RetryPolicy,
    cancel: &CancellationToken,
    mut op: F,
) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let mut retry = Retry::new(policy);
    loop {
        retry.begin(cancel)?;
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => retry.record(e)?,
        }
    }
}

/// Result of a conditional update.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome<D, R> {
    /// The computed change was written
    Updated { document: D, output: R },
    /// `compute` declined to change anything; nothing was written
    Unchanged(D),
    /// The document does not exist (or vanished mid-update)
    Missing,
}

impl<D, R> UpdateOutcome<D, R> {
    pub fn map_document<E>(self, f: impl FnOnce(D) -> E) -> UpdateOutcome<E, R> {
        match self {
            UpdateOutcome::Updated { document, output } => {
                UpdateOutcome::Updated { document: f(document), output }
            }
            UpdateOutcome::Unchanged(document) => UpdateOutcome::Unchanged(f(document)),
            UpdateOutcome::Missing => UpdateOutcome::Missing,
        }
    }

    /// The document as it stands after the update, if it exists.
    pub fn into_document(self) -> Option<D> {
        match self {
            UpdateOutcome::Updated { document, .. } | UpdateOutcome::Unchanged(document) => {
                Some(document)
            }
            UpdateOutcome::Missing => None,
        }
    }

    pub fn is_updated(&self) -> bool {
        matches!(self, UpdateOutcome::Updated { .. })
    }
}

/// Read → compute → conditional replace, retried on conflict.
///
/// `compute` receives a fresh copy of the latest document on every attempt
/// and returns `None` to skip the write.
pub async fn update_document<T, R, F>(
    store: &dyn DocumentStore<T>,
    id: &str,
    policy: RetryPolicy,
    cancel: &CancellationToken,
    mut compute: F,
) -> Result<UpdateOutcome<Versioned<T>, R>, StoreError>
where
    T: Clone + Send + Sync + 'static,
    F: FnMut(&mut T) -> Option<R>,
{
    let mut retry = Retry::new(policy);
    loop {
        retry.begin(cancel)?;
        let Some(current) = store.find(id).await? else {
            return Ok(UpdateOutcome::Missing);
        };
        let mut next = current.document.clone();
        let Some(output) = compute(&mut next) else {
            return Ok(UpdateOutcome::Unchanged(current));
        };
        check_cancelled(cancel)?;
        match store.replace(&current, next).await {
            Ok(document) => return Ok(UpdateOutcome::Updated { document, output }),
            Err(StoreError::NotFound(_)) => return Ok(UpdateOutcome::Missing),
            Err(e) => retry.record(e)?,
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
