// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process [`DocumentStore`] backed by an ordered map.
//!
//! Documents are held as JSON so every read hands out a fresh owned copy,
//! the same as a remote document database would.

use crate::document::{DocumentStore, Page, Versioned};
use crate::error::StoreError;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::ops::Bound;
use std::sync::Arc;

struct Entry {
    version: u64,
    body: serde_json::Value,
}

#[derive(Default)]
struct MemoryState {
    docs: BTreeMap<String, Entry>,
    next_version: u64,
    writes: u64,
    /// Replaces that will lose a race against a simulated writer
    pending_conflicts: u32,
    /// Error returned by the next call of any kind
    pending_failure: Option<String>,
}

impl MemoryState {
    fn bump(&mut self) -> u64 {
        self.next_version += 1;
        self.next_version
    }

    fn take_failure(&mut self) -> Result<(), StoreError> {
        match self.pending_failure.take() {
            Some(message) => Err(StoreError::Backend(message)),
            None => Ok(()),
        }
    }
}

/// Shared in-memory document store. Clones share the same documents.
pub struct MemoryStore<T> {
    inner: Arc<Mutex<MemoryState>>,
    _doc: PhantomData<fn() -> T>,
}

impl<T> Clone for MemoryStore<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner), _doc: PhantomData }
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self { inner: Arc::new(Mutex::new(MemoryState::default())), _doc: PhantomData }
    }
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().docs.is_empty()
    }
}

fn decode<T: DeserializeOwned>(id: &str, entry: &Entry) -> Result<Versioned<T>, StoreError> {
    Ok(Versioned {
        id: id.to_string(),
        version: entry.version,
        document: serde_json::from_value(entry.body.clone())?,
    })
}

#[async_trait]
impl<T> DocumentStore<T> for MemoryStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn find(&self, id: &str) -> Result<Option<Versioned<T>>, StoreError> {
        let mut state = self.inner.lock();
        state.take_failure()?;
        state.docs.get(id).map(|entry| decode(id, entry)).transpose()
    }

    async fn add(&self, id: &str, document: T) -> Result<Versioned<T>, StoreError> {
        let body = serde_json::to_value(&document)?;
        let mut state = self.inner.lock();
        state.take_failure()?;
        if state.docs.contains_key(id) {
            return Err(StoreError::Conflict(id.to_string()));
        }
        let version = state.bump();
        state.docs.insert(id.to_string(), Entry { version, body });
        state.writes += 1;
        Ok(Versioned { id: id.to_string(), version, document })
    }

    async fn replace(
        &self,
        current: &Versioned<T>,
        document: T,
    ) -> Result<Versioned<T>, StoreError> {
        let body = serde_json::to_value(&document)?;
        let mut guard = self.inner.lock();
        let state = &mut *guard;
        state.take_failure()?;
        if !state.docs.contains_key(&current.id) {
            return Err(StoreError::NotFound(current.id.clone()));
        }
        if state.pending_conflicts > 0 {
            state.pending_conflicts -= 1;
            let raced = state.bump();
            if let Some(entry) = state.docs.get_mut(&current.id) {
                entry.version = raced;
            }
        }
        let version = state.bump();
        let Some(entry) = state.docs.get_mut(&current.id) else {
            return Err(StoreError::NotFound(current.id.clone()));
        };
        if entry.version != current.version {
            return Err(StoreError::VersionConflict {
                id: current.id.clone(),
                expected: current.version,
                actual: entry.version,
            });
        }
        *entry = Entry { version, body };
        state.writes += 1;
        Ok(Versioned { id: current.id.clone(), version, document })
    }

    async fn delete(&self, current: &Versioned<T>) -> Result<(), StoreError> {
        let mut state = self.inner.lock();
        state.take_failure()?;
        let Some(entry) = state.docs.get(&current.id) else {
            return Err(StoreError::NotFound(current.id.clone()));
        };
        if entry.version != current.version {
            return Err(StoreError::VersionConflict {
                id: current.id.clone(),
                expected: current.version,
                actual: entry.version,
            });
        }
        state.docs.remove(&current.id);
        state.writes += 1;
        Ok(())
    }

    async fn query(
        &self,
        filter: &(dyn for<'a> Fn(&'a T) -> bool + Send + Sync),
        continuation: Option<&str>,
        page_size: usize,
    ) -> Result<Page<T>, StoreError> {
        let page_size = page_size.max(1);
        let mut state = self.inner.lock();
        state.take_failure()?;

        let start = match continuation {
            Some(after) => Bound::Excluded(after),
            None => Bound::Unbounded,
        };
        let mut items = Vec::new();
        let mut last_id: Option<&String> = None;
        let mut next = None;
        for (id, entry) in state.docs.range::<str, _>((start, Bound::Unbounded)) {
            if items.len() == page_size {
                next = last_id.cloned();
                break;
            }
            let document: T = serde_json::from_value(entry.body.clone())?;
            if filter(&document) {
                items.push(document);
                last_id = Some(id);
            }
        }
        Ok(Page { items, continuation: next })
    }
}

#[cfg(any(test, feature = "test-support"))]
impl<T> MemoryStore<T> {
    /// Make the next `count` replaces lose to a simulated concurrent writer.
    pub fn inject_conflicts(&self, count: u32) {
        self.inner.lock().pending_conflicts += count;
    }

    /// Fail the next call of any kind with [`StoreError::Backend`].
    pub fn inject_failure(&self, message: impl Into<String>) {
        self.inner.lock().pending_failure = Some(message.into());
    }

    /// Number of successful add/replace/delete calls so far.
    pub fn writes(&self) -> u64 {
        self.inner.lock().writes
    }

    pub fn version_of(&self, id: &str) -> Option<u64> {
        self.inner.lock().docs.get(id).map(|entry| entry.version)
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
