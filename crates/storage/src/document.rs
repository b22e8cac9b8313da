// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Optimistic-concurrency document store contract.
//!
//! Every document carries a version token. Writers hand back the
//! [`Versioned`] copy they read; the store rejects the write with
//! [`StoreError::VersionConflict`] if someone else wrote in between.

use crate::error::StoreError;
use async_trait::async_trait;

/// A document together with the version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub id: String,
    pub version: u64,
    pub document: T,
}

impl<T> Versioned<T> {
    pub fn into_document(self) -> T {
        self.document
    }
}

/// One page of a query, ordered by document id.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Pass back to fetch the next page; `None` once exhausted
    pub continuation: Option<String>,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self { items: Vec::new(), continuation: None }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page { items: self.items.into_iter().map(f).collect(), continuation: self.continuation }
    }
}

/// Keyed document storage with compare-and-swap writes.
#[async_trait]
pub trait DocumentStore<T: Send + Sync + 'static>: Send + Sync {
    /// Read the latest version of a document.
    async fn find(&self, id: &str) -> Result<Option<Versioned<T>>, StoreError>;

    /// Insert a new document. `Conflict` if the id is taken.
    async fn add(&self, id: &str, document: T) -> Result<Versioned<T>, StoreError>;

    /// Overwrite `current` with `document` if nobody wrote since it was read.
    async fn replace(&self, current: &Versioned<T>, document: T)
        -> Result<Versioned<T>, StoreError>;

    /// Remove `current` if nobody wrote since it was read.
    async fn delete(&self, current: &Versioned<T>) -> Result<(), StoreError>;

    /// Documents accepted by `filter`, after `continuation`, at most
    /// `page_size` per page.
    async fn query(
        &self,
        filter: &(dyn for<'a> Fn(&'a T) -> bool + Send + Sync),
        continuation: Option<&str>,
        page_size: usize,
    ) -> Result<Page<T>, StoreError>;
}
