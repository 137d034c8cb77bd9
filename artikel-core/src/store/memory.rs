//! In-process document store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::DocumentStore;
use crate::document::Document;
use crate::errors::RequestError;
use crate::query::Query;

/// Document store held entirely in memory.
///
/// Stands in for the hosted database in tests and offline development.
/// Documents come back in insertion order. A failure injected with
/// [`InMemoryStore::fail_with`] is returned by every query until cleared.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
    failure: RwLock<Option<RequestError>>,
    queries_served: AtomicUsize,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a document to a collection.
    pub fn insert(&self, collection: &str, document: Document) {
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .push(document);
    }

    /// Makes every subsequent query fail with `error`.
    pub fn fail_with(&self, error: RequestError) {
        *self.failure.write() = Some(error);
    }

    /// Removes an injected failure.
    pub fn clear_failure(&self) {
        *self.failure.write() = None;
    }

    /// Number of queries executed so far, failed ones included.
    pub fn queries_served(&self) -> usize {
        self.queries_served.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn run_query(&self, query: &Query) -> Result<Vec<Document>, RequestError> {
        self.queries_served.fetch_add(1, Ordering::Relaxed);

        if let Some(error) = self.failure.read().clone() {
            return Err(error);
        }

        let collections = self.collections.read();
        let documents: Vec<Document> = collections
            .get(query.collection_id())
            .map(|docs| docs.iter().filter(|doc| query.matches(doc)).cloned().collect())
            .unwrap_or_default();

        Ok(documents)
    }
}
