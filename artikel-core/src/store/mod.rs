//! Document store backends.

use async_trait::async_trait;

use crate::document::Document;
use crate::errors::RequestError;
use crate::query::Query;

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreClient;
pub use memory::InMemoryStore;

/// Trait for backends that can execute a collection query.
///
/// Implementations must be safe to share between concurrent lookups
/// (the hosted database client, in-memory stores for tests and offline use).
#[async_trait]
pub trait DocumentStore: Send + Sync + std::fmt::Debug {
    /// Runs the query as a single request and returns every matching
    /// document in the backend's natural order.
    ///
    /// # Errors
    /// - `RequestError::Network` - Service unreachable
    /// - `RequestError::Timeout` - No answer within the configured timeout
    /// - `RequestError::Service` - Service rejected the query
    /// - `RequestError::Parse` - Response could not be decoded
    async fn run_query(&self, query: &Query) -> Result<Vec<Document>, RequestError>;
}
