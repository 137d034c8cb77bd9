//! Article lookup by word.
//!
//! Words are stored lowercased in the `words` collection. A lookup lowercases
//! its input, runs one equality query and returns the `article` field of the
//! first match. When several documents share a word the first one in the
//! service's natural order wins; that choice is not stable and callers must
//! not rely on it.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::errors::RequestError;
use crate::query::Query;
use crate::store::DocumentStore;

/// Collection holding one document per word.
pub const WORDS_COLLECTION: &str = "words";
/// Lowercased word used as the filter key.
pub const WORD_FIELD: &str = "word";
/// Field returned to the caller.
pub const ARTICLE_FIELD: &str = "article";

/// Article lookup bound to a shared store handle.
#[derive(Debug)]
pub struct ArticleLookup<S: ?Sized = dyn DocumentStore> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for ArticleLookup<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: DocumentStore + ?Sized> ArticleLookup<S> {
    /// Creates a lookup over the given store handle.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Finds the article for `word`.
    ///
    /// Returns `Ok(None)` when no document matches.
    ///
    /// # Errors
    /// - `RequestError::Network` / `RequestError::Timeout` - Service unreachable
    /// - `RequestError::Service` - Service rejected the query
    /// - `RequestError::Parse` - Response could not be decoded
    /// - `RequestError::MalformedDocument` - First match has a non-string article
    pub async fn find_article(&self, word: &str) -> Result<Option<String>, RequestError> {
        find_article(self.store.as_ref(), word).await
    }
}

/// Finds the article for `word` in `store`.
///
/// # Errors
/// Propagates every `RequestError` from the store; see
/// [`ArticleLookup::find_article`].
#[instrument(skip(store), level = "debug")]
pub async fn find_article<S: DocumentStore + ?Sized>(
    store: &S,
    word: &str,
) -> Result<Option<String>, RequestError> {
    let query = word_query(word);
    let documents = store.run_query(&query).await?;

    let Some(first) = documents.first() else {
        debug!("No article found");
        return Ok(None);
    };

    if documents.len() > 1 {
        debug!(
            matches = documents.len(),
            document = %first.name,
            "Several documents share this word, using the first"
        );
    }

    Ok(first.string_field(ARTICLE_FIELD)?.map(str::to_owned))
}

/// Builds the query selecting documents for `word`, case-folded.
pub fn word_query(word: &str) -> Query {
    Query::collection(WORDS_COLLECTION).where_eq(WORD_FIELD, word.to_lowercase())
}
