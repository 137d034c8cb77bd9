//! Artikel Core - Word article lookup
//!
//! Initializes a client for the hosted document database and looks up the
//! article stored for a word in the `words` collection.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use artikel_core::tracing_setup::init_tracing;
//! use artikel_core::{ArticleLookup, ArtikelConfig, FirestoreClient};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let config = ArtikelConfig::from_env();
//! init_tracing(config.log_level, None)?;
//!
//! let client = FirestoreClient::connect(&config)?;
//! let lookup = ArticleLookup::new(Arc::new(client));
//!
//! match lookup.find_article("Huis").await? {
//!     Some(article) => println!("{article}"),
//!     None => println!("not found"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod document;
pub mod errors;
pub mod lookup;
pub mod query;
pub mod store;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use config::{ArtikelConfig, FirebaseConfig, NetworkConfig};
pub use document::{Document, Value};
pub use errors::{InitError, RequestError};
pub use lookup::{ArticleLookup, find_article};
pub use query::{FieldFilter, FilterOp, Query};
pub use store::{DocumentStore, FirestoreClient, InMemoryStore};

/// Convenience type alias for lookup results.
pub type Result<T> = std::result::Result<T, RequestError>;
