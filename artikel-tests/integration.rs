//! Integration tests for Artikel
//!
//! These tests run the article lookup against a local fake of the hosted
//! document database REST API and against the in-memory store.

#[path = "integration/fake_firestore.rs"]
mod fake_firestore;

#[path = "integration/firestore_lookup.rs"]
mod firestore_lookup;

#[path = "integration/lookup_properties.rs"]
mod lookup_properties;
