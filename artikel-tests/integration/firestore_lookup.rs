//! Article lookups through the REST client against the local fake.

use std::sync::Arc;
use std::time::Duration;

use artikel_core::{ArticleLookup, ArtikelConfig, FirestoreClient, RequestError};
use futures::future::join_all;
use serde_json::json;

use crate::fake_firestore::{Behavior, FakeFirestore};

fn lookup_for(fake: &FakeFirestore) -> ArticleLookup<FirestoreClient> {
    let config = ArtikelConfig::for_testing(fake.endpoint());
    let client = FirestoreClient::connect(&config).unwrap();
    ArticleLookup::new(Arc::new(client))
}

#[tokio::test]
async fn test_found_and_absent_words() {
    let fake = FakeFirestore::start().await;
    fake.add_word("huis", "huis", "Een huis is een gebouw.");
    let lookup = lookup_for(&fake);

    assert_eq!(
        lookup.find_article("huis").await.unwrap().as_deref(),
        Some("Een huis is een gebouw.")
    );
    assert_eq!(lookup.find_article("boom").await.unwrap(), None);
}

#[tokio::test]
async fn test_case_insensitive_lookup() {
    let fake = FakeFirestore::start().await;
    fake.add_word("tafel", "tafel", "de tafel");
    let lookup = lookup_for(&fake);

    let capitalized = lookup.find_article("Tafel").await.unwrap();
    let lower = lookup.find_article("tafel").await.unwrap();

    assert_eq!(capitalized.as_deref(), Some("de tafel"));
    assert_eq!(capitalized, lower);
}

#[tokio::test]
async fn test_request_shape() {
    let fake = FakeFirestore::start().await;
    let lookup = lookup_for(&fake);

    lookup.find_article("Fiets").await.unwrap();

    let requests = fake.requests();
    assert_eq!(requests.len(), 1);

    let request = &requests[0];
    assert_eq!(request.project, "artikel-test");
    assert_eq!(request.database, "(default)");
    assert_eq!(request.api_key.as_deref(), Some("test-key"));
    assert_eq!(
        request.body,
        json!({
            "structuredQuery": {
                "from": [{ "collectionId": "words" }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": "word" },
                        "op": "EQUAL",
                        "value": { "stringValue": "fiets" }
                    }
                }
            }
        })
    );
}

#[tokio::test]
async fn test_first_of_duplicates_is_returned() {
    let fake = FakeFirestore::start().await;
    fake.add_word("bank-1", "bank", "de bank (zitmeubel)");
    fake.add_word("bank-2", "bank", "de bank (geldinstelling)");
    let lookup = lookup_for(&fake);

    assert_eq!(
        lookup.find_article("bank").await.unwrap().as_deref(),
        Some("de bank (zitmeubel)")
    );
}

#[tokio::test]
async fn test_other_collections_are_ignored() {
    let fake = FakeFirestore::start().await;
    fake.add_document(
        "drafts",
        json!({
            "name": "projects/artikel-test/databases/(default)/documents/drafts/huis",
            "fields": {
                "word": { "stringValue": "huis" },
                "article": { "stringValue": "concept" }
            }
        }),
    );
    let lookup = lookup_for(&fake);

    assert_eq!(lookup.find_article("huis").await.unwrap(), None);
}

#[tokio::test]
async fn test_permission_denied_is_an_error() {
    let fake = FakeFirestore::start().await;
    fake.add_word("huis", "huis", "Een huis is een gebouw.");
    fake.set_behavior(Behavior::Deny);
    let lookup = lookup_for(&fake);

    match lookup.find_article("huis").await {
        Err(RequestError::Service { status, code, .. }) => {
            assert_eq!(status, 403);
            assert_eq!(code.as_deref(), Some("PERMISSION_DENIED"));
        }
        other => panic!("expected permission error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_undecodable_response_is_parse_error() {
    let fake = FakeFirestore::start().await;
    fake.set_behavior(Behavior::Garbage);
    let lookup = lookup_for(&fake);

    assert!(matches!(
        lookup.find_article("huis").await,
        Err(RequestError::Parse { .. })
    ));
}

#[tokio::test]
async fn test_error_element_in_successful_reply_is_an_error() {
    let fake = FakeFirestore::start().await;
    fake.add_word("huis", "huis", "Een huis is een gebouw.");
    fake.set_behavior(Behavior::StreamError);
    let lookup = lookup_for(&fake);

    match lookup.find_article("huis").await {
        Err(RequestError::Service { status, code, .. }) => {
            assert_eq!(status, 503);
            assert_eq!(code.as_deref(), Some("UNAVAILABLE"));
        }
        other => panic!("expected service error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreadable_error_body_keeps_read_failure() {
    let fake = FakeFirestore::start().await;
    fake.set_behavior(Behavior::BrokenErrorBody);
    let lookup = lookup_for(&fake);

    match lookup.find_article("huis").await {
        Err(RequestError::Service {
            status, message, ..
        }) => {
            assert_eq!(status, 500);
            assert!(
                message.starts_with("unreadable error body"),
                "unexpected message: {message}"
            );
        }
        other => panic!("expected service error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_service_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ArtikelConfig::for_testing(format!("http://{addr}"));
    let lookup = ArticleLookup::new(Arc::new(FirestoreClient::connect(&config).unwrap()));

    let err = lookup.find_article("huis").await.unwrap_err();
    assert!(err.is_transport(), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_slow_service_times_out() {
    let fake = FakeFirestore::start().await;
    fake.add_word("huis", "huis", "Een huis is een gebouw.");
    fake.set_behavior(Behavior::Slow(Duration::from_secs(2)));

    let mut config = ArtikelConfig::for_testing(fake.endpoint());
    config.network.request_timeout = Duration::from_millis(200);
    let lookup = ArticleLookup::new(Arc::new(FirestoreClient::connect(&config).unwrap()));

    assert!(matches!(
        lookup.find_article("huis").await,
        Err(RequestError::Timeout { .. })
    ));
}

#[tokio::test]
async fn test_concurrent_lookups_share_one_handle() {
    let fake = FakeFirestore::start().await;
    let words = ["huis", "boom", "tafel", "fiets", "kat", "hond"];
    for word in &words[..3] {
        fake.add_word(word, word, &format!("article for {word}"));
    }
    let lookup = lookup_for(&fake);

    let results = join_all(words.iter().map(|word| {
        let lookup = lookup.clone();
        async move { lookup.find_article(&word.to_uppercase()).await }
    }))
    .await;

    for (word, result) in words.iter().zip(results) {
        let article = result.unwrap();
        if ["huis", "boom", "tafel"].contains(word) {
            assert_eq!(article, Some(format!("article for {word}")));
        } else {
            assert_eq!(article, None);
        }
    }
    assert_eq!(fake.requests().len(), words.len());
}

#[tokio::test]
async fn test_repeated_lookups_are_idempotent() {
    let fake = FakeFirestore::start().await;
    fake.add_word("huis", "huis", "Een huis is een gebouw.");
    let lookup = lookup_for(&fake);

    let first = lookup.find_article("huis").await.unwrap();
    let second = lookup.find_article("huis").await.unwrap();

    assert_eq!(first, second);
}
