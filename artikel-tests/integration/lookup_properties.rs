//! Property tests for lookups over the in-memory store.

use std::sync::Arc;

use artikel_core::lookup::{ARTICLE_FIELD, WORD_FIELD, WORDS_COLLECTION};
use artikel_core::{ArticleLookup, Document, InMemoryStore};
use proptest::prelude::*;

fn populated_lookup(entries: &[(String, String)]) -> ArticleLookup<InMemoryStore> {
    let store = InMemoryStore::new();
    for (i, (word, article)) in entries.iter().enumerate() {
        store.insert(
            WORDS_COLLECTION,
            Document::new(format!("words/{i}"))
                .with_field(WORD_FIELD, word.as_str())
                .with_field(ARTICLE_FIELD, article.as_str()),
        );
    }
    ArticleLookup::new(Arc::new(store))
}

/// First stored article whose word equals the lowercased input.
fn expected_article(entries: &[(String, String)], input: &str) -> Option<String> {
    let lowered = input.to_lowercase();
    entries
        .iter()
        .find(|(word, _)| *word == lowered)
        .map(|(_, article)| article.clone())
}

proptest! {
    #[test]
    fn lookup_matches_first_stored_entry(
        entries in prop::collection::vec(("[a-z]{1,6}", "[a-zA-Z ]{0,20}"), 0..12),
        input in "[a-zA-Z]{1,6}",
    ) {
        let lookup = populated_lookup(&entries);
        let found = tokio_test::block_on(lookup.find_article(&input)).unwrap();

        prop_assert_eq!(found, expected_article(&entries, &input));
    }

    #[test]
    fn uppercase_input_finds_lowercase_word(
        entries in prop::collection::vec(("[a-z]{1,6}", "[a-z ]{1,20}"), 1..8),
        pick in any::<prop::sample::Index>(),
    ) {
        let (word, _) = &entries[pick.index(entries.len())];
        let lookup = populated_lookup(&entries);

        let upper = tokio_test::block_on(lookup.find_article(&word.to_uppercase())).unwrap();
        let lower = tokio_test::block_on(lookup.find_article(word)).unwrap();

        prop_assert!(upper.is_some());
        prop_assert_eq!(upper, lower);
    }

    #[test]
    fn unknown_words_are_absent(
        entries in prop::collection::vec(("[a-m]{1,6}", "[a-z]{1,10}"), 0..8),
        input in "[n-z]{1,6}",
    ) {
        let lookup = populated_lookup(&entries);

        let first = tokio_test::block_on(lookup.find_article(&input)).unwrap();
        let second = tokio_test::block_on(lookup.find_article(&input)).unwrap();

        prop_assert_eq!(first, None);
        prop_assert_eq!(second, None);
    }
}
