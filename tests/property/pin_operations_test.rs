//! Property-based tests for pin-list operations.
//!
//! Deleting by index must remove exactly the targeted record and preserve
//! the relative order of the rest, and any valid bookmark list must
//! round-trip through the storage gateway unchanged.

use proptest::prelude::*;

use chatmarks::managers::pin_store::{PinStore, PinStoreTrait, BOOKMARKS_KEY};
use chatmarks::platform::Platform;
use chatmarks::storage::{MemoryGateway, SqliteGateway, StorageGateway};
use chatmarks::types::bookmark::{Bookmark, BookmarkDraft};
use chatmarks::types::settings::PinSettings;

fn arb_platform() -> impl Strategy<Value = Platform> {
    prop_oneof![
        Just(Platform::ChatGpt),
        Just(Platform::Claude),
        Just(Platform::Grok),
        Just(Platform::Unknown),
    ]
}

/// Printable selection texts, long enough to be pinnable.
fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9 ,.]{7,60}"
}

fn arb_bookmark() -> impl Strategy<Value = Bookmark> {
    (
        "[a-z0-9-]{4,20}",
        arb_text(),
        proptest::option::of(arb_text()),
        proptest::option::of("[a-zA-Z ]{0,80}"),
        proptest::option::of("//\\*\\[@id=\"[a-z0-9-]{1,12}\"\\]"),
        arb_platform(),
        0i64..2_000_000_000_000,
    )
        .prop_map(|(id, text, full_text, context, xpath, platform, timestamp)| Bookmark {
            id,
            text,
            full_text,
            text_context: context,
            xpath,
            selector: None,
            message_id: None,
            platform,
            url: "https://chatgpt.com/c/prop".to_string(),
            page_title: "prop".to_string(),
            timestamp,
        })
}

fn draft(text: &str) -> BookmarkDraft {
    BookmarkDraft {
        text: text.to_string(),
        full_text: Some(text.to_string()),
        text_context: None,
        xpath: None,
        selector: None,
        message_id: None,
        platform: Platform::ChatGpt,
        url: String::new(),
        page_title: String::new(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    // Deleting index i from a list of length n leaves length n-1, removes
    // exactly the record originally at i, and keeps the rest in order.
    #[test]
    fn delete_at_preserves_relative_order(
        texts in proptest::collection::hash_set("[a-z]{8,20}", 2..12),
        index_seed in 0usize..64,
    ) {
        let texts: Vec<String> = texts.into_iter().collect();
        let index = index_seed % texts.len();

        let mut pins = PinStore::new(Box::new(MemoryGateway::new()), &PinSettings::default());
        for (i, text) in texts.iter().enumerate() {
            pins.pin(draft(text), i as i64).unwrap();
        }

        let removed = pins.delete_at(index).unwrap();
        prop_assert_eq!(&removed.text, &texts[index]);

        let remaining: Vec<String> = pins.list().unwrap().into_iter().map(|b| b.text).collect();
        let mut expected = texts.clone();
        expected.remove(index);
        prop_assert_eq!(remaining, expected);
    }

    // set(key, X) then get(key) yields X for any valid bookmark sequence,
    // through both gateway backends.
    #[test]
    fn bookmark_lists_round_trip_through_storage(
        bookmarks in proptest::collection::vec(arb_bookmark(), 0..8),
    ) {
        let value = serde_json::to_value(&bookmarks).unwrap();

        let mut memory = MemoryGateway::new();
        memory.set(BOOKMARKS_KEY, value.clone()).unwrap();
        let memory_back: Vec<Bookmark> =
            serde_json::from_value(memory.get(BOOKMARKS_KEY).unwrap().unwrap()).unwrap();
        prop_assert_eq!(&memory_back, &bookmarks);

        let mut sqlite = SqliteGateway::open_in_memory().unwrap();
        sqlite.set(BOOKMARKS_KEY, value).unwrap();
        let sqlite_back: Vec<Bookmark> =
            serde_json::from_value(sqlite.get(BOOKMARKS_KEY).unwrap().unwrap()).unwrap();
        prop_assert_eq!(&sqlite_back, &bookmarks);
    }

    // Serde round-trip of a single record through its JSON wire shape.
    #[test]
    fn bookmark_serde_round_trips(bookmark in arb_bookmark()) {
        let json = serde_json::to_string(&bookmark).unwrap();
        let back: Bookmark = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, bookmark);
    }
}
