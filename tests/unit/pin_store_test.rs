//! Unit tests for the pin store: list ownership, guards, and the toggle
//! flag, over an in-memory gateway.

use std::cell::RefCell;
use std::rc::Rc;

use chatmarks::managers::pin_store::{PinStore, PinStoreTrait, BOOKMARKS_KEY};
use chatmarks::platform::Platform;
use chatmarks::storage::MemoryGateway;
use chatmarks::types::bookmark::BookmarkDraft;
use chatmarks::types::errors::PinError;
use chatmarks::types::settings::PinSettings;

fn store() -> PinStore {
    PinStore::new(Box::new(MemoryGateway::new()), &PinSettings::default())
}

fn store_with_cap(max_pins: usize) -> PinStore {
    PinStore::new(Box::new(MemoryGateway::new()), &PinSettings { max_pins })
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
        url: "https://chatgpt.com/c/1".to_string(),
        page_title: "Chat".to_string(),
    }
}

#[test]
fn pin_assigns_a_time_derived_id_and_timestamp() {
    let mut pins = store();
    let bookmark = pins.pin(draft("remember this sentence"), 1_700_000_000_123).unwrap();
    assert!(bookmark.id.starts_with("1700000000123-"), "got {:?}", bookmark.id);
    assert_eq!(bookmark.timestamp, 1_700_000_000_123);
    assert_eq!(pins.list().unwrap().len(), 1);
}

#[test]
fn empty_capture_is_never_stored() {
    let mut pins = store();
    let mut empty = draft("");
    empty.full_text = Some("  ".to_string());
    assert_eq!(pins.pin(empty, 1).unwrap_err(), PinError::EmptyText);
    assert!(pins.list().unwrap().is_empty());
}

#[test]
fn duplicate_text_is_rejected() {
    let mut pins = store();
    pins.pin(draft("same selection text"), 1).unwrap();
    assert_eq!(
        pins.pin(draft("same selection text"), 2).unwrap_err(),
        PinError::AlreadyPinned
    );
    assert_eq!(pins.list().unwrap().len(), 1);
}

#[test]
fn the_pin_limit_leaves_the_list_unchanged() {
    let mut pins = store_with_cap(3);
    for i in 0..3 {
        pins.pin(draft(&format!("pinned sentence number {}", i)), i).unwrap();
    }
    let err = pins.pin(draft("one more over the cap"), 99).unwrap_err();
    assert_eq!(err, PinError::LimitReached(3));

    let list = pins.list().unwrap();
    assert_eq!(list.len(), 3);
    assert!(list.iter().all(|b| !b.text.contains("over the cap")));
}

#[test]
fn delete_removes_exactly_one_record_by_id() {
    let mut pins = store();
    let a = pins.pin(draft("first pinned text"), 1).unwrap();
    let b = pins.pin(draft("second pinned text"), 2).unwrap();

    pins.delete(&a.id).unwrap();
    let remaining = pins.list().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, b.id);

    assert_eq!(
        pins.delete(&a.id).unwrap_err(),
        PinError::NotFound(a.id.clone())
    );
}

#[test]
fn delete_at_preserves_the_order_of_the_rest() {
    let mut pins = store();
    for text in ["alpha entry", "bravo entry", "charlie entry", "delta entry"] {
        pins.pin(draft(text), 1).unwrap();
    }

    let removed = pins.delete_at(1).unwrap();
    assert_eq!(removed.text, "bravo entry");

    let texts: Vec<String> = pins.list().unwrap().into_iter().map(|b| b.text).collect();
    assert_eq!(texts, vec!["alpha entry", "charlie entry", "delta entry"]);

    assert_eq!(pins.delete_at(10).unwrap_err(), PinError::IndexOutOfRange(10));
}

#[test]
fn clear_empties_the_stored_list() {
    let mut pins = store();
    pins.pin(draft("soon to be cleared"), 1).unwrap();
    pins.clear().unwrap();
    assert!(pins.list().unwrap().is_empty());
}

#[test]
fn recent_first_sorts_by_timestamp_descending() {
    let mut pins = store();
    pins.pin(draft("older pinned entry"), 100).unwrap();
    pins.pin(draft("newer pinned entry"), 200).unwrap();
    pins.pin(draft("middle pinned entry"), 150).unwrap();

    let texts: Vec<String> = pins.recent_first().unwrap().into_iter().map(|b| b.text).collect();
    assert_eq!(texts, vec!["newer pinned entry", "middle pinned entry", "older pinned entry"]);
}

#[test]
fn search_filters_text_title_and_platform() {
    let mut pins = store();
    pins.pin(draft("ownership rules in rust"), 1).unwrap();
    let mut other = draft("unrelated note body");
    other.page_title = "Rust lifetimes chat".to_string();
    pins.pin(other, 2).unwrap();

    assert_eq!(pins.search("rust").unwrap().len(), 2);
    assert_eq!(pins.search("ownership").unwrap().len(), 1);
    assert_eq!(pins.search("chatgpt").unwrap().len(), 2);
    assert!(pins.search("claude").unwrap().is_empty());
}

#[test]
fn initialize_seeds_an_empty_list_exactly_once() {
    let mut pins = store();
    pins.initialize().unwrap();
    assert!(pins.list().unwrap().is_empty());

    // A second initialization must not clobber existing pins.
    pins.pin(draft("already present entry"), 1).unwrap();
    pins.initialize().unwrap();
    assert_eq!(pins.list().unwrap().len(), 1);
}

#[test]
fn capture_toggle_defaults_on_and_persists() {
    let mut pins = store();
    assert!(pins.enabled().unwrap());
    pins.set_enabled(false).unwrap();
    assert!(!pins.enabled().unwrap());
    pins.set_enabled(true).unwrap();
    assert!(pins.enabled().unwrap());
}

#[test]
fn mutations_notify_storage_subscribers() {
    let mut pins = store();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    pins.subscribe(Box::new(move |key| sink.borrow_mut().push(key.to_string())));

    let a = pins.pin(draft("watched entry"), 1).unwrap();
    pins.delete(&a.id).unwrap();
    pins.clear().unwrap();

    assert_eq!(*seen.borrow(), vec![BOOKMARKS_KEY, BOOKMARKS_KEY, BOOKMARKS_KEY]);
}
