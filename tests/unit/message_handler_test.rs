//! Unit tests for the JSON message dispatch: the popup/background/content
//! message shapes and their failure responses.

use serde_json::json;

use chatmarks::app::App;
use chatmarks::dom::parse;
use chatmarks::managers::pin_store::PinStoreTrait;
use chatmarks::message_handler::handle_message;
use chatmarks::storage::MemoryGateway;
use chatmarks::types::bookmark::PageInfo;
use chatmarks::types::settings::EngineSettings;

const PAGE: &str = r#"<html><head><title>Geography chat</title></head><body>
<div data-message-author-role="user"><div class="markdown"><p>What is the capital of France?</p></div></div>
<div data-message-author-role="assistant"><div class="markdown"><p>The capital of France is Paris. Ask me anything else.</p></div></div>
</body></html>"#;

fn app() -> App {
    App::new(
        Box::new(MemoryGateway::new()),
        PageInfo::new("https://chatgpt.com/c/123", "Geography chat"),
        EngineSettings::default(),
    )
}

#[test]
fn bookmark_selection_captures_and_stores() {
    let mut app = app();
    let mut doc = parse(PAGE);

    let response = handle_message(
        &mut app,
        &mut doc,
        &json!({"action": "bookmarkSelection", "text": "The capital of France is Paris"}),
        1_700_000_000_000,
    );
    assert_eq!(response["success"], true);
    assert_eq!(response["bookmark"]["platform"], "chatgpt");
    assert_eq!(response["bookmark"]["fullText"], "The capital of France is Paris");
    assert_eq!(app.pins.list().unwrap().len(), 1);
    // Success is surfaced as a toast.
    assert_eq!(app.notifications.active(1_700_000_000_000).len(), 1);
}

#[test]
fn too_short_selection_reports_an_error_toast() {
    let mut app = app();
    let mut doc = parse(PAGE);

    let response = handle_message(
        &mut app,
        &mut doc,
        &json!({"action": "bookmarkSelection", "text": "is"}),
        0,
    );
    assert_eq!(response["success"], false);
    assert!(app.pins.list().unwrap().is_empty());
    assert_eq!(app.notifications.active(0).len(), 1);
}

#[test]
fn scroll_to_bookmark_succeeds_and_reports_the_scroll_plan() {
    let mut app = app();
    let mut doc = parse(PAGE);

    let saved = handle_message(
        &mut app,
        &mut doc,
        &json!({"action": "bookmarkSelection", "text": "The capital of France is Paris"}),
        1_000,
    );
    let bookmark = saved["bookmark"].clone();

    let response = handle_message(
        &mut app,
        &mut doc,
        &json!({"action": "scrollToBookmark", "bookmark": bookmark}),
        2_000,
    );
    assert_eq!(response["success"], true);
    assert_eq!(response["scroll"]["behavior"], "smooth");
    assert_eq!(response["scroll"]["block"], "center");
    assert!(response["scroll"]["node"].is_u64());
}

#[test]
fn jump_to_message_is_an_alias_for_scroll_to_bookmark() {
    let mut app = app();
    let mut doc = parse(PAGE);

    let saved = handle_message(
        &mut app,
        &mut doc,
        &json!({"action": "bookmarkSelection", "text": "The capital of France is Paris"}),
        1_000,
    );
    let response = handle_message(
        &mut app,
        &mut doc,
        &json!({"type": "JUMP_TO_MESSAGE", "bookmark": saved["bookmark"]}),
        2_000,
    );
    assert_eq!(response["success"], true);
}

#[test]
fn relocation_miss_answers_false_and_shows_a_toast() {
    let mut app = app();
    let mut doc = parse(PAGE);

    let response = handle_message(
        &mut app,
        &mut doc,
        &json!({"action": "scrollToBookmark", "bookmark": {
            "id": "gone-1",
            "text": "sentence that no longer exists anywhere",
            "fullText": "sentence that no longer exists anywhere",
            "platform": "chatgpt",
            "timestamp": 5
        }}),
        0,
    );
    assert_eq!(response["success"], false);
    let toasts = app.notifications.active(0);
    assert_eq!(toasts.len(), 1);
    assert!(toasts[0].message.contains("not found"));
}

#[test]
fn malformed_bookmark_payloads_are_soft_errors() {
    let mut app = app();
    let mut doc = parse(PAGE);

    let missing = handle_message(&mut app, &mut doc, &json!({"action": "scrollToBookmark"}), 0);
    assert_eq!(missing["success"], false);

    let invalid = handle_message(
        &mut app,
        &mut doc,
        &json!({"action": "scrollToBookmark", "bookmark": {"text": 42}}),
        0,
    );
    assert_eq!(invalid["success"], false);
    assert!(invalid["error"].as_str().unwrap().contains("invalid bookmark"));
}

#[test]
fn toggle_state_gates_capture() {
    let mut app = app();
    let mut doc = parse(PAGE);

    let off = handle_message(&mut app, &mut doc, &json!({"type": "TOGGLE_STATE", "enabled": false}), 0);
    assert_eq!(off["success"], true);
    assert!(!app.pins.enabled().unwrap());

    let rejected = handle_message(
        &mut app,
        &mut doc,
        &json!({"action": "bookmarkSelection", "text": "The capital of France is Paris"}),
        0,
    );
    assert_eq!(rejected["success"], false);
    assert_eq!(rejected["error"], "capture disabled");

    handle_message(&mut app, &mut doc, &json!({"type": "TOGGLE_STATE", "enabled": true}), 0);
    let accepted = handle_message(
        &mut app,
        &mut doc,
        &json!({"action": "bookmarkSelection", "text": "The capital of France is Paris"}),
        0,
    );
    assert_eq!(accepted["success"], true);
}

#[test]
fn get_bookmarks_lists_newest_first() {
    let mut app = app();
    let mut doc = parse(PAGE);

    handle_message(
        &mut app,
        &mut doc,
        &json!({"action": "bookmarkSelection", "text": "The capital of France is Paris"}),
        1_000,
    );
    handle_message(
        &mut app,
        &mut doc,
        &json!({"action": "bookmarkSelection", "text": "Ask me anything else"}),
        2_000,
    );

    let response = handle_message(&mut app, &mut doc, &json!({"action": "getBookmarks"}), 3_000);
    let bookmarks = response["bookmarks"].as_array().unwrap();
    assert_eq!(bookmarks.len(), 2);
    assert_eq!(bookmarks[0]["text"], "Ask me anything else");
    assert_eq!(bookmarks[1]["text"], "The capital of France is Paris");
}

#[test]
fn delete_pinned_message_removes_by_index_in_stored_order() {
    let mut app = app();
    let mut doc = parse(PAGE);

    handle_message(
        &mut app,
        &mut doc,
        &json!({"action": "bookmarkSelection", "text": "The capital of France is Paris"}),
        1_000,
    );
    handle_message(
        &mut app,
        &mut doc,
        &json!({"action": "bookmarkSelection", "text": "Ask me anything else"}),
        2_000,
    );

    let response = handle_message(
        &mut app,
        &mut doc,
        &json!({"action": "deletePinnedMessage", "index": 0}),
        3_000,
    );
    assert_eq!(response["success"], true);
    let remaining = app.pins.list().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].text, "Ask me anything else");

    let out_of_range = handle_message(
        &mut app,
        &mut doc,
        &json!({"action": "deletePinnedMessage", "index": 9}),
        4_000,
    );
    assert_eq!(out_of_range["success"], false);
}

#[test]
fn save_and_delete_bookmark_round_trip() {
    let mut app = app();
    let mut doc = parse(PAGE);

    let saved = handle_message(
        &mut app,
        &mut doc,
        &json!({"action": "saveBookmark", "bookmark": {
            "id": "import-1",
            "text": "an imported record",
            "platform": "claude",
            "timestamp": 7
        }}),
        0,
    );
    assert_eq!(saved["success"], true);

    let deleted = handle_message(
        &mut app,
        &mut doc,
        &json!({"action": "deleteBookmark", "id": "import-1"}),
        0,
    );
    assert_eq!(deleted["success"], true);
    assert!(app.pins.list().unwrap().is_empty());

    let cleared = handle_message(&mut app, &mut doc, &json!({"action": "clearBookmarks"}), 0);
    assert_eq!(cleared["success"], true);
}

#[test]
fn unknown_messages_answer_softly() {
    let mut app = app();
    let mut doc = parse(PAGE);

    let unknown = handle_message(&mut app, &mut doc, &json!({"action": "explode"}), 0);
    assert_eq!(unknown["success"], false);
    assert!(unknown["error"].as_str().unwrap().contains("unknown message"));

    let empty = handle_message(&mut app, &mut doc, &json!({}), 0);
    assert_eq!(empty["success"], false);
}
