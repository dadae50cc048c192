//! chatmarks — console demo.
//!
//! Walks every engine component against a small ChatGPT-style transcript
//! snapshot: capture, relocation through each search layer, highlighting,
//! storage, and the message protocol.

use chatmarks::app::App;
use chatmarks::dom::{parse, selector};
use chatmarks::message_handler::handle_message;
use chatmarks::platform::{Platform, PlatformProfile};
use chatmarks::services::fingerprint::FingerprintBuilder;
use chatmarks::services::locator::Locator;
use chatmarks::services::notifications::NotificationKind;
use chatmarks::services::settings::{SettingsEngine, SettingsEngineTrait};
use chatmarks::services::watcher::MutationWatcher;
use chatmarks::storage::{MemoryGateway, SqliteGateway, StorageGateway};
use chatmarks::types::bookmark::PageInfo;
use chatmarks::types::settings::EngineSettings;

const TRANSCRIPT: &str = r#"<html><head><title>Geography chat</title></head><body>
<div data-message-author-role="user"><div class="markdown"><p>What is the capital of France?</p></div></div>
<div data-message-author-role="assistant"><div class="markdown">
<p>The capital of France is Paris. It has been the seat of government since the 10th century.</p>
<p>Other large French cities include <b>Lyon</b> and <b>Marseille</b>.</p>
</div></div>
</body></html>"#;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!();
    println!("chatmarks v{} demo mode", env!("CARGO_PKG_VERSION"));
    println!();

    demo_dom();
    demo_platform();
    demo_storage();
    demo_settings();
    demo_capture_and_locate();
    demo_highlight();
    demo_watcher();
    demo_messages();

    println!("All components demonstrated.");
}

fn section(name: &str) {
    println!("--- {} ---", name);
}

fn demo_dom() {
    section("Document model");
    let doc = parse(TRANSCRIPT);
    let paragraphs = selector::query_all(&doc, "p").unwrap();
    println!("  Parsed transcript: {} nodes, {} paragraphs", doc.node_count(), paragraphs.len());
    println!("  First paragraph: {:?}", doc.text_content(paragraphs[0]));
    println!();
}

fn demo_platform() {
    section("Platform profiles");
    for url in [
        "https://chatgpt.com/c/123",
        "https://claude.ai/chat/456",
        "https://grok.x.ai/chat",
        "https://example.com",
    ] {
        println!("  {} -> {}", url, Platform::detect(url));
    }
    let doc = parse(TRANSCRIPT);
    let profile = PlatformProfile::for_platform(Platform::ChatGpt);
    println!("  ChatGPT containers found: {}", profile.message_containers(&doc).len());
    println!();
}

fn demo_storage() {
    section("Storage gateways");
    let mut memory = MemoryGateway::new();
    memory.set("bookmarks", serde_json::json!([])).unwrap();
    println!("  Memory gateway round-trip: {:?}", memory.get("bookmarks").unwrap());

    let mut sqlite = SqliteGateway::open_in_memory().unwrap();
    sqlite.subscribe(Box::new(|key| println!("  (change notification: {})", key)));
    sqlite.set("extensionEnabled", serde_json::json!(true)).unwrap();
    println!("  SQLite gateway round-trip: {:?}", sqlite.get("extensionEnabled").unwrap());
    println!();
}

fn demo_settings() {
    section("Settings engine");
    let dir = std::env::temp_dir().join("chatmarks-demo");
    let mut engine = SettingsEngine::new(Some(dir.join("settings.json")));
    engine.load().unwrap();
    println!("  min_selection_len = {}", engine.get_settings().capture.min_selection_len);
    engine.set_value("locator.fuzzy_accept_fraction", serde_json::json!(0.4)).unwrap();
    println!("  tuned fuzzy_accept_fraction = {}", engine.get_settings().locator.fuzzy_accept_fraction);
    engine.reset().unwrap();
    let _ = std::fs::remove_dir_all(&dir);
    println!();
}

fn demo_capture_and_locate() {
    section("Capture + layered relocation");
    let doc = parse(TRANSCRIPT);
    let settings = EngineSettings::default();
    let profile = PlatformProfile::for_platform(Platform::ChatGpt);
    let page = PageInfo::new("https://chatgpt.com/c/123", "Geography chat");
    let builder = FingerprintBuilder::new(settings.capture.clone());

    let selection = "The capital of France is Paris";
    let anchor = doc
        .text_nodes_under(doc.body())
        .into_iter()
        .find(|&n| doc.text(n).map(|t| t.contains(selection)).unwrap_or(false))
        .unwrap();
    let draft = builder.capture(&doc, selection, anchor, &profile, &page, 1_700_000_000_000).unwrap();
    println!("  Captured: {:?}", draft.text);
    println!("  message_id = {:?}", draft.message_id);
    println!("  selector = {:?}", draft.selector);
    println!("  xpath = {:?}", draft.xpath);

    let bookmark = chatmarks::types::bookmark::Bookmark::from_draft(
        draft,
        "demo-1".to_string(),
        1_700_000_000_000,
    );
    let locator = Locator::new(settings.locator.clone());
    let target = locator.locate(&doc, &bookmark, &profile).unwrap();
    println!("  Relocated to <{}>: {:?}", doc.tag(target.node).unwrap_or("?"), doc.text_content(target.node));
    println!("  Precise range: {}", target.range.is_some());
    println!();
}

fn demo_highlight() {
    section("Highlight controller");
    let mut doc = parse(TRANSCRIPT);
    let settings = EngineSettings::default();
    let gateway = Box::new(MemoryGateway::new());
    let page = PageInfo::new("https://chatgpt.com/c/123", "Geography chat");
    let mut app = App::new(gateway, page, settings);

    let anchor = doc
        .text_nodes_under(doc.body())
        .into_iter()
        .find(|&n| doc.text(n).map(|t| t.contains("Paris")).unwrap_or(false))
        .unwrap();
    let bookmark = app
        .capture_selection(&doc, "The capital of France is Paris", anchor, 1_700_000_000_000)
        .unwrap();

    let before = doc.text_content(doc.body());
    let scroll = app.jump_to_bookmark(&mut doc, &bookmark, 0).unwrap();
    println!("  Scroll command: node {} ({}, {})", scroll.node.index(), scroll.behavior.as_str(), scroll.block.as_str());

    app.tick(&mut doc, 300);
    println!("  Highlight active after settle delay: {}", app.highlights.has_active());
    app.tick(&mut doc, 6000);
    println!("  Highlight active after expiry: {}", app.highlights.has_active());
    println!("  Text restored byte-identical: {}", doc.text_content(doc.body()) == before);
    println!();
}

fn demo_watcher() {
    section("Mutation watcher");
    let mut watcher = MutationWatcher::new(250);
    watcher.record_added(4, 1000);
    watcher.record_added(3, 1100);
    println!("  poll at 1200ms -> {:?}", watcher.poll(1200));
    println!("  poll at 1400ms -> {:?}", watcher.poll(1400));
    println!();
}

fn demo_messages() {
    section("Message protocol");
    let mut doc = parse(TRANSCRIPT);
    let settings = EngineSettings::default();
    let page = PageInfo::new("https://chatgpt.com/c/123", "Geography chat");
    let mut app = App::new(Box::new(MemoryGateway::new()), page, settings);
    println!("  Startup: capture enabled = {}", app.startup());

    let capture = handle_message(
        &mut app,
        &mut doc,
        &serde_json::json!({"action": "bookmarkSelection", "text": "The capital of France is Paris"}),
        1_700_000_000_000,
    );
    println!("  bookmarkSelection -> {}", capture);

    let list = handle_message(&mut app, &mut doc, &serde_json::json!({"action": "getBookmarks"}), 0);
    let bookmark = list["bookmarks"][0].clone();
    let jump = handle_message(
        &mut app,
        &mut doc,
        &serde_json::json!({"action": "scrollToBookmark", "bookmark": bookmark}),
        0,
    );
    println!("  scrollToBookmark -> {}", jump);

    let toggle = handle_message(
        &mut app,
        &mut doc,
        &serde_json::json!({"type": "TOGGLE_STATE", "enabled": false}),
        0,
    );
    println!("  TOGGLE_STATE -> {}", toggle);

    app.notifications.show(NotificationKind::Info, "demo finished", 0);
    println!("  Active toasts: {}", app.notifications.active(0).len());
    println!();
}
