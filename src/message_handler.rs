//! JSON message dispatch between extension surfaces and the page engine.
//!
//! The popup, background worker, and content script exchange plain JSON
//! messages keyed by `action` (or the legacy `type` field). `handle_message`
//! dispatches one message against the page's [`App`] and document and
//! returns the JSON response.
//!
//! Shapes handled:
//! - `{"action": "scrollToBookmark", "bookmark": {…}}` → `{"success": bool}`
//! - `{"type": "JUMP_TO_MESSAGE", "bookmark": {…}}` — legacy alias
//! - `{"type": "TOGGLE_STATE", "enabled": bool}`
//! - `{"action": "bookmarkSelection", "text": "…", "anchor": n?}`
//! - `{"action": "getBookmarks" | "saveBookmark" | "deleteBookmark" |
//!    "deletePinnedMessage" | "clearBookmarks", …}`

use serde_json::{json, Value};

use crate::app::App;
use crate::dom::{Document, NodeId};
use crate::managers::pin_store::PinStoreTrait;
use crate::types::bookmark::Bookmark;

/// Dispatches one message. Never panics and never returns a non-object:
/// every outcome, including malformed input, is a JSON response.
pub fn handle_message(app: &mut App, doc: &mut Document, message: &Value, now_ms: u64) -> Value {
    let kind = message
        .get("action")
        .or_else(|| message.get("type"))
        .and_then(|v| v.as_str())
        .unwrap_or("");

    match kind {
        // ─── Relocation ───
        "scrollToBookmark" | "JUMP_TO_MESSAGE" => {
            let bookmark = match parse_bookmark(message) {
                Ok(b) => b,
                Err(response) => return response,
            };
            match app.jump_to_bookmark(doc, &bookmark, now_ms) {
                Some(scroll) => json!({
                    "success": true,
                    "scroll": {
                        "node": scroll.node.index(),
                        "behavior": scroll.behavior.as_str(),
                        "block": scroll.block.as_str(),
                    },
                }),
                None => json!({"success": false}),
            }
        }

        // ─── Capture toggle ───
        "TOGGLE_STATE" => {
            let Some(enabled) = message.get("enabled").and_then(|v| v.as_bool()) else {
                return json!({"success": false, "error": "missing enabled"});
            };
            match app.pins.set_enabled(enabled) {
                Ok(()) => json!({"success": true}),
                Err(e) => json!({"success": false, "error": e.to_string()}),
            }
        }

        // ─── Capture (context-menu path) ───
        "bookmarkSelection" => {
            if !app.pins.enabled().unwrap_or(true) {
                return json!({"success": false, "error": "capture disabled"});
            }
            let Some(text) = message.get("text").and_then(|v| v.as_str()) else {
                return json!({"success": false, "error": "missing text"});
            };
            let anchor = resolve_anchor(doc, message, text);
            match app.capture_selection(doc, text, anchor, now_ms as i64) {
                Ok(bookmark) => {
                    app.notifications.success("Bookmark saved", now_ms);
                    json!({
                        "success": true,
                        "bookmark": serde_json::to_value(&bookmark).unwrap_or(Value::Null),
                    })
                }
                Err(e) => {
                    app.notifications.error(&e.to_string(), now_ms);
                    json!({"success": false, "error": e.to_string()})
                }
            }
        }

        // ─── Pin list (popup/background) ───
        "getBookmarks" => match app.pins.recent_first() {
            Ok(bookmarks) => json!({
                "bookmarks": serde_json::to_value(&bookmarks).unwrap_or_else(|_| json!([])),
            }),
            Err(e) => json!({"bookmarks": [], "error": e.to_string()}),
        },
        "saveBookmark" => {
            let bookmark = match parse_bookmark(message) {
                Ok(b) => b,
                Err(response) => return response,
            };
            match app.pins.insert(bookmark) {
                Ok(()) => json!({"success": true}),
                Err(e) => json!({"success": false, "error": e.to_string()}),
            }
        }
        "deleteBookmark" => {
            let Some(id) = message.get("id").and_then(|v| v.as_str()) else {
                return json!({"success": false, "error": "missing id"});
            };
            match app.pins.delete(id) {
                Ok(()) => json!({"success": true}),
                Err(e) => json!({"success": false, "error": e.to_string()}),
            }
        }
        "deletePinnedMessage" => {
            let Some(index) = message.get("index").and_then(|v| v.as_u64()) else {
                return json!({"success": false, "error": "missing index"});
            };
            match app.pins.delete_at(index as usize) {
                Ok(removed) => json!({"success": true, "id": removed.id}),
                Err(e) => json!({"success": false, "error": e.to_string()}),
            }
        }
        "clearBookmarks" => match app.pins.clear() {
            Ok(()) => json!({"success": true}),
            Err(e) => json!({"success": false, "error": e.to_string()}),
        },

        "" => json!({"success": false, "error": "missing action"}),
        other => json!({"success": false, "error": format!("unknown message: {}", other)}),
    }
}

fn parse_bookmark(message: &Value) -> Result<Bookmark, Value> {
    let Some(value) = message.get("bookmark") else {
        return Err(json!({"success": false, "error": "missing bookmark"}));
    };
    serde_json::from_value(value.clone())
        .map_err(|e| json!({"success": false, "error": format!("invalid bookmark: {}", e)}))
}

/// Picks the capture anchor: an explicit arena index when the sender has
/// one, else the first text node containing the selection, else the body.
fn resolve_anchor(doc: &Document, message: &Value, text: &str) -> NodeId {
    if let Some(index) = message.get("anchor").and_then(|v| v.as_u64()) {
        let index = index as usize;
        if index < doc.node_count() {
            return NodeId::from_index(index);
        }
    }
    let needle = text.trim();
    doc.text_nodes_under(doc.body())
        .into_iter()
        .find(|&n| doc.text(n).map(|t| t.contains(needle)).unwrap_or(false))
        .unwrap_or_else(|| doc.body())
}
