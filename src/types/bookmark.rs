use serde::{Deserialize, Serialize};

use crate::platform::Platform;

/// A persisted text selection plus the locators needed to find it again.
///
/// Serialized field names follow the stored extension-record shape
/// (`fullText`, `textContext`, `messageId`, `pageTitle`), so records written
/// by older builds deserialize unchanged. Every locator field is optional:
/// older records may lack `fullText`, and a DOM re-render silently
/// invalidates `xpath`/`selector` without making the record an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: String,
    /// Display fragment, capped at capture time.
    pub text: String,
    /// The complete selected text, kept whole for precise relocation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_text: Option<String>,
    /// Surrounding text, used only as a last-resort fuzzy-matching aid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xpath: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    /// Platform + message index + capture time. A hint, not a DOM key:
    /// message indices shift when history reloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default)]
    pub platform: Platform,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub page_title: String,
    /// Capture time, milliseconds since the epoch.
    pub timestamp: i64,
}

impl Bookmark {
    /// The text the locator searches for: the full selection when present,
    /// otherwise the (possibly truncated) display text.
    pub fn search_text(&self) -> &str {
        match self.full_text.as_deref() {
            Some(full) if !full.is_empty() => full,
            _ => &self.text,
        }
    }

    /// Builds a bookmark from a capture-time draft, assigning the id and
    /// timestamp the store chose.
    pub fn from_draft(draft: BookmarkDraft, id: String, timestamp: i64) -> Self {
        Self {
            id,
            text: draft.text,
            full_text: draft.full_text,
            text_context: draft.text_context,
            xpath: draft.xpath,
            selector: draft.selector,
            message_id: draft.message_id,
            platform: draft.platform,
            url: draft.url,
            page_title: draft.page_title,
            timestamp,
        }
    }
}

/// A bookmark as produced by the fingerprint builder, before the pin store
/// assigns its id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct BookmarkDraft {
    pub text: String,
    pub full_text: Option<String>,
    pub text_context: Option<String>,
    pub xpath: Option<String>,
    pub selector: Option<String>,
    pub message_id: Option<String>,
    pub platform: Platform,
    pub url: String,
    pub page_title: String,
}

/// Provenance of the page a capture happened on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    pub url: String,
    pub title: String,
}

impl PageInfo {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }
}
