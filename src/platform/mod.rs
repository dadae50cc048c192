//! Chat platform detection and per-platform DOM knowledge.
//!
//! Every platform-specific fact lives in a [`PlatformProfile`] selected once
//! per page load and passed explicitly to the capture and relocation
//! services. No per-call platform branching exists anywhere else in the
//! engine.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::dom::selector::SelectorList;
use crate::dom::{Document, NodeId};

/// A supported chat site, or `Unknown` for anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    ChatGpt,
    Claude,
    Grok,
    Unknown,
}

impl Platform {
    /// Maps a page URL to a platform via substring checks on the host/URL.
    pub fn detect(url: &str) -> Self {
        if url.contains("chatgpt.com") || url.contains("chat.openai.com") {
            Platform::ChatGpt
        } else if url.contains("claude.ai") {
            Platform::Claude
        } else if url.contains("grok.x.ai") {
            Platform::Grok
        } else {
            Platform::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::ChatGpt => "chatgpt",
            Platform::Claude => "claude",
            Platform::Grok => "grok",
            Platform::Unknown => "unknown",
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Platform::Unknown
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How text containment is compared for a platform's transcript markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextNormalizer {
    /// Verbatim, case-sensitive substring containment.
    Exact,
    /// Case-insensitive containment with runs of whitespace collapsed.
    Collapsed,
}

impl TextNormalizer {
    pub fn normalize(&self, text: &str) -> String {
        match self {
            TextNormalizer::Exact => text.to_string(),
            TextNormalizer::Collapsed => {
                let mut out = String::with_capacity(text.len());
                let mut last_was_space = false;
                for c in text.chars() {
                    if c.is_whitespace() {
                        if !last_was_space && !out.is_empty() {
                            out.push(' ');
                        }
                        last_was_space = true;
                    } else {
                        out.extend(c.to_lowercase());
                        last_was_space = false;
                    }
                }
                if out.ends_with(' ') {
                    out.pop();
                }
                out
            }
        }
    }

    pub fn contains(&self, haystack: &str, needle: &str) -> bool {
        match self {
            TextNormalizer::Exact => haystack.contains(needle),
            TextNormalizer::Collapsed => self.normalize(haystack).contains(&self.normalize(needle)),
        }
    }
}

/// Per-platform DOM knowledge: which containers are messages, where the
/// message body text lives, and how text is compared.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformProfile {
    pub platform: Platform,
    /// Selector group matching message containers, `None` for unknown pages.
    pub container_selector: Option<&'static str>,
    /// Sub-container that narrows text search inside a message.
    pub body_selector: Option<&'static str>,
    pub normalizer: TextNormalizer,
}

impl PlatformProfile {
    /// The profile for a detected platform.
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::ChatGpt => Self {
                platform,
                container_selector: Some("[data-message-author-role]"),
                body_selector: Some(".markdown"),
                normalizer: TextNormalizer::Collapsed,
            },
            Platform::Claude => Self {
                platform,
                container_selector: Some(
                    "[data-testid=\"conversation-turn\"], .font-claude-message",
                ),
                body_selector: Some(".prose"),
                normalizer: TextNormalizer::Exact,
            },
            Platform::Grok => Self {
                platform,
                container_selector: Some(".message-bubble"),
                body_selector: None,
                normalizer: TextNormalizer::Collapsed,
            },
            Platform::Unknown => Self {
                platform,
                container_selector: None,
                body_selector: None,
                normalizer: TextNormalizer::Collapsed,
            },
        }
    }

    /// Detects the platform from a page URL and returns its profile.
    pub fn detect(url: &str) -> Self {
        Self::for_platform(Platform::detect(url))
    }

    /// All message containers in document order. Read-only; zero matches
    /// (or no selector for this platform) is an empty list, never an error.
    pub fn message_containers(&self, doc: &Document) -> Vec<NodeId> {
        let Some(selector) = self.container_selector else {
            return Vec::new();
        };
        match SelectorList::parse(selector) {
            Ok(list) => list.query_all(doc, doc.root()),
            Err(_) => Vec::new(),
        }
    }

    /// Nearest enclosing message container of a node, if any.
    pub fn enclosing_container(&self, doc: &Document, node: NodeId) -> Option<NodeId> {
        let selector = self.container_selector?;
        let list = SelectorList::parse(selector).ok()?;
        let mut cur = doc.nearest_element(node);
        while let Some(n) = cur {
            if list.matches(doc, n) {
                return Some(n);
            }
            cur = doc.parent(n);
        }
        None
    }

    /// The message-body element inside a container, when the platform marks
    /// one; the container itself otherwise.
    pub fn message_body(&self, doc: &Document, container: NodeId) -> NodeId {
        let Some(selector) = self.body_selector else {
            return container;
        };
        match SelectorList::parse(selector) {
            Ok(list) => list
                .query_all(doc, container)
                .into_iter()
                .next()
                .unwrap_or(container),
            Err(_) => container,
        }
    }
}
