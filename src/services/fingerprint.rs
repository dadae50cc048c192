//! Fingerprint builder: turns a live text selection into a bookmark draft.
//!
//! The draft carries the selected text plus every relocation aid that can
//! be computed cheaply at capture time: surrounding context, a CSS
//! selector and an XPath for the enclosing message container, and a
//! message-id hint. Only the text itself is load-bearing; every other
//! field may silently go stale and the locator treats it as advisory.

use tracing::warn;
use uuid::Uuid;

use crate::dom::{xpath, Document, NodeId};
use crate::platform::PlatformProfile;
use crate::types::bookmark::{BookmarkDraft, PageInfo};
use crate::types::errors::CaptureError;
use crate::types::settings::CaptureSettings;

pub struct FingerprintBuilder {
    settings: CaptureSettings,
}

impl FingerprintBuilder {
    pub fn new(settings: CaptureSettings) -> Self {
        Self { settings }
    }

    /// Builds a bookmark draft from a selection anchored at `anchor`.
    ///
    /// Fails only on empty/too-short selections. Failures while computing
    /// context or structural locators degrade those fields to `None`; they
    /// never abort the capture of the text itself.
    pub fn capture(
        &self,
        doc: &Document,
        selection: &str,
        anchor: NodeId,
        profile: &PlatformProfile,
        page: &PageInfo,
        now_ms: i64,
    ) -> Result<BookmarkDraft, CaptureError> {
        let trimmed = selection.trim();
        if trimmed.is_empty() {
            return Err(CaptureError::EmptySelection);
        }
        let len = trimmed.chars().count();
        if len < self.settings.min_selection_len {
            return Err(CaptureError::SelectionTooShort {
                len,
                min: self.settings.min_selection_len,
            });
        }

        let container = profile.enclosing_container(doc, anchor);
        let message_id = Some(self.message_id(doc, profile, container, now_ms));
        let text_context = self.surrounding_context(doc, anchor);

        // Structural locators target the container when one was found, else
        // the nearest element around the anchor.
        let locator_target = container.or_else(|| doc.nearest_element(anchor));
        let (selector, xpath) = match locator_target {
            Some(target) => (
                self.css_selector_for(doc, target, profile),
                xpath::build(doc, target),
            ),
            None => {
                warn!("no enclosing element for selection anchor; skipping structural locators");
                (None, None)
            }
        };

        Ok(BookmarkDraft {
            text: truncate_chars(trimmed, self.settings.display_text_cap),
            full_text: Some(trimmed.to_string()),
            text_context,
            xpath,
            selector,
            message_id,
            platform: profile.platform,
            url: page.url.clone(),
            page_title: page.title.clone(),
        })
    }

    /// `{platform}-{index}-{timestamp}` when the selection sits inside a
    /// known message container; a synthetic `{platform}-sel-{uuid}` when it
    /// does not. The synthetic form is deliberately not position-based,
    /// because page positions drift as history reloads.
    fn message_id(
        &self,
        doc: &Document,
        profile: &PlatformProfile,
        container: Option<NodeId>,
        now_ms: i64,
    ) -> String {
        if let Some(container) = container {
            let index = profile
                .message_containers(doc)
                .iter()
                .position(|&c| c == container)
                .unwrap_or(0);
            return format!("{}-{}-{}", profile.platform, index, now_ms);
        }
        let uuid = Uuid::new_v4().simple().to_string();
        format!("{}-sel-{}", profile.platform, &uuid[..8])
    }

    /// Walks up a few ancestor levels from the anchor and keeps the longest
    /// text seen, capped. Intentionally imprecise; used only as the
    /// last-resort fuzzy-matching aid.
    fn surrounding_context(&self, doc: &Document, anchor: NodeId) -> Option<String> {
        let mut best = String::new();
        let mut cur = doc.nearest_element(anchor);
        for _ in 0..self.settings.context_ancestor_levels {
            let node = cur?;
            let content = doc.text_content(node);
            if content.chars().count() > best.chars().count() {
                best = content;
            }
            cur = doc.parent(node).filter(|&p| doc.is_element(p));
            if cur.is_none() {
                break;
            }
        }
        let best = best.trim();
        if best.is_empty() {
            None
        } else {
            Some(truncate_chars(best, self.settings.context_char_cap))
        }
    }

    /// Platform-aware CSS selector for the container: a known message-body
    /// class when the element carries one, else its id, else a
    /// tag:nth-of-type child chain from the root.
    fn css_selector_for(
        &self,
        doc: &Document,
        node: NodeId,
        profile: &PlatformProfile,
    ) -> Option<String> {
        if let Some(body_selector) = profile.body_selector {
            if matches_quietly(doc, node, body_selector) {
                return Some(body_selector.to_string());
            }
        }
        if let Some(id) = doc.attr(node, "id") {
            if !id.is_empty() && is_css_identifier(id) {
                return Some(format!("#{}", id));
            }
        }
        let mut steps = Vec::new();
        let mut cur = Some(node);
        while let Some(n) = cur {
            let Some(tag) = doc.tag(n) else { break };
            steps.push(format!("{}:nth-of-type({})", tag, doc.same_tag_index(n)));
            cur = doc.parent(n).filter(|&p| doc.is_element(p));
        }
        if steps.is_empty() {
            warn!("could not synthesize a selector chain for capture target");
            return None;
        }
        steps.reverse();
        Some(steps.join(" > "))
    }
}

fn matches_quietly(doc: &Document, node: NodeId, selector: &str) -> bool {
    crate::dom::selector::matches(doc, node, selector).unwrap_or(false)
}

fn is_css_identifier(value: &str) -> bool {
    !value.chars().next().map(|c| c.is_ascii_digit()).unwrap_or(true)
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Char-boundary-safe truncation.
fn truncate_chars(text: &str, cap: usize) -> String {
    match text.char_indices().nth(cap) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
