//! Scroll-and-highlight controller.
//!
//! Owns the two pieces of page-wide mutable state the engine has: the
//! injected highlight stylesheet node and the currently highlighted
//! location. Clearing the previous highlight is a precondition of applying
//! a new one; highlights never stack.
//!
//! Timing is host-driven: `jump_to` issues the scroll command and records a
//! pending highlight due after the scroll-settle delay; `tick` applies due
//! highlights and expires old ones. Scroll is therefore always initiated
//! before the highlight appears, but nothing waits for the scroll animation
//! to finish. That is a deliberate best-effort relaxation.

use crate::dom::{Document, NodeId};
use crate::services::locator::{LocatedTarget, TextRange};
use crate::types::settings::HighlightSettings;

pub const HIGHLIGHT_CLASS: &str = "chatmarks-highlight";
pub const STYLE_NODE_ID: &str = "chatmarks-style";

const HIGHLIGHT_CSS: &str = ".chatmarks-highlight { background-color: #fff3a3; border-radius: 2px; transition: background-color 0.3s ease; }";

/// How the host should scroll to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollCommand {
    pub node: NodeId,
    pub behavior: ScrollBehavior,
    pub block: ScrollAlignment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

impl ScrollBehavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrollBehavior::Smooth => "smooth",
            ScrollBehavior::Instant => "instant",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAlignment {
    Center,
    Start,
}

impl ScrollAlignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrollAlignment::Center => "center",
            ScrollAlignment::Start => "start",
        }
    }
}

#[derive(Debug, Clone)]
struct PendingHighlight {
    target: LocatedTarget,
    due_at: u64,
}

/// What was mutated to show the current highlight, with everything needed
/// to put the document back exactly as it was.
#[derive(Debug, Clone)]
enum ActiveHighlight {
    /// A text node was split into (before, span, after).
    Span {
        inserted: Vec<NodeId>,
        original: String,
    },
    /// The highlight class was toggled on a whole element.
    Element {
        node: NodeId,
        previous_class: Option<String>,
    },
}

pub struct HighlightController {
    settings: HighlightSettings,
    pending: Option<PendingHighlight>,
    active: Option<ActiveHighlight>,
    expires_at: Option<u64>,
}

impl HighlightController {
    pub fn new(settings: HighlightSettings) -> Self {
        Self {
            settings,
            pending: None,
            active: None,
            expires_at: None,
        }
    }

    /// Starts a jump: clears any previous highlight, ensures the shared
    /// stylesheet node exists, schedules the highlight, and returns the
    /// scroll command for the host to execute.
    pub fn jump_to(
        &mut self,
        doc: &mut Document,
        target: &LocatedTarget,
        now_ms: u64,
    ) -> ScrollCommand {
        self.clear(doc);
        ensure_style(doc);
        self.pending = Some(PendingHighlight {
            target: *target,
            due_at: now_ms + self.settings.scroll_settle_ms,
        });
        ScrollCommand {
            node: target.node,
            behavior: ScrollBehavior::Smooth,
            block: ScrollAlignment::Center,
        }
    }

    /// Advances controller time: applies a due pending highlight and
    /// removes an expired active one.
    pub fn tick(&mut self, doc: &mut Document, now_ms: u64) {
        if let Some(pending) = self.pending.take() {
            if now_ms >= pending.due_at {
                self.apply(doc, &pending.target);
                self.expires_at = Some(now_ms + self.settings.highlight_duration_ms);
            } else {
                self.pending = Some(pending);
            }
        }
        if let Some(expires_at) = self.expires_at {
            if self.active.is_some() && now_ms >= expires_at {
                self.clear(doc);
            }
        }
    }

    /// Removes the current highlight (and any scheduled one), restoring the
    /// document structure exactly. Idempotent.
    pub fn clear(&mut self, doc: &mut Document) {
        self.pending = None;
        self.expires_at = None;
        match self.active.take() {
            Some(ActiveHighlight::Span { inserted, original }) => {
                let restored = doc.create_text(&original);
                if let Some((&first, rest)) = inserted.split_first() {
                    doc.replace_with(first, &[restored]);
                    for &node in rest {
                        doc.detach(node);
                    }
                }
            }
            Some(ActiveHighlight::Element {
                node,
                previous_class,
            }) => match previous_class {
                Some(class) => doc.set_attr(node, "class", &class),
                None => doc.remove_attr(node, "class"),
            },
            None => {}
        }
    }

    pub fn has_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn apply(&mut self, doc: &mut Document, target: &LocatedTarget) {
        match target.range.filter(|r| range_is_current(doc, r)) {
            Some(range) => self.apply_range(doc, range),
            None => self.apply_element(doc, target.node),
        }
    }

    /// Splits the matched text node into (before, match, after) and wraps
    /// only the match in a highlight span. Adjacent text is preserved
    /// exactly; `clear` merges the pieces back into one text node.
    fn apply_range(&mut self, doc: &mut Document, range: TextRange) {
        let Some(original) = doc.text(range.text_node).map(str::to_string) else {
            return;
        };
        let before = &original[..range.start];
        let matched = &original[range.start..range.end];
        let after = &original[range.end..];

        let mut inserted = Vec::new();
        if !before.is_empty() {
            inserted.push(doc.create_text(before));
        }
        let span = doc.create_element("span");
        doc.set_attr(span, "class", HIGHLIGHT_CLASS);
        let matched_text = doc.create_text(matched);
        doc.append_child(span, matched_text);
        inserted.push(span);
        if !after.is_empty() {
            inserted.push(doc.create_text(after));
        }

        doc.replace_with(range.text_node, &inserted);
        self.active = Some(ActiveHighlight::Span { inserted, original });
    }

    fn apply_element(&mut self, doc: &mut Document, node: NodeId) {
        if !doc.is_element(node) {
            return;
        }
        let previous_class = doc.attr(node, "class").map(str::to_string);
        let new_class = match &previous_class {
            Some(existing) if !existing.is_empty() => format!("{} {}", existing, HIGHLIGHT_CLASS),
            _ => HIGHLIGHT_CLASS.to_string(),
        };
        doc.set_attr(node, "class", &new_class);
        self.active = Some(ActiveHighlight::Element {
            node,
            previous_class,
        });
    }
}

/// A captured range can go stale if the document mutated after location
/// (including by the previous highlight's own unwrap); applying it anyway
/// would corrupt unrelated text or write into a detached subtree.
fn range_is_current(doc: &Document, range: &TextRange) -> bool {
    match doc.text(range.text_node) {
        Some(text) => {
            range.start < range.end
                && text.is_char_boundary(range.start)
                && range.end <= text.len()
                && text.is_char_boundary(range.end)
                && doc.is_attached(range.text_node)
        }
        None => false,
    }
}

/// Injects the shared highlight stylesheet node once per document.
pub fn ensure_style(doc: &mut Document) {
    let already_present = doc
        .elements_under(doc.root())
        .into_iter()
        .any(|n| doc.tag(n) == Some("style") && doc.attr(n, "id") == Some(STYLE_NODE_ID));
    if already_present {
        return;
    }
    let style = doc.create_element("style");
    doc.set_attr(style, "id", STYLE_NODE_ID);
    let css = doc.create_text(HIGHLIGHT_CSS);
    doc.append_child(style, css);
    let parent = doc.head().unwrap_or_else(|| doc.root());
    doc.append_child(parent, style);
}
