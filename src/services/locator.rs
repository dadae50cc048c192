//! Layered relocation engine.
//!
//! Given a bookmark fingerprint, finds the best-matching node in the
//! current document. Layers run strictly in order, because structural
//! locators are cheap but brittle (a re-render silently invalidates them)
//! while text search is expensive but survives re-renders. The first layer
//! that accepts a candidate wins. Ties inside a layer go to the first candidate
//! in document order; there is no global best-of-all search. Searching
//! never mutates the document.
//!
//! 1. Structural: the captured XPath, then the captured CSS selector.
//! 2. Platform-scoped exact text inside message containers, descending to
//!    the most specific containing element.
//! 3. Fuzzy word-overlap over message containers using the captured
//!    surrounding context.
//! 4. Document-wide last resort: exact substring over every text node in
//!    the body, then fuzzy word-overlap with a lower acceptance bar.
//!
//! Any selector/XPath failure inside a layer is logged and treated as
//! "this layer found nothing"; errors never stop the fall-through.

use std::collections::HashSet;

use tracing::debug;

use crate::dom::{selector, xpath, Document, NodeId};
use crate::platform::{Platform, PlatformProfile, TextNormalizer};
use crate::types::bookmark::Bookmark;
use crate::types::settings::LocatorSettings;

const PARAGRAPH_TAGS: &[&str] = &["p"];
const INLINE_TAGS: &[&str] = &["span", "em", "strong", "b", "i", "a", "code", "mark", "u"];
const BLOCK_TAGS: &[&str] = &[
    "li", "pre", "blockquote", "h1", "h2", "h3", "h4", "h5", "h6", "td",
];

/// A byte range inside one text node, for exact-match highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRange {
    pub text_node: NodeId,
    pub start: usize,
    pub end: usize,
}

/// The locator's result: the scroll/highlight target, plus a precise
/// sub-range when the search text sits verbatim inside one text node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatedTarget {
    pub node: NodeId,
    pub range: Option<TextRange>,
}

pub struct Locator {
    settings: LocatorSettings,
}

impl Locator {
    pub fn new(settings: LocatorSettings) -> Self {
        Self { settings }
    }

    /// Finds the bookmarked location in the document, or `None` when every
    /// layer comes up empty.
    pub fn locate(
        &self,
        doc: &Document,
        bookmark: &Bookmark,
        page_profile: &PlatformProfile,
    ) -> Option<LocatedTarget> {
        // Platform scoping follows the current page; the bookmark's own
        // platform only matters when the page could not be identified.
        let bookmark_profile;
        let profile = if page_profile.platform == Platform::Unknown
            && bookmark.platform != Platform::Unknown
        {
            bookmark_profile = PlatformProfile::for_platform(bookmark.platform);
            &bookmark_profile
        } else {
            page_profile
        };

        let search = bookmark.search_text();

        if let Some(node) = self.structural_layer(doc, bookmark) {
            debug!(bookmark = %bookmark.id, "located via structural layer");
            return Some(self.targeted(doc, node, search));
        }

        if search.is_empty() {
            debug!(bookmark = %bookmark.id, "no search text; giving up after structural layer");
            return None;
        }

        if let Some(target) = self.platform_text_layer(doc, profile, search) {
            debug!(bookmark = %bookmark.id, "located via platform exact-text layer");
            return Some(target);
        }

        if let Some(target) = self.fuzzy_layer(doc, bookmark, profile) {
            debug!(bookmark = %bookmark.id, "located via fuzzy context layer");
            return Some(target);
        }

        if let Some(target) = self.document_wide_layer(doc, bookmark, search) {
            debug!(bookmark = %bookmark.id, "located via document-wide layer");
            return Some(target);
        }

        debug!(bookmark = %bookmark.id, "all layers exhausted");
        None
    }

    // --- layer 1: structural ---

    fn structural_layer(&self, doc: &Document, bookmark: &Bookmark) -> Option<NodeId> {
        if let Some(expr) = bookmark.xpath.as_deref() {
            match xpath::evaluate(doc, expr) {
                Ok(nodes) if nodes.len() == 1 => return Some(nodes[0]),
                Ok(nodes) => {
                    debug!(matches = nodes.len(), "xpath did not resolve to a unique node")
                }
                Err(e) => debug!(error = %e, "stale xpath failed to evaluate"),
            }
        }
        if let Some(sel) = bookmark.selector.as_deref() {
            match selector::query_all(doc, sel) {
                Ok(nodes) => match nodes.as_slice() {
                    [] => debug!("selector resolved to nothing"),
                    [only] => return Some(*only),
                    multiple => {
                        if !bookmark.text.is_empty() {
                            if let Some(&node) = multiple
                                .iter()
                                .find(|&&n| doc.text_content(n).contains(&bookmark.text))
                            {
                                return Some(node);
                            }
                        }
                        debug!(matches = multiple.len(), "ambiguous selector with no text tiebreak");
                    }
                },
                Err(e) => debug!(error = %e, "stale selector failed to evaluate"),
            }
        }
        None
    }

    // --- layer 2: platform-scoped exact text ---

    fn platform_text_layer(
        &self,
        doc: &Document,
        profile: &PlatformProfile,
        search: &str,
    ) -> Option<LocatedTarget> {
        let norm = profile.normalizer;
        for container in profile.message_containers(doc) {
            if !norm.contains(&doc.text_content(container), search) {
                continue;
            }
            let scope = profile.message_body(doc, container);
            let node = self
                .most_specific(doc, scope, search, norm)
                .unwrap_or(container);
            return Some(self.targeted(doc, node, search));
        }
        None
    }

    /// Descends from a matching container to the smallest element that still
    /// contains the search text: paragraphs, then short inline elements,
    /// then list/code/heading blocks, then the owning element of a matching
    /// text node.
    fn most_specific(
        &self,
        doc: &Document,
        scope: NodeId,
        search: &str,
        norm: TextNormalizer,
    ) -> Option<NodeId> {
        let elements = doc.elements_under(scope);
        let containing = |&n: &NodeId| norm.contains(&doc.text_content(n), search);

        if let Some(&p) = elements
            .iter()
            .filter(|&&n| tag_in(doc, n, PARAGRAPH_TAGS))
            .find(|&n| containing(n))
        {
            return Some(p);
        }

        let max_inline_len = search.chars().count() * self.settings.inline_max_len_factor;
        if let Some(&inline) = elements
            .iter()
            .filter(|&&n| tag_in(doc, n, INLINE_TAGS))
            .filter(|&&n| doc.text_content(n).chars().count() < max_inline_len)
            .find(|&n| containing(n))
        {
            return Some(inline);
        }

        if let Some(&block) = elements
            .iter()
            .filter(|&&n| tag_in(doc, n, BLOCK_TAGS))
            .find(|&n| containing(n))
        {
            return Some(block);
        }

        for text_node in doc.text_nodes_under(scope) {
            let Some(text) = doc.text(text_node) else {
                continue;
            };
            if norm.contains(text, search) {
                return doc.nearest_element(text_node);
            }
        }

        None
    }

    // --- layer 3: fuzzy word overlap over containers ---

    fn fuzzy_layer(
        &self,
        doc: &Document,
        bookmark: &Bookmark,
        profile: &PlatformProfile,
    ) -> Option<LocatedTarget> {
        let words = self.context_words(bookmark);
        if words.is_empty() {
            return None;
        }
        let containers = profile.message_containers(doc);
        let candidates = if containers.is_empty() {
            doc.text_nodes_under(doc.body())
        } else {
            containers
        };
        let node = self.best_fuzzy(doc, &candidates, &words, self.settings.fuzzy_accept_fraction)?;
        let node = doc.nearest_element(node).unwrap_or(node);
        Some(LocatedTarget { node, range: None })
    }

    // --- layer 4: document-wide last resort ---

    fn document_wide_layer(
        &self,
        doc: &Document,
        bookmark: &Bookmark,
        search: &str,
    ) -> Option<LocatedTarget> {
        let body = doc.body();
        for text_node in doc.text_nodes_under(body) {
            let Some(text) = doc.text(text_node) else {
                continue;
            };
            if let Some(start) = text.find(search) {
                let node = doc.nearest_element(text_node).unwrap_or(body);
                return Some(LocatedTarget {
                    node,
                    range: Some(TextRange {
                        text_node,
                        start,
                        end: start + search.len(),
                    }),
                });
            }
        }

        let words = self.context_words(bookmark);
        if words.is_empty() {
            return None;
        }
        let text_nodes = doc.text_nodes_under(body);
        let node = self.best_fuzzy(
            doc,
            &text_nodes,
            &words,
            self.settings.fallback_accept_fraction,
        )?;
        let node = doc.nearest_element(node).unwrap_or(body);
        Some(LocatedTarget { node, range: None })
    }

    // --- shared helpers ---

    /// Distinct lowercase words longer than the configured minimum, taken
    /// from the captured context (or the display text when no context was
    /// captured).
    fn context_words(&self, bookmark: &Bookmark) -> Vec<String> {
        let source = bookmark
            .text_context
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&bookmark.text);
        let mut seen = HashSet::new();
        source
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() > self.settings.min_word_len)
            .map(|w| w.to_lowercase())
            .filter(|w| seen.insert(w.clone()))
            .collect()
    }

    /// Highest word-overlap candidate, accepted only at or above the given
    /// fraction of all words. Earlier candidates win ties.
    fn best_fuzzy(
        &self,
        doc: &Document,
        candidates: &[NodeId],
        words: &[String],
        accept_fraction: f64,
    ) -> Option<NodeId> {
        let mut best: Option<(NodeId, usize)> = None;
        for &candidate in candidates {
            let content = doc.text_content(candidate).to_lowercase();
            let score = words.iter().filter(|w| content.contains(w.as_str())).count();
            if score == 0 {
                continue;
            }
            if best.map(|(_, s)| score > s).unwrap_or(true) {
                best = Some((candidate, score));
            }
        }
        let (node, score) = best?;
        if (score as f64) >= accept_fraction * (words.len() as f64) {
            Some(node)
        } else {
            debug!(
                score,
                total = words.len(),
                "best fuzzy candidate below acceptance threshold"
            );
            None
        }
    }

    /// Wraps an accepted node with a precise range when the search text sits
    /// verbatim inside a single text node beneath it.
    fn targeted(&self, doc: &Document, node: NodeId, search: &str) -> LocatedTarget {
        let range = if search.is_empty() {
            None
        } else {
            find_exact_range(doc, node, search)
        };
        LocatedTarget { node, range }
    }
}

fn tag_in(doc: &Document, node: NodeId, tags: &[&str]) -> bool {
    doc.tag(node).map(|t| tags.contains(&t)).unwrap_or(false)
}

/// Byte range of `needle` within a single text node under `scope` (or
/// `scope` itself when it is a text node).
fn find_exact_range(doc: &Document, scope: NodeId, needle: &str) -> Option<TextRange> {
    let candidates = if doc.is_text(scope) {
        vec![scope]
    } else {
        doc.text_nodes_under(scope)
    };
    for text_node in candidates {
        if let Some(start) = doc.text(text_node).and_then(|t| t.find(needle)) {
            return Some(TextRange {
                text_node,
                start,
                end: start + needle.len(),
            });
        }
    }
    None
}
