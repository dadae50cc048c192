//! XPath subset: builds location paths at capture time and evaluates them
//! at relocation time.
//!
//! Only the shapes the fingerprint builder emits are supported:
//! `//*[@id="…"]`, `//tag`, `//tag[@attr="…"]`, and absolute step chains
//! such as `/html/body/div[3]/p[2]` with optional 1-based same-tag indices.
//! Everything else is [`DomError::XPath`]; the locator downgrades that to a
//! structural-layer miss.

use super::{Document, NodeId};
use crate::types::errors::DomError;

/// Builds a location path for an element (text nodes resolve to their
/// parent element). Prefers an id anchor when one exists; otherwise emits
/// an absolute indexed step chain from the root.
pub fn build(doc: &Document, node: NodeId) -> Option<String> {
    let element = doc.nearest_element(node)?;
    if let Some(id) = doc.attr(element, "id") {
        if !id.is_empty() && !id.contains('"') {
            return Some(format!("//*[@id=\"{}\"]", id));
        }
    }
    let mut steps = Vec::new();
    let mut cur = Some(element);
    while let Some(n) = cur {
        let Some(tag) = doc.tag(n) else { break };
        steps.push(format!("{}[{}]", tag, doc.same_tag_index(n)));
        cur = doc.parent(n);
    }
    if steps.is_empty() {
        return None;
    }
    steps.reverse();
    Some(format!("/{}", steps.join("/")))
}

/// Evaluates a supported expression, returning matches in document order.
pub fn evaluate(doc: &Document, expr: &str) -> Result<Vec<NodeId>, DomError> {
    let expr = expr.trim();
    if expr.is_empty() {
        return Err(DomError::XPath(expr.to_string()));
    }
    if let Some(rest) = expr.strip_prefix("//") {
        return evaluate_anywhere(doc, rest, expr);
    }
    if let Some(rest) = expr.strip_prefix('/') {
        return evaluate_absolute(doc, rest, expr);
    }
    Err(DomError::XPath(expr.to_string()))
}

/// `//name` or `//name[@attr="value"]` (name may be `*`).
fn evaluate_anywhere(doc: &Document, rest: &str, full: &str) -> Result<Vec<NodeId>, DomError> {
    if rest.contains('/') {
        // Multi-step anywhere-paths are not in the supported subset.
        return Err(DomError::XPath(full.to_string()));
    }
    let (name, predicate) = split_predicate(rest, full)?;
    let attr_check = match predicate {
        Some(p) => Some(parse_attr_predicate(p, full)?),
        None => None,
    };
    let matches = doc
        .elements_under(doc.root())
        .into_iter()
        .filter(|&n| {
            let tag_ok = name == "*" || doc.tag(n) == Some(name);
            let attr_ok = match &attr_check {
                Some((attr, value)) => doc.attr(n, attr) == Some(value.as_str()),
                None => true,
            };
            tag_ok && attr_ok
        })
        .collect();
    Ok(matches)
}

/// `/html/body/div[3]/p[2]` — each step narrows to element children.
fn evaluate_absolute(doc: &Document, rest: &str, full: &str) -> Result<Vec<NodeId>, DomError> {
    let mut current = vec![doc.root()];
    for step in rest.split('/') {
        if step.is_empty() {
            return Err(DomError::XPath(full.to_string()));
        }
        let (name, predicate) = split_predicate(step, full)?;
        let index: Option<usize> = match predicate {
            Some(p) => {
                let n: usize = p
                    .trim()
                    .parse()
                    .map_err(|_| DomError::XPath(full.to_string()))?;
                if n == 0 {
                    return Err(DomError::XPath(full.to_string()));
                }
                Some(n)
            }
            None => None,
        };
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(DomError::XPath(full.to_string()));
        }
        let mut next = Vec::new();
        for node in current {
            let mut nth = 0;
            for &child in doc.children(node) {
                if doc.tag(child) == Some(name) {
                    nth += 1;
                    match index {
                        Some(want) if nth != want => continue,
                        _ => next.push(child),
                    }
                }
            }
        }
        current = next;
        if current.is_empty() {
            return Ok(Vec::new());
        }
    }
    Ok(current)
}

/// Splits `name[predicate]` into its parts, rejecting unbalanced brackets.
fn split_predicate<'a>(step: &'a str, full: &str) -> Result<(&'a str, Option<&'a str>), DomError> {
    match step.find('[') {
        Some(open) => {
            if !step.ends_with(']') {
                return Err(DomError::XPath(full.to_string()));
            }
            Ok((&step[..open], Some(&step[open + 1..step.len() - 1])))
        }
        None => {
            if step.contains(']') {
                return Err(DomError::XPath(full.to_string()));
            }
            Ok((step, None))
        }
    }
}

/// `@attr="value"` (single or double quotes).
fn parse_attr_predicate(predicate: &str, full: &str) -> Result<(String, String), DomError> {
    let predicate = predicate.trim();
    let rest = predicate
        .strip_prefix('@')
        .ok_or_else(|| DomError::XPath(full.to_string()))?;
    let (name, value) = rest
        .split_once('=')
        .ok_or_else(|| DomError::XPath(full.to_string()))?;
    let name = name.trim();
    let value = value.trim();
    let unquoted = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .ok_or_else(|| DomError::XPath(full.to_string()))?;
    if name.is_empty() {
        return Err(DomError::XPath(full.to_string()));
    }
    Ok((name.to_ascii_lowercase(), unquoted.to_string()))
}
