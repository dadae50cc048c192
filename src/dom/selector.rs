//! CSS selector subset used by the platform profiles and by structural
//! locators captured at bookmark time.
//!
//! Supported: tag, `#id`, `.class`, `[attr]`, `[attr="v"]`, `[attr^="v"]`,
//! compound simple selectors, descendant and child combinators,
//! `:nth-of-type(n)`, and comma-separated groups. Anything else is a parse
//! error value, since stale captured selectors must degrade to a layer miss,
//! not a panic.

use super::{Document, NodeId};
use crate::types::errors::DomError;

#[derive(Debug, Clone, PartialEq)]
enum AttrOp {
    Exists,
    Equals(String),
    Prefix(String),
}

#[derive(Debug, Clone, PartialEq)]
struct AttrCheck {
    name: String,
    op: AttrOp,
}

/// One compound selector: every part must match the same element.
#[derive(Debug, Clone, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCheck>,
    nth_of_type: Option<usize>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
            && self.nth_of_type.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Combinator {
    Descendant,
    Child,
}

/// A compound chain such as `div > p.intro span`.
#[derive(Debug, Clone, PartialEq)]
struct Complex {
    first: Compound,
    rest: Vec<(Combinator, Compound)>,
}

/// A parsed comma-separated selector group.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList {
    groups: Vec<Complex>,
}

impl SelectorList {
    /// Parses a selector, rejecting unsupported syntax.
    pub fn parse(input: &str) -> Result<Self, DomError> {
        let mut groups = Vec::new();
        for group in input.split(',') {
            let group = group.trim();
            if group.is_empty() {
                return Err(DomError::Selector(input.to_string()));
            }
            groups.push(parse_complex(group).ok_or_else(|| DomError::Selector(input.to_string()))?);
        }
        if groups.is_empty() {
            return Err(DomError::Selector(input.to_string()));
        }
        Ok(Self { groups })
    }

    /// Whether the element matches any group in the list.
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.groups.iter().any(|g| matches_complex(doc, node, g))
    }

    /// All matching elements under `scope` in document order.
    pub fn query_all(&self, doc: &Document, scope: NodeId) -> Vec<NodeId> {
        doc.elements_under(scope)
            .into_iter()
            .filter(|&n| self.matches(doc, n))
            .collect()
    }
}

/// Convenience: parse + query in one call, rooted at the document root.
pub fn query_all(doc: &Document, input: &str) -> Result<Vec<NodeId>, DomError> {
    Ok(SelectorList::parse(input)?.query_all(doc, doc.root()))
}

/// Convenience: parse + match a single element.
pub fn matches(doc: &Document, node: NodeId, input: &str) -> Result<bool, DomError> {
    Ok(SelectorList::parse(input)?.matches(doc, node))
}

fn parse_complex(input: &str) -> Option<Complex> {
    // Tokenize into compounds and combinators. '>' binds regardless of the
    // whitespace around it; bare whitespace is a descendant combinator.
    let mut compounds = Vec::new();
    let mut combinators = Vec::new();
    let mut rest = input.trim();
    loop {
        let (compound, after) = parse_compound(rest)?;
        if compound.is_empty() {
            return None;
        }
        compounds.push(compound);
        let after_trimmed = after.trim_start();
        if after_trimmed.is_empty() {
            break;
        }
        if let Some(next) = after_trimmed.strip_prefix('>') {
            combinators.push(Combinator::Child);
            rest = next.trim_start();
        } else if after.starts_with(char::is_whitespace) {
            combinators.push(Combinator::Descendant);
            rest = after_trimmed;
        } else {
            return None;
        }
        if rest.is_empty() {
            return None;
        }
    }
    let mut iter = compounds.into_iter();
    let first = iter.next()?;
    let rest: Vec<_> = combinators.into_iter().zip(iter).collect();
    Some(Complex { first, rest })
}

/// Parses one compound selector, returning it and the unconsumed input
/// (which begins with whitespace, '>' or is empty).
fn parse_compound(input: &str) -> Option<(Compound, &str)> {
    let mut compound = Compound::default();
    let mut rest = input;

    if rest.starts_with('*') {
        rest = &rest[1..];
        if rest.is_empty() || rest.starts_with(char::is_whitespace) || rest.starts_with('>') {
            return Some((universal(), rest));
        }
    } else if rest
        .chars()
        .next()
        .map(|c| c.is_ascii_alphabetic())
        .unwrap_or(false)
    {
        let end = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
            .unwrap_or(rest.len());
        compound.tag = Some(rest[..end].to_ascii_lowercase());
        rest = &rest[end..];
    }

    loop {
        if let Some(after) = rest.strip_prefix('#') {
            let (name, next) = read_identifier(after)?;
            compound.id = Some(name);
            rest = next;
        } else if let Some(after) = rest.strip_prefix('.') {
            let (name, next) = read_identifier(after)?;
            compound.classes.push(name);
            rest = next;
        } else if let Some(after) = rest.strip_prefix('[') {
            let end = after.find(']')?;
            compound.attrs.push(parse_attr_check(&after[..end])?);
            rest = &after[end + 1..];
        } else if let Some(after) = rest.strip_prefix(":nth-of-type(") {
            let end = after.find(')')?;
            let n: usize = after[..end].trim().parse().ok()?;
            if n == 0 {
                return None;
            }
            compound.nth_of_type = Some(n);
            rest = &after[end + 1..];
        } else {
            break;
        }
    }

    if compound.is_empty() {
        return None;
    }
    Some((compound, rest))
}

/// `*` matches any element. Represented as a compound that always matches.
fn universal() -> Compound {
    Compound {
        attrs: vec![AttrCheck {
            name: String::new(),
            op: AttrOp::Exists,
        }],
        ..Compound::default()
    }
}

fn read_identifier(input: &str) -> Option<(String, &str)> {
    let end = input
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(input.len());
    if end == 0 {
        return None;
    }
    Some((input[..end].to_string(), &input[end..]))
}

fn parse_attr_check(body: &str) -> Option<AttrCheck> {
    let body = body.trim();
    if let Some((name, value)) = body.split_once("^=") {
        return Some(AttrCheck {
            name: attr_name(name)?,
            op: AttrOp::Prefix(unquote(value.trim())?),
        });
    }
    if let Some((name, value)) = body.split_once('=') {
        return Some(AttrCheck {
            name: attr_name(name)?,
            op: AttrOp::Equals(unquote(value.trim())?),
        });
    }
    Some(AttrCheck {
        name: attr_name(body)?,
        op: AttrOp::Exists,
    })
}

fn attr_name(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return None;
    }
    Some(raw.to_ascii_lowercase())
}

fn unquote(value: &str) -> Option<String> {
    if let Some(inner) = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
    {
        return Some(inner.to_string());
    }
    if value.contains('"') || value.contains('\'') {
        return None;
    }
    Some(value.to_string())
}

fn matches_compound(doc: &Document, node: NodeId, compound: &Compound) -> bool {
    if !doc.is_element(node) {
        return false;
    }
    if let Some(tag) = &compound.tag {
        if doc.tag(node) != Some(tag.as_str()) {
            return false;
        }
    }
    if let Some(id) = &compound.id {
        if doc.attr(node, "id") != Some(id.as_str()) {
            return false;
        }
    }
    for class in &compound.classes {
        if !doc.has_class(node, class) {
            return false;
        }
    }
    for check in &compound.attrs {
        // The universal marker has an empty name and always passes.
        if check.name.is_empty() {
            continue;
        }
        match (&check.op, doc.attr(node, &check.name)) {
            (AttrOp::Exists, Some(_)) => {}
            (AttrOp::Equals(expected), Some(actual)) if actual == expected => {}
            (AttrOp::Prefix(prefix), Some(actual)) if actual.starts_with(prefix.as_str()) => {}
            _ => return false,
        }
    }
    if let Some(n) = compound.nth_of_type {
        if doc.same_tag_index(node) != n {
            return false;
        }
    }
    true
}

/// Matches the rightmost compound against `node`, then walks ancestors for
/// the remaining chain, backtracking over descendant combinators.
fn matches_complex(doc: &Document, node: NodeId, complex: &Complex) -> bool {
    let mut chain: Vec<(&Compound, Option<Combinator>)> = Vec::new();
    chain.push((&complex.first, None));
    for (comb, compound) in &complex.rest {
        chain.push((compound, Some(*comb)));
    }
    matches_from_end(doc, node, &chain)
}

fn matches_from_end(doc: &Document, node: NodeId, chain: &[(&Compound, Option<Combinator>)]) -> bool {
    let Some(((compound, combinator), prefix)) = chain.split_last() else {
        return true;
    };
    if !matches_compound(doc, node, compound) {
        return false;
    }
    match combinator {
        None => true,
        Some(Combinator::Child) => match doc.parent(node) {
            Some(parent) => matches_from_end(doc, parent, prefix),
            None => false,
        },
        Some(Combinator::Descendant) => {
            let mut cur = doc.parent(node);
            while let Some(ancestor) = cur {
                if matches_from_end(doc, ancestor, prefix) {
                    return true;
                }
                cur = doc.parent(ancestor);
            }
            false
        }
    }
}
