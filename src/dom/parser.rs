//! Tolerant HTML parser producing a [`Document`] arena.
//!
//! Chat pages are framework-generated and frequently malformed by the time
//! a snapshot reaches the engine (truncated streams, mid-render mutations),
//! so parsing never fails: unknown syntax is skipped, stray close tags are
//! dropped, and mis-nested elements close to the nearest matching open tag.

use super::{Document, NodeId};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is raw text until the matching close tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Parses an HTML fragment or full page into a document.
pub fn parse(html: &str) -> Document {
    let mut doc = Document::new();
    let root = doc.root();
    let mut open_stack: Vec<NodeId> = vec![root];
    let mut rest = html;

    while !rest.is_empty() {
        if let Some(stripped) = rest.strip_prefix('<') {
            if let Some(after) = stripped.strip_prefix("!--") {
                // Comment: skip to the terminator, or to the end if unterminated.
                rest = match after.find("-->") {
                    Some(end) => &after[end + 3..],
                    None => "",
                };
            } else if stripped.starts_with('!') || stripped.starts_with('?') {
                // Doctype or processing instruction.
                rest = match stripped.find('>') {
                    Some(end) => &stripped[end + 1..],
                    None => "",
                };
            } else if let Some(after) = stripped.strip_prefix('/') {
                let (name, remainder) = read_tag_name(after);
                rest = skip_past_gt(remainder);
                close_element(&doc, &mut open_stack, &name);
            } else if stripped
                .chars()
                .next()
                .map(|c| c.is_ascii_alphabetic())
                .unwrap_or(false)
            {
                let (element, self_closing, remainder) = parse_open_tag(&mut doc, stripped);
                rest = remainder;
                let parent = *open_stack.last().unwrap_or(&root);
                doc.append_child(parent, element);
                let tag = doc.tag(element).unwrap_or_default().to_string();
                if RAW_TEXT_ELEMENTS.contains(&tag.as_str()) {
                    let (raw, remainder) = read_raw_text(rest, &tag);
                    if !raw.is_empty() {
                        let text = doc.create_text(raw);
                        doc.append_child(element, text);
                    }
                    rest = remainder;
                } else if !self_closing && !VOID_ELEMENTS.contains(&tag.as_str()) {
                    open_stack.push(element);
                }
            } else {
                // A bare '<' in text content.
                let (text, remainder) = read_text(&rest[1..]);
                let parent = *open_stack.last().unwrap_or(&root);
                let node = doc.create_text(&format!("<{}", decode_entities(text)));
                doc.append_child(parent, node);
                rest = remainder;
            }
        } else {
            let (text, remainder) = read_text(rest);
            if !text.is_empty() {
                let parent = *open_stack.last().unwrap_or(&root);
                let node = doc.create_text(&decode_entities(text));
                doc.append_child(parent, node);
            }
            rest = remainder;
        }
    }

    doc
}

/// Reads text up to the next '<' (exclusive).
fn read_text(input: &str) -> (&str, &str) {
    match input.find('<') {
        Some(i) => (&input[..i], &input[i..]),
        None => (input, ""),
    }
}

/// Reads a tag name (letters, digits, '-') from the start of `input`.
fn read_tag_name(input: &str) -> (String, &str) {
    let end = input
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
        .unwrap_or(input.len());
    (input[..end].to_ascii_lowercase(), &input[end..])
}

fn skip_past_gt(input: &str) -> &str {
    match input.find('>') {
        Some(i) => &input[i + 1..],
        None => "",
    }
}

/// Pops the open stack down to (and including) the nearest element with the
/// given tag. A close tag with no matching open element is ignored.
fn close_element(doc: &Document, open_stack: &mut Vec<NodeId>, name: &str) {
    if name.is_empty() {
        return;
    }
    // Index 0 is the document root and is never closable.
    if let Some(pos) = open_stack
        .iter()
        .skip(1)
        .rposition(|&id| doc.tag(id) == Some(name))
    {
        open_stack.truncate(pos + 1);
    }
}

/// Parses `name attr="value" …>` after the opening '<'. Returns the created
/// (detached) element, whether the tag was self-closing, and the remainder.
fn parse_open_tag<'a>(doc: &mut Document, input: &'a str) -> (NodeId, bool, &'a str) {
    let (name, mut rest) = read_tag_name(input);
    let element = doc.create_element(&name);
    let mut self_closing = false;

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        if let Some(after) = rest.strip_prefix("/>") {
            self_closing = true;
            rest = after;
            break;
        }
        if let Some(after) = rest.strip_prefix('>') {
            rest = after;
            break;
        }
        let (attr_name, after) = read_attr_name(rest);
        if attr_name.is_empty() {
            // Unparseable junk before '>'; drop one char and retry.
            let mut chars = rest.chars();
            chars.next();
            rest = chars.as_str();
            continue;
        }
        rest = after.trim_start();
        if let Some(after_eq) = rest.strip_prefix('=') {
            let (value, after_value) = read_attr_value(after_eq.trim_start());
            doc.set_attr(element, &attr_name, &decode_entities(&value));
            rest = after_value;
        } else {
            doc.set_attr(element, &attr_name, "");
        }
    }

    (element, self_closing, rest)
}

fn read_attr_name(input: &str) -> (String, &str) {
    let end = input
        .find(|c: char| c.is_ascii_whitespace() || c == '=' || c == '>' || c == '/')
        .unwrap_or(input.len());
    (input[..end].to_ascii_lowercase(), &input[end..])
}

fn read_attr_value(input: &str) -> (String, &str) {
    if let Some(after) = input.strip_prefix('"') {
        match after.find('"') {
            Some(i) => (after[..i].to_string(), &after[i + 1..]),
            None => (after.to_string(), ""),
        }
    } else if let Some(after) = input.strip_prefix('\'') {
        match after.find('\'') {
            Some(i) => (after[..i].to_string(), &after[i + 1..]),
            None => (after.to_string(), ""),
        }
    } else {
        let end = input
            .find(|c: char| c.is_ascii_whitespace() || c == '>')
            .unwrap_or(input.len());
        (input[..end].to_string(), &input[end..])
    }
}

/// Reads raw text up to `</tag` (case-insensitive) for script/style content.
fn read_raw_text<'a>(input: &'a str, tag: &str) -> (&'a str, &'a str) {
    let close = format!("</{}", tag);
    let lower = input.to_ascii_lowercase();
    match lower.find(&close) {
        Some(i) => {
            let after_close = skip_past_gt(&input[i..]);
            (&input[..i], after_close)
        }
        None => (input, ""),
    }
}

/// Decodes the common named entities plus numeric character references.
fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        // An entity reference is short; anything longer is literal text.
        let end = match rest.find(';') {
            Some(end) if end <= 12 => end,
            _ => {
                out.push('&');
                rest = &rest[1..];
                continue;
            }
        };
        let entity = &rest[1..end];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{a0}'),
            _ => decode_numeric_entity(entity),
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    let digits = entity.strip_prefix('#')?;
    let code = if let Some(hex) = digits.strip_prefix('x').or_else(|| digits.strip_prefix('X')) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        digits.parse::<u32>().ok()?
    };
    char::from_u32(code)
}
