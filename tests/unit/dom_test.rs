//! Unit tests for the document model: parsing real-world transcript markup,
//! traversal order, and the structural query engines.

use chatmarks::dom::{parse, selector, xpath};

const CHATGPT_SNIPPET: &str = r#"<html><head><title>t</title></head><body>
<main><div data-message-author-role="user"><div class="markdown"><p>question one</p></div></div>
<div data-message-author-role="assistant"><div class="markdown">
<p>answer <strong>with bold</strong> text</p>
<ul><li>first item</li><li>second item</li></ul>
<pre><code>let x = 1;</code></pre>
</div></div></main>
</body></html>"#;

#[test]
fn text_content_reads_through_nested_markup() {
    let doc = parse(CHATGPT_SNIPPET);
    let answer = selector::query_all(&doc, "[data-message-author-role=\"assistant\"] p").unwrap();
    assert_eq!(answer.len(), 1);
    assert_eq!(doc.text_content(answer[0]), "answer with bold text");
}

#[test]
fn queries_return_document_order() {
    let doc = parse(CHATGPT_SNIPPET);
    let items = selector::query_all(&doc, "li").unwrap();
    let texts: Vec<String> = items.iter().map(|&n| doc.text_content(n)).collect();
    assert_eq!(texts, vec!["first item", "second item"]);
}

#[test]
fn attribute_prefix_selector() {
    let doc = parse(r#"<div data-testid="conversation-turn-3">x</div><div data-testid="other">y</div>"#);
    let hits = selector::query_all(&doc, "[data-testid^=\"conversation-turn\"]").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(doc.text_content(hits[0]), "x");
}

#[test]
fn body_falls_back_to_root_for_fragments() {
    let doc = parse("<p>fragment only</p>");
    assert_eq!(doc.text_content(doc.body()), "fragment only");
}

#[test]
fn xpath_build_resolves_back_to_the_same_node() {
    let doc = parse(CHATGPT_SNIPPET);
    for node in doc.elements_under(doc.root()) {
        let path = xpath::build(&doc, node).expect("every element gets a path");
        let resolved = xpath::evaluate(&doc, &path).expect("generated paths evaluate");
        assert!(
            resolved.contains(&node),
            "path {:?} should resolve to its source node",
            path
        );
    }
}

#[test]
fn malformed_markup_never_panics() {
    let cases = [
        "<div><p>unclosed",
        "<<<>>>",
        "<div class=>broken</div>",
        "</only-close>",
        "<a href='x><b>y</b>",
        "text &unknown; entity &#xzz;",
        "<style>.x { content: '<div>' }</style>",
    ];
    for html in cases {
        let doc = parse(html);
        // Traversal over the result must also be safe.
        let _ = doc.text_content(doc.root());
        let _ = doc.elements_under(doc.root());
    }
}

#[test]
fn stale_structural_queries_are_errors_not_panics() {
    let doc = parse(CHATGPT_SNIPPET);
    assert!(selector::query_all(&doc, "p:hover").is_err());
    assert!(xpath::evaluate(&doc, "//div[contains(@class,'x')]").is_err());
}

#[test]
fn whitespace_between_messages_is_preserved_in_text_nodes() {
    let doc = parse("<p>a</p>\n<p>b</p>");
    let all = doc.text_content(doc.root());
    assert_eq!(all, "a\nb");
}
