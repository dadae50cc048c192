//! Unit tests for platform detection and profile lookups.

use rstest::rstest;

use chatmarks::dom::parse;
use chatmarks::platform::{Platform, PlatformProfile, TextNormalizer};

#[rstest]
#[case("https://chatgpt.com/c/abc123", Platform::ChatGpt)]
#[case("https://chat.openai.com/chat", Platform::ChatGpt)]
#[case("https://claude.ai/chat/xyz", Platform::Claude)]
#[case("https://grok.x.ai/", Platform::Grok)]
#[case("https://example.com/chatgpt-review", Platform::Unknown)]
#[case("", Platform::Unknown)]
fn detects_platform_from_url(#[case] url: &str, #[case] expected: Platform) {
    assert_eq!(Platform::detect(url), expected);
}

#[test]
fn platform_serializes_to_stored_record_strings() {
    assert_eq!(serde_json::to_string(&Platform::ChatGpt).unwrap(), "\"chatgpt\"");
    assert_eq!(serde_json::to_string(&Platform::Unknown).unwrap(), "\"unknown\"");
    let parsed: Platform = serde_json::from_str("\"claude\"").unwrap();
    assert_eq!(parsed, Platform::Claude);
}

#[test]
fn chatgpt_profile_finds_author_role_containers() {
    let doc = parse(
        r#"<body><div data-message-author-role="user">q</div>
           <div data-message-author-role="assistant">a</div><div>not a message</div></body>"#,
    );
    let profile = PlatformProfile::for_platform(Platform::ChatGpt);
    let containers = profile.message_containers(&doc);
    assert_eq!(containers.len(), 2);
    assert_eq!(doc.text_content(containers[0]), "q");
}

#[test]
fn claude_profile_matches_either_container_shape() {
    let doc = parse(
        r#"<body><div data-testid="conversation-turn">turn</div>
           <div class="font-claude-message">message</div></body>"#,
    );
    let profile = PlatformProfile::for_platform(Platform::Claude);
    assert_eq!(profile.message_containers(&doc).len(), 2);
}

#[test]
fn zero_matches_is_an_empty_list_never_an_error() {
    let doc = parse("<body><p>plain page</p></body>");
    for platform in [Platform::ChatGpt, Platform::Claude, Platform::Grok, Platform::Unknown] {
        let profile = PlatformProfile::for_platform(platform);
        assert!(profile.message_containers(&doc).is_empty());
    }
}

#[test]
fn enclosing_container_walks_up_from_a_text_node() {
    let doc = parse(
        r#"<div data-message-author-role="assistant"><div class="markdown"><p>deep text</p></div></div>"#,
    );
    let profile = PlatformProfile::for_platform(Platform::ChatGpt);
    let text_node = doc.text_nodes_under(doc.root())[0];
    let container = profile.enclosing_container(&doc, text_node).unwrap();
    assert_eq!(doc.attr(container, "data-message-author-role"), Some("assistant"));
}

#[test]
fn message_body_narrows_to_the_markdown_block() {
    let doc = parse(
        r#"<div data-message-author-role="assistant"><button>copy</button><div class="markdown"><p>body</p></div></div>"#,
    );
    let profile = PlatformProfile::for_platform(Platform::ChatGpt);
    let container = profile.message_containers(&doc)[0];
    let body = profile.message_body(&doc, container);
    assert!(doc.has_class(body, "markdown"));
    // Without a body selector the container itself is the scope.
    let grok = PlatformProfile::for_platform(Platform::Grok);
    assert_eq!(grok.message_body(&doc, container), container);
}

#[rstest]
#[case(Platform::ChatGpt, TextNormalizer::Collapsed)]
#[case(Platform::Claude, TextNormalizer::Exact)]
#[case(Platform::Grok, TextNormalizer::Collapsed)]
fn normalization_policy_per_platform(#[case] platform: Platform, #[case] expected: TextNormalizer) {
    assert_eq!(PlatformProfile::for_platform(platform).normalizer, expected);
}
