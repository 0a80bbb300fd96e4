//! Edge case and stress tests for pinpoint-html
//!
//! Tests malformed content and large documents.

use pinpoint_dom::{DomTree, NodeId};
use pinpoint_html::HtmlParser;

fn find_tag(tree: &DomTree, tag: &str) -> Vec<NodeId> {
    tree.descendants(NodeId::ROOT)
        .filter(|&n| tree.element(n).is_some_and(|e| e.tag() == tag))
        .collect()
}

// ============================================================================
// EMPTY AND MINIMAL INPUT
// ============================================================================

#[test]
fn test_parse_empty_string() {
    let tree = HtmlParser::new().parse("").unwrap();
    // html5ever always synthesizes html/head/body
    assert_eq!(find_tag(&tree, "body").len(), 1);
}

#[test]
fn test_parse_only_whitespace() {
    let tree = HtmlParser::new().parse("   \t\n\r\n   ").unwrap();
    let body = find_tag(&tree, "body")[0];
    assert_eq!(tree.children(body).count(), 0);
}

#[test]
fn test_parse_null_bytes() {
    let tree = HtmlParser::new().parse("Hello\0World").unwrap();
    assert!(tree.len() > 1);
}

// ============================================================================
// MALFORMED HTML
// ============================================================================

#[test]
fn test_parse_unclosed_tags() {
    let tree = HtmlParser::new().parse("<div><p><span>text").unwrap();
    assert_eq!(find_tag(&tree, "span").len(), 1);
}

#[test]
fn test_parse_mismatched_tags() {
    let tree = HtmlParser::new().parse("<div><p></div></p>").unwrap();
    assert_eq!(find_tag(&tree, "div").len(), 1);
}

#[test]
fn test_parse_duplicate_attributes_keep_first() {
    let tree = HtmlParser::new()
        .parse(r#"<a id="one" id="two" class="x y x">link</a>"#)
        .unwrap();
    let a = find_tag(&tree, "a")[0];
    let elem = tree.element(a).unwrap();
    assert_eq!(elem.id(), Some("one"));
    assert_eq!(elem.classes(), &["x", "y"]);
}

#[test]
fn test_uppercase_names_are_lowered() {
    let tree = HtmlParser::new()
        .parse(r#"<DIV DATA-TESTID="Card">x</DIV>"#)
        .unwrap();
    let div = find_tag(&tree, "div")[0];
    assert_eq!(tree.element(div).unwrap().get_attr("data-testid"), Some("Card"));
}

// ============================================================================
// STRESS
// ============================================================================

#[test]
fn test_parse_deep_nesting() {
    let depth = 2_000;
    let html = format!("{}x{}", "<div>".repeat(depth), "</div>".repeat(depth));
    let tree = HtmlParser::new().parse(&html).unwrap();
    assert!(find_tag(&tree, "div").len() >= 500);
}

#[test]
fn test_parse_many_siblings() {
    let html = format!("<ul>{}</ul>", "<li class=\"row\">item</li>".repeat(5_000));
    let tree = HtmlParser::new().parse(&html).unwrap();
    let items = find_tag(&tree, "li");
    assert_eq!(items.len(), 5_000);
    assert_eq!(tree.type_index(items[4_999]), Some(5_000));
}

#[test]
fn test_parse_missing_file() {
    let result = HtmlParser::new().parse_file("/definitely/not/here.html");
    assert!(matches!(result, Err(pinpoint_html::HtmlError::Io(_))));
}
