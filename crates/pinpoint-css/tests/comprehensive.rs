//! Comprehensive tests for pinpoint-css
//!
//! Parsing, scoped matching and escaping against hand-built trees.

use pinpoint_css::{
    escape_identifier, escape_string, query_selector, query_selector_all, SelectorList,
};
use pinpoint_dom::{DomTree, NodeId};

/// <body>
///   <ul id="list">
///     <li class="item first">one</li>
///     <li class="item" data-testid="second">two</li>
///     <li class="item">three</li>
///   </ul>
///   <div class="card"><h2>Title</h2><p>Body</p><p lang="en-US">More</p></div>
/// </body>
fn fixture() -> (DomTree, Fixture) {
    let mut tree = DomTree::new();
    let body = tree.append_element(NodeId::ROOT, "body", &[]).unwrap();
    let ul = tree.append_element(body, "ul", &[("id", "list")]).unwrap();
    let li1 = tree
        .append_element(ul, "li", &[("class", "item first")])
        .unwrap();
    tree.append_text(li1, "one").unwrap();
    let li2 = tree
        .append_element(ul, "li", &[("class", "item"), ("data-testid", "second")])
        .unwrap();
    tree.append_text(li2, "two").unwrap();
    let li3 = tree.append_element(ul, "li", &[("class", "item")]).unwrap();
    tree.append_text(li3, "three").unwrap();
    let card = tree.append_element(body, "div", &[("class", "card")]).unwrap();
    let h2 = tree.append_element(card, "h2", &[]).unwrap();
    let p1 = tree.append_element(card, "p", &[]).unwrap();
    let p2 = tree.append_element(card, "p", &[("lang", "en-US")]).unwrap();

    (
        tree,
        Fixture {
            body,
            ul,
            items: [li1, li2, li3],
            card,
            h2,
            paragraphs: [p1, p2],
        },
    )
}

struct Fixture {
    body: NodeId,
    ul: NodeId,
    items: [NodeId; 3],
    card: NodeId,
    h2: NodeId,
    paragraphs: [NodeId; 2],
}

fn all(tree: &DomTree, scope: NodeId, selector: &str) -> Vec<NodeId> {
    query_selector_all(tree, scope, selector).unwrap()
}

// ============================================================================
// PARSING
// ============================================================================

#[test]
fn test_parse_generated_shapes() {
    for selector in [
        "#list",
        ".item",
        "[data-testid=\"second\"]",
        "li:nth-of-type(2)",
        "*:nth-child(3)",
        "#list > li.item:nth-of-type(2)",
        "div.card p",
        "body > ul > li",
    ] {
        assert!(SelectorList::parse(selector).is_ok(), "{selector}");
    }
}

#[test]
fn test_parse_rejects_garbage() {
    for selector in ["", "div >", "#", ".", "li:nth-child()", "p::after", "[x", "a,,b"] {
        assert!(SelectorList::parse(selector).is_err(), "{selector}");
    }
}

// ============================================================================
// MATCHING
// ============================================================================

#[test]
fn test_match_by_id_and_class() {
    let (tree, f) = fixture();
    assert_eq!(all(&tree, NodeId::ROOT, "#list"), vec![f.ul]);
    assert_eq!(all(&tree, NodeId::ROOT, ".item"), f.items.to_vec());
    assert_eq!(all(&tree, NodeId::ROOT, ".item.first"), vec![f.items[0]]);
}

#[test]
fn test_match_attributes() {
    let (tree, f) = fixture();
    assert_eq!(
        all(&tree, NodeId::ROOT, "[data-testid=\"second\"]"),
        vec![f.items[1]]
    );
    assert_eq!(all(&tree, NodeId::ROOT, "[lang|=en]"), vec![f.paragraphs[1]]);
    assert_eq!(all(&tree, NodeId::ROOT, "[class~=first]"), vec![f.items[0]]);
    assert_eq!(all(&tree, NodeId::ROOT, "[lang=\"EN-us\" i]"), vec![f.paragraphs[1]]);
}

#[test]
fn test_match_ordinals() {
    let (tree, f) = fixture();
    assert_eq!(all(&tree, NodeId::ROOT, "li:nth-of-type(2)"), vec![f.items[1]]);
    assert_eq!(all(&tree, NodeId::ROOT, "p:nth-of-type(1)"), vec![f.paragraphs[0]]);
    assert_eq!(all(&tree, NodeId::ROOT, "p:nth-child(2)"), vec![f.paragraphs[0]]);
    assert_eq!(all(&tree, NodeId::ROOT, "li:nth-child(odd)"), vec![f.items[0], f.items[2]]);
    assert_eq!(all(&tree, NodeId::ROOT, "p:last-of-type"), vec![f.paragraphs[1]]);
    assert_eq!(all(&tree, NodeId::ROOT, "h2:first-of-type"), vec![f.h2]);
}

#[test]
fn test_match_combinator_chains() {
    let (tree, f) = fixture();
    assert_eq!(all(&tree, NodeId::ROOT, "body > ul > li"), f.items.to_vec());
    assert_eq!(all(&tree, NodeId::ROOT, "body li.first + li"), vec![f.items[1]]);
    assert_eq!(all(&tree, NodeId::ROOT, "h2 ~ p"), f.paragraphs.to_vec());
    assert_eq!(all(&tree, NodeId::ROOT, "ul ~ .card"), vec![f.card]);
    assert!(all(&tree, NodeId::ROOT, "ul > p").is_empty());
}

#[test]
fn test_selector_list_is_document_ordered_union() {
    let (tree, f) = fixture();
    assert_eq!(
        all(&tree, NodeId::ROOT, "p, #list"),
        vec![f.ul, f.paragraphs[0], f.paragraphs[1]]
    );
}

#[test]
fn test_scoped_queries() {
    let (tree, f) = fixture();
    assert_eq!(all(&tree, f.card, "p"), f.paragraphs.to_vec());
    assert!(all(&tree, f.card, "li").is_empty());
    // the scope element itself may satisfy ancestor compounds
    assert_eq!(all(&tree, f.card, ".card p"), f.paragraphs.to_vec());
    assert!(all(&tree, f.card, "body p").is_empty());
    assert_eq!(all(&tree, f.ul, ":scope > li:nth-child(3)"), vec![f.items[2]]);
    assert_eq!(query_selector(&tree, f.body, "li").unwrap(), Some(f.items[0]));
}

#[test]
fn test_not_pseudo_class() {
    let (tree, f) = fixture();
    assert_eq!(all(&tree, NodeId::ROOT, "li:not(.first)"), vec![f.items[1], f.items[2]]);
    assert_eq!(all(&tree, NodeId::ROOT, "p:not([lang])"), vec![f.paragraphs[0]]);
}

// ============================================================================
// ESCAPING
// ============================================================================

#[test]
fn test_escaped_identifiers_round_trip_through_matching() {
    let mut tree = DomTree::new();
    let weird = [
        ("id", "1st"),
        ("class", "md:flex w-1/2"),
    ];
    let node = tree.append_element(NodeId::ROOT, "div", &weird).unwrap();

    let by_id = format!("#{}", escape_identifier("1st"));
    assert_eq!(all(&tree, NodeId::ROOT, &by_id), vec![node]);

    let by_class = format!(".{}.{}", escape_identifier("md:flex"), escape_identifier("w-1/2"));
    assert_eq!(all(&tree, NodeId::ROOT, &by_class), vec![node]);
}

#[test]
fn test_escaped_strings_round_trip_through_matching() {
    let mut tree = DomTree::new();
    let value = "say \"hi\" \\ bye";
    let node = tree
        .append_element(NodeId::ROOT, "button", &[("aria-label", value)])
        .unwrap();
    let selector = format!("[aria-label={}]", escape_string(value));
    assert_eq!(all(&tree, NodeId::ROOT, &selector), vec![node]);
}
