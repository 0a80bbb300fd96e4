//! Edge case and stress tests for pinpoint-css

use pinpoint_css::{SelectorList, escape_identifier, query_limit, query_selector_all};
use pinpoint_dom::{DomTree, NodeId};

// ============================================================================
// DEGENERATE TREES
// ============================================================================

#[test]
fn test_query_empty_document() {
    let tree = DomTree::new();
    assert!(query_selector_all(&tree, NodeId::ROOT, "*").unwrap().is_empty());
}

#[test]
fn test_query_invalid_scope() {
    let mut tree = DomTree::new();
    tree.append_element(NodeId::ROOT, "div", &[]).unwrap();
    assert!(query_selector_all(&tree, NodeId::NONE, "div").unwrap().is_empty());
}

#[test]
fn test_text_nodes_never_match() {
    let mut tree = DomTree::new();
    let div = tree.append_element(NodeId::ROOT, "div", &[]).unwrap();
    tree.append_text(div, "hello").unwrap();
    assert_eq!(query_selector_all(&tree, NodeId::ROOT, "*").unwrap(), vec![div]);
    assert!(query_selector_all(&tree, NodeId::ROOT, "div:empty").unwrap().is_empty());
}

#[test]
fn test_detached_nodes_are_invisible() {
    let mut tree = DomTree::new();
    tree.append_element(NodeId::ROOT, "main", &[]).unwrap();
    tree.create_element("main");
    assert_eq!(query_selector_all(&tree, NodeId::ROOT, "main").unwrap().len(), 1);
}

// ============================================================================
// STRESS
// ============================================================================

#[test]
fn test_thousands_of_uniform_siblings() {
    let mut tree = DomTree::new();
    let ul = tree.append_element(NodeId::ROOT, "ul", &[]).unwrap();
    let items: Vec<_> = (0..5_000)
        .map(|_| tree.append_element(ul, "li", &[("class", "row")]).unwrap())
        .collect();

    let hits = query_selector_all(&tree, NodeId::ROOT, "ul > li.row:nth-of-type(4321)").unwrap();
    assert_eq!(hits, vec![items[4_320]]);

    let list = SelectorList::parse(".row").unwrap();
    assert_eq!(query_limit(&tree, NodeId::ROOT, &list, 2), vec![items[0], items[1]]);
}

#[test]
fn test_deep_nesting() {
    let mut tree = DomTree::new();
    let mut parent = NodeId::ROOT;
    for _ in 0..500 {
        parent = tree.append_element(parent, "div", &[]).unwrap();
    }
    let leaf = tree.append_element(parent, "span", &[("id", "leaf")]).unwrap();

    assert_eq!(query_selector_all(&tree, NodeId::ROOT, "div span").unwrap(), vec![leaf]);
    assert_eq!(query_selector_all(&tree, NodeId::ROOT, "div > #leaf").unwrap(), vec![leaf]);
}

// ============================================================================
// ESCAPING
// ============================================================================

#[test]
fn test_escape_every_ascii_punctuation_round_trips() {
    for c in "!\"#$%&'()*+,./:;<=>?@[\\]^`{|}~".chars() {
        let class = format!("a{c}b");
        let mut tree = DomTree::new();
        let node = tree
            .append_element(NodeId::ROOT, "i", &[("class", class.as_str())])
            .unwrap();
        let selector = format!(".{}", escape_identifier(&class));
        assert_eq!(
            query_selector_all(&tree, NodeId::ROOT, &selector).unwrap(),
            vec![node],
            "{selector}"
        );
    }
}

#[test]
fn test_unicode_identifiers() {
    let mut tree = DomTree::new();
    let node = tree
        .append_element(NodeId::ROOT, "p", &[("id", "überschrift-😀")])
        .unwrap();
    let selector = format!("#{}", escape_identifier("überschrift-😀"));
    assert_eq!(selector, "#überschrift-😀");
    assert_eq!(query_selector_all(&tree, NodeId::ROOT, &selector).unwrap(), vec![node]);
}
