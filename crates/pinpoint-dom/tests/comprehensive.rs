//! Comprehensive tests for pinpoint-dom

use pinpoint_dom::{DomError, DomTree, NodeData, NodeId, SiblingPosition};

#[test]
fn test_new_tree_is_empty() {
    let tree = DomTree::new();
    assert!(tree.is_empty());
    assert_eq!(tree.len(), 1);
    assert!(tree.get(NodeId::ROOT).unwrap().is_document());
    assert_eq!(tree.document_element(), None);
}

#[test]
fn test_build_document() {
    let mut tree = DomTree::new();
    let html = tree.append_element(NodeId::ROOT, "HTML", &[]).unwrap();
    let body = tree.append_element(html, "body", &[]).unwrap();
    let p = tree
        .append_element(body, "p", &[("id", "intro"), ("class", "lead text")])
        .unwrap();
    tree.append_text(p, "Hello ").unwrap();
    let em = tree.append_element(p, "em", &[]).unwrap();
    tree.append_text(em, "world").unwrap();

    assert_eq!(tree.document_element(), Some(html));
    assert_eq!(tree.element(html).unwrap().tag(), "html");
    assert_eq!(tree.get_element_by_id("intro"), Some(p));
    assert_eq!(tree.text_content(p), "Hello world");
    assert_eq!(tree.element(p).unwrap().classes(), &["lead", "text"]);
    assert_eq!(tree.ancestors(em).collect::<Vec<_>>(), vec![p, body, html, NodeId::ROOT]);
}

#[test]
fn test_sibling_position_mixed_tags() {
    let mut tree = DomTree::new();
    let div = tree.append_element(NodeId::ROOT, "div", &[]).unwrap();
    let ids: Vec<_> = ["span", "img", "span", "img", "img"]
        .iter()
        .map(|tag| tree.append_element(div, tag, &[]).unwrap())
        .collect();

    assert_eq!(
        tree.position(ids[3]),
        Some(SiblingPosition {
            index: 4,
            count: 5,
            type_index: 2,
            type_count: 3,
        })
    );
    assert_eq!(tree.position(ids[2]).map(|p| p.type_count), Some(2));
}

#[test]
fn test_detached_nodes_have_no_position() {
    let mut tree = DomTree::new();
    let lonely = tree.create_element("div");
    assert_eq!(tree.position(lonely), None);
    assert_eq!(tree.element_index(lonely), None);
    assert_eq!(tree.parent(lonely), None);
}

#[test]
fn test_attribute_updates() {
    let mut tree = DomTree::new();
    let a = tree.append_element(NodeId::ROOT, "a", &[("href", "/x")]).unwrap();
    tree.set_attribute(a, "ID", "link").unwrap();
    assert_eq!(tree.element(a).unwrap().id(), Some("link"));
    assert_eq!(tree.remove_attribute(a, "href").unwrap().as_deref(), Some("/x"));
    assert!(!tree.element(a).unwrap().has_attr("href"));

    let text = tree.append_text(a, "label").unwrap();
    assert_eq!(
        tree.set_attribute(text, "id", "nope"),
        Err(DomError::NotAnElement(text))
    );
    assert_eq!(
        tree.set_attribute(NodeId::NONE, "id", "nope"),
        Err(DomError::NotFound(NodeId::NONE))
    );
}

#[test]
fn test_text_nodes_cannot_have_children() {
    let mut tree = DomTree::new();
    let text = tree.append_text(NodeId::ROOT, "loose").unwrap();
    let span = tree.create_element("span");
    assert_eq!(tree.append_child(text, span), Err(DomError::InvalidNodeType(text)));
    assert!(matches!(tree.get(text).unwrap().data, NodeData::Text(_)));
}
