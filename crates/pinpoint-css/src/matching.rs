//! Scoped selector matching
//!
//! Selectors are matched right to left. Combinator traversal never leaves the
//! scope: ancestors stop at the scope element (inclusive) and the scope's own
//! siblings are never visited. Query results are the matching elements
//! strictly inside the scope, in document order.

use pinpoint_dom::{DomTree, ElementData, Node, NodeId};

use crate::selectors::{
    Combinator, ComplexSelector, CompoundSelector, PseudoClass, SelectorList, SimpleSelector,
};

/// Check if `node` matches any selector in `list` relative to `scope`
pub fn matches(tree: &DomTree, node: NodeId, list: &SelectorList, scope: NodeId) -> bool {
    list.selectors
        .iter()
        .any(|complex| matches_complex(tree, node, complex, scope))
}

/// Check if `node` matches one complex selector relative to `scope`
pub fn matches_complex(
    tree: &DomTree,
    node: NodeId,
    complex: &ComplexSelector,
    scope: NodeId,
) -> bool {
    match complex.compounds.len() {
        0 => false,
        n => match_at(tree, node, complex, n - 1, scope),
    }
}

fn match_at(
    tree: &DomTree,
    node: NodeId,
    complex: &ComplexSelector,
    idx: usize,
    scope: NodeId,
) -> bool {
    if !matches_compound(tree, node, &complex.compounds[idx], scope) {
        return false;
    }
    if idx == 0 {
        return true;
    }

    let next = idx - 1;
    match complex.combinators[next] {
        Combinator::Child => parent_in_scope(tree, node, scope)
            .is_some_and(|parent| match_at(tree, parent, complex, next, scope)),
        Combinator::Descendant => {
            let mut cursor = parent_in_scope(tree, node, scope);
            while let Some(ancestor) = cursor {
                if match_at(tree, ancestor, complex, next, scope) {
                    return true;
                }
                cursor = parent_in_scope(tree, ancestor, scope);
            }
            false
        }
        Combinator::NextSibling => previous_in_scope(tree, node, scope)
            .is_some_and(|sibling| match_at(tree, sibling, complex, next, scope)),
        Combinator::SubsequentSibling => {
            let mut cursor = previous_in_scope(tree, node, scope);
            while let Some(sibling) = cursor {
                if match_at(tree, sibling, complex, next, scope) {
                    return true;
                }
                cursor = previous_in_scope(tree, sibling, scope);
            }
            false
        }
    }
}

fn parent_in_scope(tree: &DomTree, node: NodeId, scope: NodeId) -> Option<NodeId> {
    if node == scope {
        return None;
    }
    tree.parent_element(node)
}

fn previous_in_scope(tree: &DomTree, node: NodeId, scope: NodeId) -> Option<NodeId> {
    if node == scope {
        return None;
    }
    tree.previous_element_sibling(node)
}

/// Match a compound selector against an element
pub fn matches_compound(
    tree: &DomTree,
    node: NodeId,
    compound: &CompoundSelector,
    scope: NodeId,
) -> bool {
    let Some(elem) = tree.element(node) else {
        return false;
    };
    compound
        .simple
        .iter()
        .all(|simple| matches_simple(tree, node, elem, simple, scope))
}

fn matches_simple(
    tree: &DomTree,
    node: NodeId,
    elem: &ElementData,
    simple: &SimpleSelector,
    scope: NodeId,
) -> bool {
    match simple {
        SimpleSelector::Universal => true,
        SimpleSelector::Type(tag) => elem.tag().eq_ignore_ascii_case(tag),
        SimpleSelector::Id(id) => elem.id() == Some(id.as_str()),
        SimpleSelector::Class(class) => elem.has_class(class),
        SimpleSelector::Attribute(attr) => attr.matches(elem.get_attr(&attr.name)),
        SimpleSelector::PseudoClass(pseudo) => match_pseudo_class(tree, node, pseudo, scope),
    }
}

/// Match a pseudo-class against an element
pub fn match_pseudo_class(
    tree: &DomTree,
    node: NodeId,
    pseudo: &PseudoClass,
    scope: NodeId,
) -> bool {
    let index = || tree.element_index(node);
    let sibling_count = || tree.parent(node).map_or(0, |p| tree.element_child_count(p));

    match pseudo {
        PseudoClass::Root => tree
            .parent(node)
            .and_then(|p| tree.get(p))
            .is_some_and(Node::is_document),
        PseudoClass::Scope => node == scope,
        PseudoClass::Empty => tree.children(node).all(|child| {
            tree.get(child)
                .is_some_and(|n| !n.is_element() && n.as_text().is_none_or(str::is_empty))
        }),
        PseudoClass::FirstChild => index() == Some(1),
        PseudoClass::LastChild => index().is_some_and(|i| i == sibling_count()),
        PseudoClass::OnlyChild => index().is_some() && sibling_count() == 1,
        PseudoClass::FirstOfType => tree.type_index(node) == Some(1),
        PseudoClass::LastOfType => tree
            .position(node)
            .is_some_and(|p| p.type_index == p.type_count),
        PseudoClass::OnlyOfType => tree.position(node).is_some_and(|p| p.type_count == 1),
        PseudoClass::NthChild(expr) => index().is_some_and(|i| expr.matches(i as i32)),
        PseudoClass::NthLastChild(expr) => {
            index().is_some_and(|i| expr.matches((sibling_count() - i + 1) as i32))
        }
        PseudoClass::NthOfType(expr) => tree
            .type_index(node)
            .is_some_and(|i| expr.matches(i as i32)),
        PseudoClass::NthLastOfType(expr) => tree
            .position(node)
            .is_some_and(|p| expr.matches((p.type_count - p.type_index + 1) as i32)),
        PseudoClass::Not(inner) => !inner
            .iter()
            .any(|compound| matches_compound(tree, node, compound, scope)),
    }
}

/// All elements strictly inside `scope` matching `list`, in document order
pub fn query_all(tree: &DomTree, scope: NodeId, list: &SelectorList) -> Vec<NodeId> {
    query_limit(tree, scope, list, usize::MAX)
}

/// Like [`query_all`] but stops after `limit` matches
pub fn query_limit(
    tree: &DomTree,
    scope: NodeId,
    list: &SelectorList,
    limit: usize,
) -> Vec<NodeId> {
    tree.descendants(scope)
        .filter(|&node| tree.is_element(node) && matches(tree, node, list, scope))
        .take(limit)
        .collect()
}

/// First element inside `scope` matching `list`
pub fn query_first(tree: &DomTree, scope: NodeId, list: &SelectorList) -> Option<NodeId> {
    query_limit(tree, scope, list, 1).into_iter().next()
}
