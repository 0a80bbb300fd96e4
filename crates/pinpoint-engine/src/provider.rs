//! Document access
//!
//! The engine never touches a concrete tree. It reads elements and resolves
//! selectors through [`DocumentProvider`], and serializes identifiers through
//! an [`Escaper`].

use pinpoint_css::{
    SelectorError, SelectorList, escape_identifier, escape_string, query_limit,
};
use pinpoint_dom::{DomTree, NodeId, SiblingPosition};

/// Selector resolution error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error(transparent)]
    InvalidSelector(#[from] SelectorError),

    #[error("scope {0} is not in the document")]
    InvalidScope(NodeId),
}

/// Read-only view of a document tree
pub trait DocumentProvider {
    /// Parent node if it is an element
    fn parent_element(&self, node: NodeId) -> Option<NodeId>;

    /// Element children in document order
    fn element_children(&self, node: NodeId) -> Vec<NodeId>;

    /// Lowercase tag name of an element
    fn tag_name(&self, node: NodeId) -> Option<&str>;

    /// Non-empty `id` attribute
    fn id(&self, node: NodeId) -> Option<&str>;

    /// Class list in source order, without duplicates
    fn classes(&self, node: NodeId) -> Vec<&str>;

    /// Attribute name/value pairs in source order
    fn attributes(&self, node: NodeId) -> Vec<(&str, &str)>;

    /// Sibling indices and counts (`:nth-child` / `:nth-of-type`)
    fn position(&self, node: NodeId) -> Option<SiblingPosition>;

    fn is_element(&self, node: NodeId) -> bool;

    /// Check if `node` is `scope` or lies inside it
    fn contains(&self, scope: NodeId, node: NodeId) -> bool;

    /// Elements strictly inside `scope` matching `selector`, at most `limit`
    fn resolve(&self, selector: &str, scope: NodeId, limit: usize)
    -> Result<Vec<NodeId>, QueryError>;

    /// Check if `node` (strictly inside `scope`) matches `selector`
    fn is_match(&self, selector: &str, scope: NodeId, node: NodeId) -> Result<bool, QueryError> {
        Ok(self.resolve(selector, scope, usize::MAX)?.contains(&node))
    }
}

impl DocumentProvider for DomTree {
    fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        DomTree::parent_element(self, node)
    }

    fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        DomTree::element_children(self, node).collect()
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|e| e.tag())
    }

    fn id(&self, node: NodeId) -> Option<&str> {
        self.element(node).and_then(|e| e.id())
    }

    fn classes(&self, node: NodeId) -> Vec<&str> {
        self.element(node)
            .map(|e| e.classes().iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    fn attributes(&self, node: NodeId) -> Vec<(&str, &str)> {
        self.element(node)
            .map(|e| {
                e.attrs()
                    .iter()
                    .map(|a| (a.name.as_str(), a.value.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn position(&self, node: NodeId) -> Option<SiblingPosition> {
        DomTree::position(self, node)
    }

    fn is_element(&self, node: NodeId) -> bool {
        DomTree::is_element(self, node)
    }

    fn contains(&self, scope: NodeId, node: NodeId) -> bool {
        self.get(scope).is_some() && self.is_inclusive_ancestor(scope, node)
    }

    fn resolve(
        &self,
        selector: &str,
        scope: NodeId,
        limit: usize,
    ) -> Result<Vec<NodeId>, QueryError> {
        if self.get(scope).is_none() {
            return Err(QueryError::InvalidScope(scope));
        }
        let list = SelectorList::parse(selector)?;
        Ok(query_limit(self, scope, &list, limit))
    }

    fn is_match(&self, selector: &str, scope: NodeId, node: NodeId) -> Result<bool, QueryError> {
        if self.get(scope).is_none() {
            return Err(QueryError::InvalidScope(scope));
        }
        let list = SelectorList::parse(selector)?;
        Ok(node != scope
            && self.is_inclusive_ancestor(scope, node)
            && pinpoint_css::matches(self, node, &list, scope))
    }
}

/// Serializes raw strings into selector syntax
pub trait Escaper: Send + Sync {
    /// Escape an identifier (`#id`, `.class`, tag and attribute names)
    fn identifier(&self, raw: &str) -> String;

    /// Quote an attribute value, quotes included
    fn string(&self, raw: &str) -> String;
}

/// CSSOM `CSS.escape` semantics
#[derive(Debug, Clone, Copy, Default)]
pub struct CssEscaper;

impl Escaper for CssEscaper {
    fn identifier(&self, raw: &str) -> String {
        escape_identifier(raw)
    }

    fn string(&self, raw: &str) -> String {
        escape_string(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_scoped() {
        let mut tree = DomTree::new();
        let list = tree.append_element(NodeId::ROOT, "ul", &[]).unwrap();
        let item = tree.append_element(list, "li", &[("class", "a b")]).unwrap();

        assert_eq!(tree.resolve("li", NodeId::ROOT, 10).unwrap(), vec![item]);
        assert!(tree.resolve("ul", list, 10).unwrap().is_empty());
        assert!(matches!(
            tree.resolve("li[", NodeId::ROOT, 10),
            Err(QueryError::InvalidSelector(_))
        ));
        assert_eq!(
            tree.resolve("li", NodeId::NONE, 10),
            Err(QueryError::InvalidScope(NodeId::NONE))
        );
        assert_eq!(DocumentProvider::classes(&tree, item), vec!["a", "b"]);
        assert!(tree.contains(list, item));
        assert!(tree.is_match("ul > li.b", NodeId::ROOT, item).unwrap());
        assert!(!tree.is_match("li", item, item).unwrap());
        assert!(!tree.contains(item, list));
    }
}
