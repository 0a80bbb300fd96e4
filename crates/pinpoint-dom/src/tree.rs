//! DOM Tree (arena-based allocation)
//!
//! The tree is append-only: nodes are created detached and linked with
//! [`DomTree::append_child`]. Sibling indices are recorded at append time,
//! which keeps `:nth-child` / `:nth-of-type` lookups O(1) even under parents
//! with thousands of children.

use crate::{DomError, DomResult, ElementData, Node, NodeId};

/// Arena-based DOM tree
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
}

/// Position of an element among its element siblings (all indices 1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiblingPosition {
    /// Index among all element siblings (`:nth-child`)
    pub index: usize,
    /// Number of element siblings, including this one
    pub count: usize,
    /// Index among same-tag siblings (`:nth-of-type`)
    pub type_index: usize,
    /// Number of same-tag siblings, including this one
    pub type_count: usize,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
        }
    }

    /// The document node
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if !id.is_valid() {
            return None;
        }
        self.nodes.get(id.index())
    }

    /// Number of nodes in the tree (document node included)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree holds nothing but the document node
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::element(tag))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(Node::text(text))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(Node::comment(text))
    }

    /// Element data for `id`
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    /// Check if `id` is an element
    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    /// Set an attribute on an element
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        let node = self
            .nodes
            .get_mut(id.index())
            .filter(|_| id.is_valid())
            .ok_or(DomError::NotFound(id))?;
        let elem = node.as_element_mut().ok_or(DomError::NotAnElement(id))?;
        elem.set_attr(name, value);
        Ok(())
    }

    /// Remove an attribute from an element
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomResult<Option<String>> {
        let node = self
            .nodes
            .get_mut(id.index())
            .filter(|_| id.is_valid())
            .ok_or(DomError::NotFound(id))?;
        let elem = node.as_element_mut().ok_or(DomError::NotAnElement(id))?;
        Ok(elem.remove_attr(name))
    }

    /// Append a detached node as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        let parent_node = self.get(parent).ok_or(DomError::NotFound(parent))?;
        if !(parent_node.is_element() || parent_node.is_document()) {
            return Err(DomError::InvalidNodeType(parent));
        }
        let child_node = self.get(child).ok_or(DomError::NotFound(child))?;
        if child_node.is_document() {
            return Err(DomError::InvalidNodeType(child));
        }
        if child_node.parent.is_valid() || self.is_inclusive_ancestor(child, parent) {
            tracing::trace!(%parent, %child, "rejected append");
            return Err(DomError::HierarchyRequest { parent, child });
        }

        let prev_last = self.nodes[parent.index()].last_child;
        let (element_index, type_index) = match child_node.as_element() {
            Some(elem) => {
                let index = self.nodes[parent.index()].element_child_count + 1;
                (index, self.next_type_index(prev_last, elem.tag()))
            }
            None => (0, 0),
        };

        {
            let child_node = &mut self.nodes[child.index()];
            child_node.parent = parent;
            child_node.prev_sibling = prev_last;
            child_node.next_sibling = NodeId::NONE;
            child_node.element_index = element_index;
            child_node.type_index = type_index;
        }
        if prev_last.is_valid() {
            self.nodes[prev_last.index()].next_sibling = child;
        }

        let parent_node = &mut self.nodes[parent.index()];
        if !parent_node.first_child.is_valid() {
            parent_node.first_child = child;
        }
        parent_node.last_child = child;
        if element_index > 0 {
            parent_node.element_child_count = element_index;
        }

        Ok(child)
    }

    /// Walk back from `last` to the nearest same-tag sibling
    fn next_type_index(&self, last: NodeId, tag: &str) -> u32 {
        let mut cursor = last;
        while let Some(node) = self.get(cursor) {
            if node.as_element().is_some_and(|e| e.tag() == tag) {
                return node.type_index + 1;
            }
            cursor = node.prev_sibling;
        }
        1
    }

    /// Create an element with attributes and append it to `parent`
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attrs: &[(&str, &str)],
    ) -> DomResult<NodeId> {
        let id = self.create_element(tag);
        for (name, value) in attrs {
            self.set_attribute(id, name, value)?;
        }
        self.append_child(parent, id)
    }

    /// Create a text node and append it to `parent`
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> DomResult<NodeId> {
        let id = self.create_text(text);
        self.append_child(parent, id)
    }

    /// Parent node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent.to_option())
    }

    /// Parent node, only if it is an element
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|&p| self.is_element(p))
    }

    /// Iterate over all child nodes
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.get(id).map_or(NodeId::NONE, |n| n.first_child),
        }
    }

    /// Iterate over element children
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id).filter(move |&c| self.is_element(c))
    }

    /// Pre-order iteration over all descendants of `id` (excluding `id`)
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            root: id,
            next: self.get(id).map_or(NodeId::NONE, |n| n.first_child),
        }
    }

    /// Iterate over ancestors of `id`, nearest first (excluding `id`)
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.get(id).map_or(NodeId::NONE, |n| n.parent),
        }
    }

    /// Check if `ancestor` is `node` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        ancestor == node || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Nearest preceding element sibling
    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut cursor = self.get(id)?.prev_sibling;
        while let Some(node) = self.get(cursor) {
            if node.is_element() {
                return Some(cursor);
            }
            cursor = node.prev_sibling;
        }
        None
    }

    /// Nearest following element sibling
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut cursor = self.get(id)?.next_sibling;
        while let Some(node) = self.get(cursor) {
            if node.is_element() {
                return Some(cursor);
            }
            cursor = node.next_sibling;
        }
        None
    }

    /// 1-based index among element siblings; `None` for detached nodes and non-elements
    pub fn element_index(&self, id: NodeId) -> Option<usize> {
        self.get(id)
            .filter(|n| n.element_index > 0)
            .map(|n| n.element_index as usize)
    }

    /// 1-based index among same-tag element siblings
    pub fn type_index(&self, id: NodeId) -> Option<usize> {
        self.get(id)
            .filter(|n| n.type_index > 0)
            .map(|n| n.type_index as usize)
    }

    /// Number of element children of `id`
    pub fn element_child_count(&self, id: NodeId) -> usize {
        self.get(id).map_or(0, |n| n.element_child_count as usize)
    }

    /// Full sibling position. Counting same-tag siblings walks the parent's
    /// children, so prefer [`element_index`](Self::element_index) and
    /// [`type_index`](Self::type_index) on hot paths.
    pub fn position(&self, id: NodeId) -> Option<SiblingPosition> {
        let node = self.get(id)?;
        let tag = node.as_element()?.tag();
        if node.element_index == 0 {
            return None;
        }
        let parent = node.parent;
        let type_count = self
            .element_children(parent)
            .filter(|&c| self.element(c).is_some_and(|e| e.tag() == tag))
            .count();
        Some(SiblingPosition {
            index: node.element_index as usize,
            count: self.element_child_count(parent),
            type_index: node.type_index as usize,
            type_count,
        })
    }

    /// Number of ancestors between `id` and the document node
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count()
    }

    /// First element child of the document node
    pub fn document_element(&self) -> Option<NodeId> {
        self.element_children(self.root()).next()
    }

    /// Find the first element in document order with the given id
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .find(|&n| self.element(n).and_then(ElementData::id) == Some(id))
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .filter_map(|n| self.get(n).and_then(Node::as_text))
            .collect()
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Child iterator
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next;
        let node = self.tree.get(current)?;
        self.next = node.next_sibling;
        Some(current)
    }
}

/// Pre-order descendant iterator bounded by its starting node
pub struct Descendants<'a> {
    tree: &'a DomTree,
    root: NodeId,
    next: NodeId,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next;
        let node = self.tree.get(current)?;

        self.next = if node.first_child.is_valid() {
            node.first_child
        } else {
            let mut cursor = current;
            loop {
                if cursor == self.root {
                    break NodeId::NONE;
                }
                let Some(n) = self.tree.get(cursor) else {
                    break NodeId::NONE;
                };
                if n.next_sibling.is_valid() {
                    break n.next_sibling;
                }
                cursor = n.parent;
            }
        };

        Some(current)
    }
}

/// Ancestor iterator, nearest first
pub struct Ancestors<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next;
        let node = self.tree.get(current)?;
        self.next = node.parent;
        Some(current)
    }
}
