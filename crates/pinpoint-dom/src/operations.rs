//! DOM Node Operations errors

use crate::NodeId;

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Node not found
    #[error("node {0} not found")]
    NotFound(NodeId),

    /// Hierarchy error (e.g., inserting an ancestor, or a node that already has a parent)
    #[error("hierarchy request error: cannot append {child} to {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    /// Operation requires an element
    #[error("node {0} is not an element")]
    NotAnElement(NodeId),

    /// Only element, text and comment nodes can be appended
    #[error("node {0} cannot be a child")]
    InvalidNodeType(NodeId),
}
