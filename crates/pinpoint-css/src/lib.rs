//! Pinpoint CSS - Selector engine
//!
//! Parses selector strings into an AST, matches them against a
//! [`pinpoint_dom::DomTree`] within a scope element, and serializes
//! identifiers and strings so generated selectors always parse back.

mod escape;
mod matching;
mod parser;
pub mod selectors;

pub use escape::{escape_identifier, escape_string};
pub use matching::{
    match_pseudo_class, matches, matches_complex, matches_compound, query_all, query_first,
    query_limit,
};
pub use parser::{SelectorError, parse_selector_list};
pub use selectors::{
    AttributeMatcher, AttributeSelector, Combinator, ComplexSelector, CompoundSelector,
    NthExpression, PseudoClass, SelectorList, SimpleSelector,
};

use pinpoint_dom::{DomTree, NodeId};

/// Parse `selector` and return every match strictly inside `scope`
pub fn query_selector_all(
    tree: &DomTree,
    scope: NodeId,
    selector: &str,
) -> Result<Vec<NodeId>, SelectorError> {
    let list = SelectorList::parse(selector)?;
    Ok(query_all(tree, scope, &list))
}

/// Parse `selector` and return the first match inside `scope`
pub fn query_selector(
    tree: &DomTree,
    scope: NodeId,
    selector: &str,
) -> Result<Option<NodeId>, SelectorError> {
    let list = SelectorList::parse(selector)?;
    Ok(query_first(tree, scope, &list))
}
