//! Pinpoint HTML Loader
//!
//! Parses HTML5 text with html5ever and converts the result into a
//! [`pinpoint_dom::DomTree`].

mod parser;

pub use parser::HtmlParser;

use pinpoint_dom::{DomError, DomTree};

/// Parse an HTML string into a tree
pub fn parse(html: &str) -> Result<DomTree, HtmlError> {
    HtmlParser::new().parse(html)
}

/// HTML loading error
#[derive(Debug, thiserror::Error)]
pub enum HtmlError {
    #[error("failed to read HTML input: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to build tree: {0}")]
    Dom(#[from] DomError),
}
