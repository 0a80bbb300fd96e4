//! HTML5 Parser implementation
//!
//! Uses html5ever's RcDom and converts it to our arena tree. The conversion
//! walks an explicit stack so deeply nested markup cannot overflow the call
//! stack.

use std::io::Read;
use std::path::Path;

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use pinpoint_dom::{DomTree, NodeId};

use crate::HtmlError;

/// HTML5 parser
#[derive(Debug, Clone, Default)]
pub struct HtmlParser {
    keep_comments: bool,
}

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep comment nodes in the converted tree (dropped by default)
    pub fn keep_comments(mut self, keep: bool) -> Self {
        self.keep_comments = keep;
        self
    }

    /// Parse an HTML string
    pub fn parse(&self, html: &str) -> Result<DomTree, HtmlError> {
        self.parse_reader(&mut html.as_bytes())
    }

    /// Parse an HTML file
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<DomTree, HtmlError> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading HTML file");
        let mut file = std::fs::File::open(path)?;
        self.parse_reader(&mut file)
    }

    /// Parse UTF-8 HTML from any reader
    pub fn parse_reader<R: Read>(&self, reader: &mut R) -> Result<DomTree, HtmlError> {
        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(reader)?;

        let mut tree = DomTree::new();
        self.convert(&dom.document, &mut tree)?;

        tracing::debug!(nodes = tree.len(), "parsed HTML document");
        Ok(tree)
    }

    /// Convert an RcDom document into `tree`, preserving child order
    fn convert(&self, document: &Handle, tree: &mut DomTree) -> Result<(), HtmlError> {
        let mut stack: Vec<(Handle, NodeId)> = document
            .children
            .borrow()
            .iter()
            .rev()
            .map(|child| (child.clone(), NodeId::ROOT))
            .collect();

        while let Some((handle, parent)) = stack.pop() {
            match &handle.data {
                RcNodeData::Element { name, attrs, .. } => {
                    let id = tree.create_element(&name.local);
                    for attr in attrs.borrow().iter() {
                        tree.set_attribute(id, &attr.name.local, &attr.value)?;
                    }
                    tree.append_child(parent, id)?;

                    stack.extend(
                        handle
                            .children
                            .borrow()
                            .iter()
                            .rev()
                            .map(|child| (child.clone(), id)),
                    );
                }
                RcNodeData::Text { contents } => {
                    let text = contents.borrow();
                    if !text.trim().is_empty() {
                        tree.append_text(parent, &text)?;
                    }
                }
                RcNodeData::Comment { contents } if self.keep_comments => {
                    let id = tree.create_comment(contents);
                    tree.append_child(parent, id)?;
                }
                // Doctypes, processing instructions and dropped comments
                _ => {}
            }
        }
        Ok(())
    }
}
