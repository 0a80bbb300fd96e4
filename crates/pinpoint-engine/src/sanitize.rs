//! Selector sanitizer
//!
//! Caller-side gate for selectors that leave the engine, e.g. before they
//! are stored or handed to automation. Rejects selectors that would match
//! far too broadly or that carry content which does not belong in a
//! selector.

use pinpoint_css::{ComplexSelector, PseudoClass, SelectorError, SelectorList, SimpleSelector};

/// Default maximum selector length in bytes
pub const DEFAULT_MAX_LENGTH: usize = 512;

const DOCUMENT_ROOT_TAGS: &[&str] = &["html", "body"];

/// Why a selector was rejected
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SanitizeError {
    #[error("empty selector")]
    Empty,

    #[error("selector is {len} bytes, limit is {max}")]
    TooLong { len: usize, max: usize },

    #[error("selector contains a control character")]
    ControlCharacter,

    #[error("selector contains markup or script content")]
    Markup,

    #[error("selector only targets the document root")]
    DocumentRoot,

    #[error("selector has no tag, id, class or attribute anchor")]
    Unanchored,

    #[error("selector does not parse: {0}")]
    Invalid(#[from] SelectorError),
}

/// Validates selectors before they are used outside the engine
#[derive(Debug, Clone)]
pub struct SelectorSanitizer {
    max_length: usize,
}

impl Default for SelectorSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectorSanitizer {
    pub fn new() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
        }
    }

    pub fn with_max_length(mut self, max: usize) -> Self {
        self.max_length = max;
        self
    }

    /// Check a selector, returning the reason it was rejected
    pub fn check(&self, selector: &str) -> Result<(), SanitizeError> {
        let trimmed = selector.trim();
        if trimmed.is_empty() {
            return Err(SanitizeError::Empty);
        }
        if selector.len() > self.max_length {
            return Err(SanitizeError::TooLong {
                len: selector.len(),
                max: self.max_length,
            });
        }
        if selector.chars().any(char::is_control) {
            return Err(SanitizeError::ControlCharacter);
        }
        if selector.contains('<') || selector.to_ascii_lowercase().contains("javascript:") {
            return Err(SanitizeError::Markup);
        }

        let list = SelectorList::parse(trimmed)?;
        if list.selectors.iter().all(is_document_root) {
            return Err(SanitizeError::DocumentRoot);
        }
        if !list.selectors.iter().all(is_anchored) {
            return Err(SanitizeError::Unanchored);
        }
        Ok(())
    }

    /// Return `selector` if it passes, otherwise the empty string
    pub fn sanitize_or_empty(&self, selector: &str) -> String {
        match self.check(selector) {
            Ok(()) => selector.to_string(),
            Err(reason) => {
                tracing::warn!(
                    target: "pinpoint::security",
                    %reason,
                    selector = %selector.escape_debug(),
                    "rejected selector"
                );
                String::new()
            }
        }
    }
}

/// A lone `html`, `body` or `:root`
fn is_document_root(selector: &ComplexSelector) -> bool {
    let [compound] = selector.compounds.as_slice() else {
        return false;
    };
    !compound.simple.is_empty()
        && compound.simple.iter().all(|simple| match simple {
            SimpleSelector::Type(tag) => DOCUMENT_ROOT_TAGS.contains(&tag.as_str()),
            SimpleSelector::PseudoClass(PseudoClass::Root) => true,
            _ => false,
        })
}

fn is_anchored(selector: &ComplexSelector) -> bool {
    selector.compounds.iter().any(|c| c.has_anchor())
}
