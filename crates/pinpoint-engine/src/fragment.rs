//! Fragment generation
//!
//! A fragment is one compound selector describing a single element, e.g.
//! `#main`, `.card`, `[data-testid="save"]` or `li:nth-of-type(3)`. The
//! generator emits every acceptable fragment of an element, cheapest first.

use pinpoint_dom::NodeId;

use crate::provider::{DocumentProvider, Escaper};
use crate::validator::FragmentPolicy;

/// Attributes written specifically for test automation
pub const TEST_ATTRIBUTES: &[&str] = &[
    "data-testid",
    "data-test",
    "data-test-id",
    "data-cy",
    "data-qa",
    "data-automation-id",
    "data-id",
];

/// Attributes covered by other tiers or never stable: `id`, `class`,
/// `style` and event handlers
fn is_reserved_attribute(name: &str) -> bool {
    ["id", "class", "style"]
        .iter()
        .any(|reserved| name.eq_ignore_ascii_case(reserved))
        || name.get(..2).is_some_and(|prefix| prefix.eq_ignore_ascii_case("on"))
}

/// Fragment category, ordered by base penalty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    Id,
    TestAttribute,
    Class,
    Attribute,
    Tag,
    TagNthOfType,
    TagNthChild,
}

impl FragmentKind {
    /// Base penalty of the tier
    pub fn base_penalty(self) -> f64 {
        match self {
            Self::Id => 0.0,
            Self::TestAttribute => 0.5,
            Self::Class => 1.0,
            Self::Attribute => 2.0,
            Self::Tag => 5.0,
            Self::TagNthOfType => 10.0,
            Self::TagNthChild => 50.0,
        }
    }

    /// Check if the fragment depends on sibling order
    pub fn is_positional(self) -> bool {
        matches!(self, Self::TagNthOfType | Self::TagNthChild)
    }

    pub fn is_attribute(self) -> bool {
        matches!(self, Self::TestAttribute | Self::Attribute)
    }
}

/// Penalty of a class fragment whose name contains a relevant term
pub const RELEVANT_CLASS_PENALTY: f64 = 0.8;

/// One compound selector with its cost
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorFragment {
    /// Serialized, escaped selector text
    pub text: String,
    pub penalty: f64,
    /// Distance from the target (0 = the target itself)
    pub level: usize,
    pub kind: FragmentKind,
    /// Unescaped token the fragment was built from (id, class, attribute value or tag)
    pub token: String,
}

impl SelectorFragment {
    fn new(kind: FragmentKind, text: String, token: &str) -> Self {
        Self {
            text,
            penalty: kind.base_penalty(),
            level: 0,
            kind,
            token: token.to_string(),
        }
    }

    /// Copy of this fragment stamped with `level`
    pub fn at_level(&self, level: usize) -> Self {
        Self {
            level,
            ..self.clone()
        }
    }
}

/// Produces the candidate fragments of an element
pub struct FragmentGenerator<'a> {
    policy: &'a dyn FragmentPolicy,
    escaper: &'a dyn Escaper,
    relevant_terms: Vec<String>,
}

impl<'a> FragmentGenerator<'a> {
    pub fn new(
        policy: &'a dyn FragmentPolicy,
        escaper: &'a dyn Escaper,
        relevant_terms: &[String],
    ) -> Self {
        Self {
            policy,
            escaper,
            relevant_terms: relevant_terms.iter().map(|t| t.to_lowercase()).collect(),
        }
    }

    /// Number of relevant terms contained in `token`
    pub fn relevance(&self, token: &str) -> usize {
        if self.relevant_terms.is_empty() {
            return 0;
        }
        let token = token.to_lowercase();
        self.relevant_terms
            .iter()
            .filter(|term| !term.is_empty() && token.contains(term.as_str()))
            .count()
    }

    /// All fragments for `node`, ascending penalty, at level 0
    pub fn generate<D: DocumentProvider + ?Sized>(
        &self,
        doc: &D,
        node: NodeId,
    ) -> Vec<SelectorFragment> {
        let Some(tag) = doc.tag_name(node) else {
            return Vec::new();
        };
        let mut out = Vec::new();

        if let Some(id) = doc.id(node).filter(|id| self.policy.is_acceptable_identifier(id)) {
            let text = format!("#{}", self.escaper.identifier(id));
            out.push(SelectorFragment::new(FragmentKind::Id, text, id));
        }

        let attributes = doc.attributes(node);
        for &(name, value) in &attributes {
            if TEST_ATTRIBUTES.contains(&name) && self.policy.is_acceptable_attribute(name, value) {
                out.push(self.attribute(FragmentKind::TestAttribute, name, value));
            }
        }

        for class in doc.classes(node) {
            if !self.policy.is_acceptable_class(class) {
                continue;
            }
            let text = format!(".{}", self.escaper.identifier(class));
            let mut fragment = SelectorFragment::new(FragmentKind::Class, text, class);
            if self.relevance(class) > 0 {
                fragment.penalty = RELEVANT_CLASS_PENALTY;
            }
            out.push(fragment);
        }

        for &(name, value) in &attributes {
            if !TEST_ATTRIBUTES.contains(&name)
                && !is_reserved_attribute(name)
                && self.policy.is_acceptable_attribute(name, value)
            {
                out.push(self.attribute(FragmentKind::Attribute, name, value));
            }
        }

        self.push_structural(doc, node, tag, &mut out);

        out.sort_by(|a, b| a.penalty.total_cmp(&b.penalty));
        out
    }

    fn attribute(&self, kind: FragmentKind, name: &str, value: &str) -> SelectorFragment {
        let text = format!(
            "[{}={}]",
            self.escaper.identifier(name),
            self.escaper.string(value)
        );
        SelectorFragment::new(kind, text, value)
    }

    /// Tag and ordinal tiers
    fn push_structural<D: DocumentProvider + ?Sized>(
        &self,
        doc: &D,
        node: NodeId,
        tag: &str,
        out: &mut Vec<SelectorFragment>,
    ) {
        let position = doc.position(node);

        if !self.policy.is_acceptable_tag(tag) {
            out.push(SelectorFragment::new(FragmentKind::Tag, "*".into(), "*"));
            if let Some(pos) = position.filter(|p| p.count > 1) {
                let text = format!("*:nth-child({})", pos.index);
                out.push(SelectorFragment::new(FragmentKind::TagNthChild, text, "*"));
            }
            return;
        }

        let escaped = self.escaper.identifier(tag);
        out.push(SelectorFragment::new(FragmentKind::Tag, escaped.clone(), tag));

        let Some(pos) = position else {
            return;
        };
        if pos.type_count > 1 {
            let text = format!("{escaped}:nth-of-type({})", pos.type_index);
            out.push(SelectorFragment::new(FragmentKind::TagNthOfType, text, tag));
        }
        if pos.count > pos.type_count {
            let text = format!("{escaped}:nth-child({})", pos.index);
            out.push(SelectorFragment::new(FragmentKind::TagNthChild, text, tag));
        }
    }
}
