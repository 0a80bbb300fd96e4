//! Selector AST
//!
//! The subset of Selectors Level 4 that Pinpoint generates and resolves:
//! type, universal, id, class and attribute selectors, the tree-structural
//! pseudo-classes, `:not()`, `:scope`, and all four combinators.

/// Pseudo-class type
#[derive(Debug, Clone, PartialEq)]
pub enum PseudoClass {
    // Tree-structural pseudo-classes
    Root,
    Empty,
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    NthChild(NthExpression),
    NthLastChild(NthExpression),
    NthOfType(NthExpression),
    NthLastOfType(NthExpression),

    // Logical pseudo-classes
    Not(Vec<CompoundSelector>),

    // Scope pseudo-class (matches the element the query is scoped to)
    Scope,
}

impl PseudoClass {
    /// Check if matching depends on the element's sibling position
    pub fn is_positional(&self) -> bool {
        matches!(
            self,
            Self::FirstChild
                | Self::LastChild
                | Self::OnlyChild
                | Self::FirstOfType
                | Self::LastOfType
                | Self::OnlyOfType
                | Self::NthChild(_)
                | Self::NthLastChild(_)
                | Self::NthOfType(_)
                | Self::NthLastOfType(_)
        )
    }
}

/// `An+B` argument of the `:nth-*` pseudo-classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NthExpression {
    pub step: i32,
    pub offset: i32,
}

impl NthExpression {
    pub fn new(step: i32, offset: i32) -> Self {
        Self { step, offset }
    }

    /// A fixed 1-based position, as emitted by the synthesizer
    pub fn position(index: i32) -> Self {
        Self::new(0, index)
    }

    /// Check whether 1-based position `n` is selected, i.e. `n = step*k + offset` for some `k >= 0`
    pub fn matches(&self, n: i32) -> bool {
        let distance = n - self.offset;
        match self.step.signum() {
            0 => distance == 0,
            sign => distance * sign >= 0 && distance % self.step == 0,
        }
    }
}

/// A simple selector: one condition on an element
#[derive(Debug, Clone, PartialEq)]
pub enum SimpleSelector {
    /// Universal selector *
    Universal,
    /// Type selector (tag name, lowercase)
    Type(String),
    /// ID selector #id
    Id(String),
    /// Class selector .class
    Class(String),
    /// Attribute selector [attr], [attr=value], etc.
    Attribute(AttributeSelector),
    /// Pseudo-class :nth-child(), :not(), etc.
    PseudoClass(PseudoClass),
}

impl SimpleSelector {
    /// Check if this selector constrains the element by identity rather than
    /// by position alone
    pub fn is_anchor(&self) -> bool {
        matches!(
            self,
            Self::Type(_) | Self::Id(_) | Self::Class(_) | Self::Attribute(_)
        )
    }
}

/// Attribute selector
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSelector {
    pub name: String,
    pub matcher: Option<AttributeMatcher>,
    pub case_insensitive: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeMatcher {
    /// [attr=value] - exact match
    Exact(String),
    /// [attr~=value] - whitespace-separated list contains
    Contains(String),
    /// [attr|=value] - exact or prefix with hyphen
    DashMatch(String),
    /// [attr^=value] - starts with
    Prefix(String),
    /// [attr$=value] - ends with
    Suffix(String),
    /// [attr*=value] - contains substring
    Substring(String),
}

impl AttributeSelector {
    /// Check if an attribute value matches
    pub fn matches(&self, value: Option<&str>) -> bool {
        let (Some(matcher), Some(val)) = (&self.matcher, value) else {
            // [attr] only checks existence
            return self.matcher.is_none() && value.is_some();
        };

        let fold = |s: &str| {
            if self.case_insensitive {
                s.to_ascii_lowercase()
            } else {
                s.to_string()
            }
        };
        let val = fold(val);

        match matcher {
            AttributeMatcher::Exact(expected) => val == fold(expected),
            AttributeMatcher::Contains(expected) => {
                let expected = fold(expected);
                !expected.is_empty() && val.split_ascii_whitespace().any(|w| w == expected)
            }
            AttributeMatcher::DashMatch(expected) => {
                let expected = fold(expected);
                val == expected || val.starts_with(&format!("{expected}-"))
            }
            AttributeMatcher::Prefix(expected) => {
                !expected.is_empty() && val.starts_with(&fold(expected))
            }
            AttributeMatcher::Suffix(expected) => {
                !expected.is_empty() && val.ends_with(&fold(expected))
            }
            AttributeMatcher::Substring(expected) => {
                !expected.is_empty() && val.contains(&fold(expected))
            }
        }
    }
}

/// A sequence of simple selectors not separated by a combinator
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompoundSelector {
    pub simple: Vec<SimpleSelector>,
}

impl CompoundSelector {
    /// Check if any component anchors the compound (see [`SimpleSelector::is_anchor`])
    pub fn has_anchor(&self) -> bool {
        self.simple.iter().any(SimpleSelector::is_anchor)
    }
}

/// Combinator between two compound selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
    /// `a + b`
    NextSibling,
    /// `a ~ b`
    SubsequentSibling,
}

/// Compound selectors joined by combinators, stored left to right.
/// `combinators[i]` sits between `compounds[i]` and `compounds[i + 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexSelector {
    pub compounds: Vec<CompoundSelector>,
    pub combinators: Vec<Combinator>,
}

impl ComplexSelector {
    /// The rightmost compound (the one the matched element must satisfy)
    pub fn subject(&self) -> Option<&CompoundSelector> {
        self.compounds.last()
    }
}

/// Comma-separated selector list
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    /// Parse a selector list
    pub fn parse(input: &str) -> Result<Self, crate::SelectorError> {
        crate::parser::parse_selector_list(input)
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}
