//! Selector parser using lightningcss
//!
//! The selector text becomes the prelude of an empty style rule, is parsed
//! by lightningcss and converted into our AST. Components outside the
//! supported subset (pseudo-elements, user-action pseudo-classes, `:is()`,
//! namespaces) are rejected.

use lightningcss::rules::CssRule;
use lightningcss::selector::{Component, Selector};
use lightningcss::stylesheet::{ParserOptions, StyleSheet};
use parcel_selectors::attr::{
    AttrSelectorOperator, ParsedAttrSelectorOperation, ParsedCaseSensitivity,
};
use parcel_selectors::parser::{Combinator as CssCombinator, NthSelectorData, NthType};

use crate::selectors::{
    AttributeMatcher, AttributeSelector, Combinator, ComplexSelector, CompoundSelector,
    NthExpression, PseudoClass, SelectorList, SimpleSelector,
};

/// Selector parse error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid selector at offset {position}: {message}")]
pub struct SelectorError {
    /// Character offset of the failure, 0 when only the component is known
    pub position: usize,
    pub message: String,
}

impl SelectorError {
    fn new(position: usize, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }

    fn unsupported(what: &str) -> Self {
        Self::new(0, format!("unsupported {what}"))
    }
}

type ParseResult<T> = Result<T, SelectorError>;

/// Parse a comma-separated selector list
pub fn parse_selector_list(input: &str) -> ParseResult<SelectorList> {
    if input.trim().is_empty() {
        return Err(SelectorError::new(0, "empty selector"));
    }

    let source = format!("{input} {{}}");
    let sheet = StyleSheet::parse(&source, ParserOptions::default()).map_err(|err| {
        let position = err
            .loc
            .as_ref()
            .map_or(0, |loc| loc.column.saturating_sub(1) as usize);
        SelectorError::new(position.min(input.len()), err.kind.to_string())
    })?;

    // anything that closes the rule early shows up as extra rules or declarations
    let rule = match sheet.rules.0.as_slice() {
        [CssRule::Style(rule)]
            if rule.declarations.declarations.is_empty()
                && rule.declarations.important_declarations.is_empty()
                && rule.rules.0.is_empty() =>
        {
            rule
        }
        _ => return Err(SelectorError::new(0, "expected a selector list")),
    };

    let selectors = rule
        .selectors
        .0
        .iter()
        .map(convert_selector)
        .collect::<ParseResult<Vec<_>>>()?;

    tracing::trace!(selector = input, complex = selectors.len(), "parsed selector");
    Ok(SelectorList { selectors })
}

/// Convert one complex selector. lightningcss stores components right to
/// left, with a combinator component between compounds.
fn convert_selector(selector: &Selector<'_>) -> ParseResult<ComplexSelector> {
    let mut compounds = Vec::new();
    let mut combinators = Vec::new();
    let mut current = Vec::new();

    for component in selector.iter_raw_match_order() {
        if let Component::Combinator(combinator) = component {
            compounds.push(compound(std::mem::take(&mut current))?);
            combinators.push(convert_combinator(*combinator)?);
        } else {
            current.push(convert_simple(component)?);
        }
    }
    compounds.push(compound(current)?);

    compounds.reverse();
    combinators.reverse();
    Ok(ComplexSelector {
        compounds,
        combinators,
    })
}

fn compound(mut simple: Vec<SimpleSelector>) -> ParseResult<CompoundSelector> {
    if simple.is_empty() {
        return Err(SelectorError::new(0, "combinator without a compound selector"));
    }
    // type or universal first, the rest in source order
    simple.sort_by_key(|s| !matches!(s, SimpleSelector::Type(_) | SimpleSelector::Universal));
    Ok(CompoundSelector { simple })
}

fn convert_combinator(combinator: CssCombinator) -> ParseResult<Combinator> {
    match combinator {
        CssCombinator::Descendant => Ok(Combinator::Descendant),
        CssCombinator::Child => Ok(Combinator::Child),
        CssCombinator::NextSibling => Ok(Combinator::NextSibling),
        CssCombinator::LaterSibling => Ok(Combinator::SubsequentSibling),
        _ => Err(SelectorError::unsupported("combinator")),
    }
}

fn convert_simple(component: &Component<'_>) -> ParseResult<SimpleSelector> {
    let simple = match component {
        Component::ExplicitUniversalType => SimpleSelector::Universal,
        Component::LocalName(name) => SimpleSelector::Type(name.lower_name.0.to_ascii_lowercase()),
        Component::ID(id) => SimpleSelector::Id(owned(&id.0)),
        Component::Class(class) => SimpleSelector::Class(owned(&class.0)),
        Component::AttributeInNoNamespaceExists {
            local_name_lower, ..
        } => SimpleSelector::Attribute(AttributeSelector {
            name: owned(&local_name_lower.0),
            matcher: None,
            case_insensitive: false,
        }),
        Component::AttributeInNoNamespace {
            local_name,
            operator,
            value,
            case_sensitivity,
            ..
        } => SimpleSelector::Attribute(AttributeSelector {
            name: local_name.0.to_ascii_lowercase(),
            matcher: Some(attribute_matcher(operator, &value.0)),
            case_insensitive: is_case_insensitive(case_sensitivity),
        }),
        Component::AttributeOther(attribute) if attribute.namespace.is_none() => {
            let name = owned(&attribute.local_name_lower.0);
            SimpleSelector::Attribute(match &attribute.operation {
                ParsedAttrSelectorOperation::Exists => AttributeSelector {
                    name,
                    matcher: None,
                    case_insensitive: false,
                },
                ParsedAttrSelectorOperation::WithValue {
                    operator,
                    case_sensitivity,
                    expected_value,
                } => AttributeSelector {
                    name,
                    matcher: Some(attribute_matcher(operator, &expected_value.0)),
                    case_insensitive: is_case_insensitive(case_sensitivity),
                },
            })
        }
        Component::Root => SimpleSelector::PseudoClass(PseudoClass::Root),
        Component::Empty => SimpleSelector::PseudoClass(PseudoClass::Empty),
        Component::Scope => SimpleSelector::PseudoClass(PseudoClass::Scope),
        Component::Nth(data) => SimpleSelector::PseudoClass(convert_nth(data)?),
        Component::Negation(inner) => SimpleSelector::PseudoClass(PseudoClass::Not(
            inner.iter().map(negated_compound).collect::<ParseResult<_>>()?,
        )),
        Component::NonTSPseudoClass(_) => return Err(SelectorError::unsupported("pseudo-class")),
        Component::PseudoElement(_) => return Err(SelectorError::unsupported("pseudo-element")),
        Component::ExplicitAnyNamespace
        | Component::ExplicitNoNamespace
        | Component::DefaultNamespace(_)
        | Component::Namespace(..)
        | Component::AttributeOther(_) => return Err(SelectorError::unsupported("namespace")),
        _ => return Err(SelectorError::unsupported("selector component")),
    };
    Ok(simple)
}

fn convert_nth(data: &NthSelectorData) -> ParseResult<PseudoClass> {
    let expr = NthExpression::new(data.a, data.b);
    let pseudo = match data.ty {
        NthType::Child if data.is_function => PseudoClass::NthChild(expr),
        NthType::Child => PseudoClass::FirstChild,
        NthType::LastChild if data.is_function => PseudoClass::NthLastChild(expr),
        NthType::LastChild => PseudoClass::LastChild,
        NthType::OnlyChild => PseudoClass::OnlyChild,
        NthType::OfType if data.is_function => PseudoClass::NthOfType(expr),
        NthType::OfType => PseudoClass::FirstOfType,
        NthType::LastOfType if data.is_function => PseudoClass::NthLastOfType(expr),
        NthType::LastOfType => PseudoClass::LastOfType,
        NthType::OnlyOfType => PseudoClass::OnlyOfType,
        _ => return Err(SelectorError::unsupported("column pseudo-class")),
    };
    Ok(pseudo)
}

/// `:not()` arguments must be single compounds
fn negated_compound(selector: &Selector<'_>) -> ParseResult<CompoundSelector> {
    let mut complex = convert_selector(selector)?;
    if complex.compounds.len() != 1 {
        return Err(SelectorError::unsupported("complex selector inside :not()"));
    }
    Ok(complex.compounds.remove(0))
}

fn attribute_matcher(operator: &AttrSelectorOperator, value: &str) -> AttributeMatcher {
    let value = owned(value);
    match operator {
        AttrSelectorOperator::Equal => AttributeMatcher::Exact(value),
        AttrSelectorOperator::Includes => AttributeMatcher::Contains(value),
        AttrSelectorOperator::DashMatch => AttributeMatcher::DashMatch(value),
        AttrSelectorOperator::Prefix => AttributeMatcher::Prefix(value),
        AttrSelectorOperator::Substring => AttributeMatcher::Substring(value),
        AttrSelectorOperator::Suffix => AttributeMatcher::Suffix(value),
    }
}

/// `i` flags, plus the HTML attributes whose values compare case-insensitively
fn is_case_insensitive(case: &ParsedCaseSensitivity) -> bool {
    matches!(
        case,
        ParsedCaseSensitivity::AsciiCaseInsensitive
            | ParsedCaseSensitivity::AsciiCaseInsensitiveIfInHtmlElementInHtmlDocument
    )
}

fn owned(value: &str) -> String {
    value.to_owned()
}
