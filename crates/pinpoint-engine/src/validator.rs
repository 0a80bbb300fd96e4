//! Fragment acceptability policies
//!
//! A policy decides which identifiers, classes, attributes and tags are
//! stable enough to appear in a selector. Predicates must be deterministic:
//! the policy fingerprint is folded into cache keys.

use crate::fragment::TEST_ATTRIBUTES;

/// Maximum length of an acceptable id or class
pub const MAX_IDENTIFIER_LEN: usize = 64;

/// Maximum length of an acceptable attribute value
pub const MAX_ATTRIBUTE_VALUE_LEN: usize = 100;

/// Class prefixes emitted by CSS-in-JS and component frameworks
const VENDOR_PREFIXES: &[&str] = &["css-", "sc-", "jsx-", "emotion-", "svelte-", "ng-"];

/// Attributes that make stable generic fragments by default
const STABLE_ATTRIBUTES: &[&str] = &[
    "name",
    "type",
    "role",
    "aria-label",
    "placeholder",
    "title",
    "alt",
    "for",
    "rel",
    "itemprop",
];

/// Acceptability predicates consulted by the fragment generator
pub trait FragmentPolicy: Send + Sync {
    /// Check an `id` attribute value
    fn is_acceptable_identifier(&self, name: &str) -> bool;

    /// Check a single class name
    fn is_acceptable_class(&self, name: &str) -> bool;

    /// Check an attribute name/value pair
    fn is_acceptable_attribute(&self, name: &str, value: &str) -> bool;

    /// Check a tag name. Rejected tags are replaced by `*`.
    fn is_acceptable_tag(&self, _name: &str) -> bool {
        true
    }

    /// Stable description of the policy's behavior
    fn fingerprint(&self) -> String;
}

/// Check if a token looks machine-generated (hashes, counters, digit soup)
pub fn looks_generated(token: &str) -> bool {
    if token.is_empty() {
        return false;
    }
    if token.bytes().all(|b| b.is_ascii_digit()) {
        return true;
    }

    let digits = token.bytes().filter(u8::is_ascii_digit).count();
    let alnum = token.bytes().filter(u8::is_ascii_alphanumeric).count();
    if alnum >= 4 && digits * 2 > alnum {
        return true;
    }

    token
        .split(['-', '_', ':', '.'])
        .any(|segment| is_hex_run(segment) || is_digit_letter_soup(segment))
}

/// Long hexadecimal run such as `a3f9c2` or `deadbeef01`
fn is_hex_run(segment: &str) -> bool {
    segment.len() >= 6
        && segment.bytes().all(|b| b.is_ascii_hexdigit())
        && segment.bytes().any(|b| b.is_ascii_digit())
}

/// Alternating letters and digits such as `x7f2` or `a1b2c`
fn is_digit_letter_soup(segment: &str) -> bool {
    if segment.len() < 4 || !segment.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return false;
    }
    let transitions = segment
        .as_bytes()
        .windows(2)
        .filter(|w| w[0].is_ascii_digit() != w[1].is_ascii_digit())
        .count();
    transitions >= 3
}

/// Check if a class carries a build-tool scoping prefix or module hash
pub fn is_vendor_scoped(token: &str) -> bool {
    if VENDOR_PREFIXES.iter().any(|p| token.starts_with(p)) {
        return true;
    }
    if let Some(rest) = token.strip_prefix('_') {
        return rest.bytes().any(|b| b.is_ascii_digit());
    }
    // CSS modules: Component_local__hash
    token
        .rsplit_once("__")
        .is_some_and(|(_, hash)| hash.len() >= 5 && hash.bytes().any(|b| b.is_ascii_digit()))
}

fn has_control(value: &str) -> bool {
    value.chars().any(char::is_control)
}

/// Default policy: rejects generated-looking tokens and unstable attributes
#[derive(Debug, Clone, Default)]
pub struct DefaultPolicy {
    extra_attributes: Vec<String>,
    blocked_attributes: Vec<String>,
    reject_numeric_ids: bool,
}

impl DefaultPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `name` as a generic attribute in addition to the built-in list
    pub fn with_attribute(mut self, name: impl Into<String>) -> Self {
        self.extra_attributes.push(name.into().to_ascii_lowercase());
        self
    }

    /// Never use attribute `name`, even if it is a test attribute
    pub fn block_attribute(mut self, name: impl Into<String>) -> Self {
        self.blocked_attributes.push(name.into().to_ascii_lowercase());
        self
    }

    /// Reject ids containing digits (e.g. `thumb-42`)
    pub fn reject_numeric_ids(mut self, reject: bool) -> Self {
        self.reject_numeric_ids = reject;
        self
    }

    fn is_known_attribute(&self, name: &str) -> bool {
        TEST_ATTRIBUTES.contains(&name)
            || STABLE_ATTRIBUTES.contains(&name)
            || name.starts_with("data-")
            || self.extra_attributes.iter().any(|a| a == name)
    }

    fn is_stable_token(token: &str) -> bool {
        !token.is_empty()
            && token.len() <= MAX_IDENTIFIER_LEN
            && !has_control(token)
            && !looks_generated(token)
            && !is_vendor_scoped(token)
    }
}

impl FragmentPolicy for DefaultPolicy {
    fn is_acceptable_identifier(&self, name: &str) -> bool {
        Self::is_stable_token(name)
            && !(self.reject_numeric_ids && name.bytes().any(|b| b.is_ascii_digit()))
    }

    fn is_acceptable_class(&self, name: &str) -> bool {
        Self::is_stable_token(name)
    }

    fn is_acceptable_attribute(&self, name: &str, value: &str) -> bool {
        let name = name.to_ascii_lowercase();
        if self.blocked_attributes.contains(&name) || !self.is_known_attribute(&name) {
            return false;
        }
        !value.trim().is_empty()
            && value.len() <= MAX_ATTRIBUTE_VALUE_LEN
            && !has_control(value)
            && !looks_generated(value)
    }

    fn is_acceptable_tag(&self, name: &str) -> bool {
        !name.is_empty()
            && name
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    }

    fn fingerprint(&self) -> String {
        format!(
            "default;extra={};blocked={};numeric_ids={}",
            self.extra_attributes.join(","),
            self.blocked_attributes.join(","),
            self.reject_numeric_ids
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens() {
        for token in ["123", "a3f9c2", "x7f2", "item-8f3a9d1c", "2024-01-05", "a1b2c3"] {
            assert!(looks_generated(token), "{token}");
        }
        for token in ["gallery-item", "thumb-42", "h2", "mp4", "nav", "col-md-6", "btn"] {
            assert!(!looks_generated(token), "{token}");
        }
    }

    #[test]
    fn test_vendor_scoped_tokens() {
        for token in ["css-x7f2", "sc-bdVaJa", "jsx-123", "emotion-0", "svelte-1xyz", "ng-star-inserted", "_3xQz1", "Button_primary__3xQz1"] {
            assert!(is_vendor_scoped(token), "{token}");
        }
        for token in ["gallery-item", "_private", "card__title"] {
            assert!(!is_vendor_scoped(token), "{token}");
        }
    }

    #[test]
    fn test_default_policy_attributes() {
        let policy = DefaultPolicy::new();
        assert!(policy.is_acceptable_attribute("data-testid", "submit"));
        assert!(policy.is_acceptable_attribute("name", "email"));
        assert!(!policy.is_acceptable_attribute("onclick", "go()"));
        assert!(!policy.is_acceptable_attribute("style", "color: red"));
        assert!(!policy.is_acceptable_attribute("href", "/home"));
        assert!(!policy.is_acceptable_attribute("data-reactid", "a3f9c2e1"));
        assert!(!policy.is_acceptable_attribute("title", &"x".repeat(101)));

        let policy = policy.with_attribute("href").block_attribute("data-testid");
        assert!(policy.is_acceptable_attribute("href", "/home"));
        assert!(!policy.is_acceptable_attribute("data-testid", "submit"));
    }

    #[test]
    fn test_numeric_ids() {
        let lenient = DefaultPolicy::new();
        let strict = DefaultPolicy::new().reject_numeric_ids(true);
        assert!(lenient.is_acceptable_identifier("thumb-42"));
        assert!(!strict.is_acceptable_identifier("thumb-42"));
        assert!(strict.is_acceptable_identifier("thumbnail"));
        assert_ne!(lenient.fingerprint(), strict.fingerprint());
    }

    #[test]
    fn test_length_caps() {
        let policy = DefaultPolicy::new();
        assert!(policy.is_acceptable_class(&"a".repeat(64)));
        assert!(!policy.is_acceptable_class(&"a".repeat(65)));
        assert!(!policy.is_acceptable_class(""));
    }
}
