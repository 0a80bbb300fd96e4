//! CSS serialization helpers
//!
//! Thin wrappers over cssparser's serializers, so any string (including ones
//! starting with a digit or containing `:` or spaces) can be embedded in
//! `#id` / `.class` selectors and parsed back unchanged.

use cssparser::{serialize_identifier, serialize_string};

/// Escape `input` for use as a CSS identifier
pub fn escape_identifier(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    // writing to a String never fails
    let _ = serialize_identifier(input, &mut out);
    out
}

/// Serialize `input` as a double-quoted CSS string, quotes included
pub fn escape_string(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 2);
    let _ = serialize_string(input, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_identifiers_untouched() {
        assert_eq!(escape_identifier("gallery-item"), "gallery-item");
        assert_eq!(escape_identifier("_private"), "_private");
        assert_eq!(escape_identifier("naïve"), "naïve");
    }

    #[test]
    fn test_leading_digits() {
        assert_eq!(escape_identifier("123"), "\\31 23");
        assert_eq!(escape_identifier("-1a"), "-\\31 a");
        assert_eq!(escape_identifier("a1"), "a1");
    }

    #[test]
    fn test_special_characters() {
        assert_eq!(escape_identifier("-"), "\\-");
        assert_eq!(escape_identifier("a:b"), "a\\:b");
        assert_eq!(escape_identifier("w-1/2"), "w-1\\/2");
        assert_eq!(escape_identifier("a b"), "a\\ b");
        assert_eq!(escape_identifier("\u{1}x"), "\\1 x");
        assert_eq!(escape_identifier("a\0"), "a\u{FFFD}");
    }

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string("plain"), "\"plain\"");
        assert_eq!(escape_string("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(escape_string("back\\slash"), "\"back\\\\slash\"");
        assert_eq!(escape_string("line\nbreak"), "\"line\\a break\"");
    }
}
