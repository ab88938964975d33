//! Regex construction and the two text-level passes (pre-screen,
//! sanitization) that run before the document is parsed into a tree.

use crate::avoid_set::sanitize_tags;
use regex::{Regex, RegexBuilder};

/// Strips every tag from raw XML/HTML, leaving flat text. Used only for
/// the pre-screen pass, never for anything that needs a structured tree.
static TAG_REGEX: once_cell::sync::Lazy<Regex> =
    once_cell::sync::Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Builds the word-boundary-delimited, case-insensitive regex used both
/// to pre-screen the raw document and to test individual sentences.
///
/// Left delimiter: start of string, whitespace, `(`, `"`, `'`, left
/// curly quote, `;`. Right delimiter: end of string, whitespace, `.`,
/// `,`, `:`, `;`, `?`, `'`, `"`, right curly quote, `/`, `)`.
pub fn identifier_regex(identifier: &str) -> Regex {
    let escaped = regex::escape(identifier);
    let pattern = format!(
        r#"(?:^|[\s("'\u{{201C}};]){escaped}(?:$|[\s.,:;?'"\u{{201D}}/)])"#,
        escaped = escaped
    );
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .expect("identifier regex is always well-formed once the identifier is escaped")
}

/// Flattens tags and tests whether the identifier occurs anywhere in the
/// raw document at all, before paying for a full XML parse.
pub fn pre_screen(raw_xml: &str, identifier_re: &Regex) -> bool {
    let flat = TAG_REGEX.replace_all(raw_xml, " ");
    identifier_re.is_match(&flat)
}

/// Drops whole element bodies (tag name plus content) for elements whose
/// content is never eligible body text: figures, tables and
/// supplementary material blocks, including their captions.
pub fn sanitize(raw_xml: &str) -> String {
    let mut text = raw_xml.to_string();
    for tag in sanitize_tags() {
        let pattern = format!(r"(?is)<{tag}(?:\s[^>]*)?>.*?</{tag}>", tag = regex::escape(tag));
        let re = Regex::new(&pattern).expect("sanitize pattern is built from a fixed tag list");
        text = re.replace_all(&text, "").into_owned();
    }
    text
}
