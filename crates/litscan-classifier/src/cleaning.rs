//! Abstract text cleaning before it is handed to the classifier backend.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static BRACKET_NOTE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]*\]").unwrap());
static URL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").unwrap());

/// Lowercases, strips tags/bracketed notes/URLs, and collapses
/// whitespace, in that order.
pub fn clean(abstract_text: &str) -> String {
    let lowered = abstract_text.to_lowercase();
    let no_tags = TAG_REGEX.replace_all(&lowered, " ");
    let no_brackets = BRACKET_NOTE_REGEX.replace_all(&no_tags, " ");
    let no_urls = URL_REGEX.replace_all(&no_brackets, " ");
    no_urls.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_strips_tags() {
        assert_eq!(clean("<p>UCA1 Regulates</p>"), "uca1 regulates");
    }

    #[test]
    fn strips_bracketed_notes_and_urls() {
        let input = "see details [ref 12] at https://example.com/article for more";
        assert_eq!(clean(input), "see details at for more");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(clean("a   b\n\nc"), "a b c");
    }
}
