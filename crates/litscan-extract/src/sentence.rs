//! Sentence tokenization. A naive split on `.` breaks on abbreviations
//! (`e.g.`, `Fig.`, `et al.`), decimal numbers (`P < 0.05`) and
//! parenthetical asides containing their own full stops, so this walks
//! the text once tracking those cases instead.

use once_cell::sync::Lazy;
use std::collections::HashSet;

static ABBREVIATIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "fig", "figs", "eq", "eqs", "ref", "refs", "et", "al", "e.g", "i.e", "vs", "etc", "approx",
        "no", "vol", "pp", "p", "cf", "dr", "mr", "mrs", "ms", "prof", "sp", "spp", "var", "viz",
        "ca", "inc", "co", "ltd",
    ]
    .into_iter()
    .collect()
});

/// Splits `text` into sentences, skipping sentence boundaries that fall
/// inside a decimal number, an unbalanced parenthetical, or right after
/// a known abbreviation.
pub fn tokenize(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut sentences = Vec::new();
    let mut start = 0usize;
    let mut depth = 0i32;

    for i in 0..chars.len() {
        match chars[i] {
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            '.' | '!' | '?' => {
                if depth > 0 {
                    continue;
                }
                if chars[i] == '.' && is_decimal_point(&chars, i) {
                    continue;
                }
                if chars[i] == '.' && ends_with_abbreviation(&chars, start, i) {
                    continue;
                }
                if !next_starts_new_sentence(&chars, i) {
                    continue;
                }
                let sentence: String = chars[start..=i].iter().collect();
                push_trimmed(&mut sentences, &sentence);
                start = i + 1;
            }
            _ => {}
        }
    }

    if start < chars.len() {
        let rest: String = chars[start..].iter().collect();
        push_trimmed(&mut sentences, &rest);
    }

    sentences
}

fn push_trimmed(out: &mut Vec<String>, candidate: &str) {
    let trimmed = candidate.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}

fn is_decimal_point(chars: &[char], i: usize) -> bool {
    let before = i.checked_sub(1).and_then(|j| chars.get(j));
    let after = chars.get(i + 1);
    matches!((before, after), (Some(b), Some(a)) if b.is_ascii_digit() && a.is_ascii_digit())
}

fn ends_with_abbreviation(chars: &[char], start: usize, dot_index: usize) -> bool {
    let word: String = chars[start..dot_index]
        .iter()
        .rev()
        .take_while(|c| c.is_alphanumeric() || **c == '.')
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    ABBREVIATIONS.contains(word.to_lowercase().as_str())
}

fn next_starts_new_sentence(chars: &[char], dot_index: usize) -> bool {
    let mut j = dot_index + 1;
    while j < chars.len() && chars[j].is_whitespace() {
        j += 1;
    }
    match chars.get(j) {
        None => true,
        Some(c) => c.is_uppercase() || c.is_numeric() || *c == '"' || *c == '\u{201C}',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_simple_sentences() {
        let out = tokenize("UCA1 is a lncRNA. It regulates cell growth.");
        assert_eq!(out, vec!["UCA1 is a lncRNA.", "It regulates cell growth."]);
    }

    #[test]
    fn does_not_split_on_decimal_numbers() {
        let out = tokenize("Expression increased by 2.5 fold in treated cells.");
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn does_not_split_on_known_abbreviations() {
        let out = tokenize("As shown in Fig. 2, expression was elevated.");
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn does_not_split_inside_parentheses() {
        let out = tokenize("Cells were treated (see Fig. 3 for details.) and imaged.");
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn splits_on_et_al_terminated_citation_followed_by_capital() {
        let out = tokenize("This was shown previously (Smith et al. Expression was studied.)");
        // et al. is an abbreviation, so no split occurs even before a capital.
        assert_eq!(out.len(), 1);
    }
}
