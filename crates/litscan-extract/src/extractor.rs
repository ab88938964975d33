//! The Article Extractor: a pure function from raw full-text XML plus a
//! job identifier to either `None` (skip) or a structured hit record.

use crate::{avoid_set, metadata, regex_util, section, sentence, xml_tree};
use litscan_core::SectionBucket;
use regex::Regex;

#[derive(Debug, Clone)]
pub struct ExtractedArticle {
    pub title: String,
    pub author: String,
    pub pmid: String,
    pub doi: String,
    pub journal: String,
    pub article_type: String,
    pub year: Option<i32>,
    pub score: i32,
    pub id_in_title: bool,
    pub id_in_abstract: bool,
    pub id_in_body: bool,
    pub abstract_sentences: Vec<String>,
    pub body_sentences: Vec<(SectionBucket, String)>,
}

const MIN_BODY_SENTENCE_TOKENS: usize = 3;

/// Returns `None` when the article should produce no Result at all: the
/// identifier never appears, the article has no title, or the article
/// is not in English.
pub fn extract(raw_xml: &[u8], identifier: &str, job_id: &str) -> Option<ExtractedArticle> {
    let raw_xml = String::from_utf8_lossy(raw_xml);
    let raw_xml = raw_xml.as_ref();
    let identifier_re = regex_util::identifier_regex(identifier);

    if !regex_util::pre_screen(raw_xml, &identifier_re) {
        return None;
    }

    let sanitized = regex_util::sanitize(raw_xml);
    let root = xml_tree::parse_document(&sanitized).ok()?;

    if metadata::has_translated_title(&root) {
        return None;
    }

    let title = root
        .find_path("front/article-meta/title-group/article-title")
        .map(|n| n.text_content().trim().to_string())?;
    if title.is_empty() {
        return None;
    }

    let parsed_meta = metadata::parse(&root)?;

    let id_in_title = identifier_re.is_match(&title.to_lowercase());

    let abstract_sentences = extract_abstract_sentences(&root, &identifier_re);
    let mut body_sentences = extract_body_sentences(&root, &identifier_re);

    let id_in_abstract = !abstract_sentences.is_empty();
    let mut id_in_body = body_sentences.iter().any(|(_, sentences)| !sentences.is_empty());

    if !id_in_abstract && !id_in_body {
        id_in_body = true;
        body_sentences
            .entry(SectionBucket::Other)
            .or_default()
            .push(format!("{job_id} found in an image, table or supplementary material"));
    }

    let score = abstract_sentences.len() as i32
        + body_sentences.values().map(|v| v.len() as i32).sum::<i32>();

    let body_sentences: Vec<(SectionBucket, String)> = body_sentences
        .into_iter()
        .flat_map(|(bucket, sentences)| sentences.into_iter().map(move |s| (bucket, s)))
        .collect();

    Some(ExtractedArticle {
        title,
        author: parsed_meta.author,
        pmid: parsed_meta.pmid,
        doi: parsed_meta.doi,
        journal: parsed_meta.journal,
        article_type: parsed_meta.article_type,
        year: parsed_meta.year,
        score,
        id_in_title,
        id_in_abstract,
        id_in_body,
        abstract_sentences,
        body_sentences,
    })
}

fn extract_abstract_sentences(root: &xml_tree::Node, identifier_re: &Regex) -> Vec<String> {
    let Some(text) = metadata::parse_abstract(root) else {
        return Vec::new();
    };
    sentence::tokenize(&text)
        .into_iter()
        .filter(|s| identifier_re.is_match(&s.to_lowercase()))
        .collect()
}

fn extract_body_sentences(
    root: &xml_tree::Node,
    identifier_re: &Regex,
) -> std::collections::HashMap<SectionBucket, Vec<String>> {
    let mut buckets: std::collections::HashMap<SectionBucket, Vec<String>> = std::collections::HashMap::new();

    let Some(body) = root.child_named("body") else {
        return buckets;
    };

    for sec in body.children_named("sec") {
        let title = sec.child_named("title").map(|n| n.text_content());
        let bucket = section::bucket_for_title(title.as_deref());

        let paragraph_text = collect_section_paragraphs(sec);
        if paragraph_text.trim().is_empty() {
            continue;
        }

        let sentences = sentence::tokenize(&paragraph_text);
        let hits = select_flanked_hits(&sentences, identifier_re);
        if !hits.is_empty() {
            buckets.entry(bucket).or_default().extend(hits);
        }
    }

    buckets
}

/// Concatenates text from every `<p>` descendant of `sec`, excluding
/// avoid-set elements, discarding single-token paragraphs.
fn collect_section_paragraphs(sec: &xml_tree::Node) -> String {
    let mut paragraphs = Vec::new();
    let mut nodes = Vec::new();
    sec.find_all("p", &mut nodes);
    for p in nodes {
        let text = p.collect_text(&|tag| avoid_set::is_avoided(tag));
        let collapsed = collapse_whitespace(&text);
        if collapsed.split_whitespace().count() > 1 {
            paragraphs.push(collapsed);
        }
    }
    paragraphs.join(" ")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// For each sentence matching the identifier with more than
/// `MIN_BODY_SENTENCE_TOKENS` tokens, emit it flanked by its immediate
/// predecessor and successor (when present) as one context window.
fn select_flanked_hits(sentences: &[String], identifier_re: &Regex) -> Vec<String> {
    let mut hits = Vec::new();
    for (i, s) in sentences.iter().enumerate() {
        let token_count = s.split_whitespace().count();
        if token_count <= MIN_BODY_SENTENCE_TOKENS {
            continue;
        }
        if !identifier_re.is_match(&s.to_lowercase()) {
            continue;
        }
        let mut window = Vec::new();
        if i > 0 {
            window.push(sentences[i - 1].as_str());
        }
        window.push(s.as_str());
        if i + 1 < sentences.len() {
            window.push(sentences[i + 1].as_str());
        }
        hits.push(window.join(" "));
    }
    hits
}
