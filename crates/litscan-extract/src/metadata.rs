//! Article metadata extraction from the `front/article-meta` subtree.

use crate::xml_tree::Node;

pub struct ParsedMetadata {
    pub title: String,
    pub author: String,
    pub pmid: String,
    pub doi: String,
    pub journal: String,
    pub article_type: String,
    pub year: Option<i32>,
}

/// Abstract types that never count as the article's body-searchable
/// abstract (teasers, graphical abstracts, one-line highlights summaries).
const EXCLUDED_ABSTRACT_TYPES: &[&str] =
    &["teaser", "web-summary", "summary", "precis", "graphical", "author-highlights"];

pub fn parse(root: &Node) -> Option<ParsedMetadata> {
    let article_meta = root.find_path("front/article-meta")?;

    let title = article_meta
        .find_path("title-group/article-title")
        .map(|n| n.text_content())
        .unwrap_or_default();

    let author = parse_authors(article_meta);
    let (pmid, doi) = parse_article_ids(article_meta);
    let journal = parse_journal(root);
    let article_type = normalize_article_type(root.attr("article-type").unwrap_or("unknown"));
    let year = parse_year(article_meta);

    Some(ParsedMetadata { title, author, pmid, doi, journal, article_type, year })
}

/// `research-article` -> `Research Article`.
fn normalize_article_type(raw: &str) -> String {
    raw.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_authors(article_meta: &Node) -> String {
    let Some(contrib_group) = article_meta.child_named("contrib-group") else {
        return String::new();
    };
    let mut names = Vec::new();
    for contrib in contrib_group.children_named("contrib") {
        let Some(name) = contrib.child_named("name") else { continue };
        let surname = name.child_named("surname").map(|n| n.text_content()).unwrap_or_default();
        let given = name.child_named("given-names").map(|n| n.text_content()).unwrap_or_default();
        let formatted = match (surname.trim(), given.trim()) {
            ("", "") => continue,
            (s, "") => s.to_string(),
            ("", g) => g.to_string(),
            (s, g) => format!("{s}, {g}"),
        };
        names.push(formatted);
    }
    names.join("; ")
}

fn parse_article_ids(article_meta: &Node) -> (String, String) {
    let mut pmid = String::new();
    let mut doi = String::new();
    for id_node in article_meta.children_named("article-id") {
        match id_node.attr("pub-id-type") {
            Some("pmid") => pmid = id_node.text_content(),
            Some("doi") => doi = id_node.text_content(),
            _ => {}
        }
    }
    (pmid, doi)
}

fn parse_journal(root: &Node) -> String {
    let Some(journal_meta) = root.find_path("front/journal-meta") else {
        return String::new();
    };
    for title_node in journal_meta.children_named("journal-title-group") {
        if let Some(t) = title_node.child_named("journal-title") {
            return t.text_content();
        }
    }
    journal_meta
        .child_named("journal-title")
        .map(|n| n.text_content())
        .unwrap_or_default()
}

fn parse_year(article_meta: &Node) -> Option<i32> {
    let mut by_type: Vec<(&str, &Node)> =
        article_meta.children_named("pub-date").filter_map(|n| n.attr("pub-type").map(|t| (t, n))).collect();
    by_type.sort_by_key(|(t, _)| match *t {
        "epub" => 0,
        "ppub" => 1,
        "pub" => 2,
        _ => 3,
    });
    for (_, pub_date) in &by_type {
        if let Some(year_node) = pub_date.child_named("year") {
            if let Ok(year) = year_node.text_content().trim().parse::<i32>() {
                return Some(year);
            }
        }
    }
    article_meta
        .children_named("pub-date")
        .find_map(|n| n.child_named("year"))
        .and_then(|n| n.text_content().trim().parse::<i32>().ok())
}

/// Returns the concatenated text of every qualifying `<abstract>` found
/// anywhere under `root`, or `None` if none qualify (i.e. every
/// `<abstract>` on the article is one of the excluded summary types, or
/// there are no abstracts at all).
pub fn parse_abstract(root: &Node) -> Option<String> {
    let mut abstracts = Vec::new();
    root.find_all("abstract", &mut abstracts);

    let mut sections = Vec::new();
    for abstract_node in abstracts {
        let abstract_type = abstract_node.attr("abstract-type");
        if abstract_type.map(|t| EXCLUDED_ABSTRACT_TYPES.contains(&t)).unwrap_or(false) {
            continue;
        }
        sections.push(abstract_node.collect_text(&|tag| crate::avoid_set::is_avoided(tag)));
    }

    if sections.is_empty() {
        None
    } else {
        Some(sections.join(" "))
    }
}

/// A `trans-title-group` anywhere under `title-group` marks a translated
/// (i.e. non-English-original) title, used as the language filter.
pub fn has_translated_title(root: &Node) -> bool {
    let Some(title_group) = root.find_path("front/article-meta/title-group") else {
        return false;
    };
    title_group.child_named("trans-title-group").is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml_tree::parse_document;

    fn sample_root() -> Node {
        parse_document(
            r#"<article article-type="research-article">
                <front>
                    <journal-meta><journal-title-group><journal-title>RNA Biology</journal-title></journal-title-group></journal-meta>
                    <article-meta>
                        <title-group><article-title>UCA1 in cancer</article-title></title-group>
                        <contrib-group>
                            <contrib><name><surname>Smith</surname><given-names>Jane</given-names></name></contrib>
                            <contrib><name><surname>Doe</surname><given-names>John</given-names></name></contrib>
                        </contrib-group>
                        <article-id pub-id-type="pmid">12345</article-id>
                        <article-id pub-id-type="doi">10.1234/abc</article-id>
                        <pub-date pub-type="epub"><year>2021</year></pub-date>
                        <abstract><p>UCA1 regulates growth.</p></abstract>
                    </article-meta>
                </front>
            </article>"#,
        )
        .unwrap()
    }

    #[test]
    fn parses_full_metadata() {
        let root = sample_root();
        let meta = parse(&root).unwrap();
        assert_eq!(meta.title, "UCA1 in cancer");
        assert_eq!(meta.author, "Smith, Jane; Doe, John");
        assert_eq!(meta.pmid, "12345");
        assert_eq!(meta.doi, "10.1234/abc");
        assert_eq!(meta.journal, "RNA Biology");
        assert_eq!(meta.article_type, "Research Article");
        assert_eq!(meta.year, Some(2021));
    }

    #[test]
    fn abstract_excludes_teaser_types() {
        let root = parse_document(
            r#"<article><front><article-meta>
                <abstract abstract-type="teaser"><p>teaser text</p></abstract>
            </article-meta></front></article>"#,
        )
        .unwrap();
        assert_eq!(parse_abstract(&root), None);
    }

    #[test]
    fn abstract_concatenates_every_qualifying_abstract() {
        let root = parse_document(
            r#"<article><front><article-meta>
                <abstract><p>First abstract.</p></abstract>
                <abstract abstract-type="teaser"><p>Skipped teaser.</p></abstract>
                <abstract abstract-type="short"><p>Second abstract.</p></abstract>
            </article-meta></front></article>"#,
        )
        .unwrap();
        assert_eq!(parse_abstract(&root), Some("First abstract. Second abstract.".to_string()));
    }

    #[test]
    fn abstract_is_found_nested_below_article_meta() {
        let root = parse_document(
            r#"<article><front><article-meta>
                <trans-abstract><abstract><p>Nested abstract.</p></abstract></trans-abstract>
            </article-meta></front></article>"#,
        )
        .unwrap();
        assert_eq!(parse_abstract(&root), Some("Nested abstract.".to_string()));
    }

    #[test]
    fn detects_translated_title() {
        let root = parse_document(
            r#"<article><front><article-meta><title-group>
                <article-title>x</article-title>
                <trans-title-group xml:lang="fr"><trans-title>y</trans-title></trans-title-group>
            </title-group></article-meta></front></article>"#,
        )
        .unwrap();
        assert!(has_translated_title(&root));
    }
}
