//! A minimal owned DOM, built once per article so the extractor can do
//! `front/article-meta/...`-style path navigation instead of re-scanning
//! the event stream for every lookup.

use litscan_core::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;

#[derive(Debug, Clone)]
pub struct Node {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Child>,
}

#[derive(Debug, Clone)]
pub enum Child {
    Element(Node),
    Text(String),
}

impl Node {
    /// Local name, ignoring any namespace prefix (`mml:math` -> `math`).
    pub fn local_name(&self) -> &str {
        local_name(&self.tag)
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Direct element children named `name` (local-name match).
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children.iter().filter_map(move |c| match c {
            Child::Element(n) if n.local_name() == name => Some(n),
            _ => None,
        })
    }

    pub fn child_named(&self, name: &str) -> Option<&Node> {
        self.children_named(name).next()
    }

    /// Navigates a `/`-separated path of local names from this node.
    pub fn find_path(&self, path: &str) -> Option<&Node> {
        let mut current = self;
        for part in path.split('/') {
            current = current.child_named(part)?;
        }
        Some(current)
    }

    /// All descendant elements (any depth) named `name`, document order.
    pub fn find_all<'a>(&'a self, name: &'a str, out: &mut Vec<&'a Node>) {
        for child in &self.children {
            if let Child::Element(n) = child {
                if n.local_name() == name {
                    out.push(n);
                }
                n.find_all(name, out);
            }
        }
    }

    /// Concatenates all descendant text in document order, skipping any
    /// element whose local name satisfies `is_avoided`.
    pub fn collect_text(&self, is_avoided: &dyn Fn(&str) -> bool) -> String {
        let mut out = String::new();
        self.collect_text_into(is_avoided, &mut out);
        out
    }

    fn collect_text_into(&self, is_avoided: &dyn Fn(&str) -> bool, out: &mut String) {
        for child in &self.children {
            match child {
                Child::Text(t) => out.push_str(t),
                Child::Element(n) => {
                    if !is_avoided(n.local_name()) {
                        n.collect_text_into(is_avoided, out);
                    }
                }
            }
        }
    }

    /// Concatenates all descendant text with no exclusions, used for title
    /// and other elements with no avoid-set applied.
    pub fn text_content(&self) -> String {
        self.collect_text(&|_| false)
    }
}

pub fn local_name(tag: &str) -> &str {
    tag.rsplit_once(':').map(|(_, n)| n).unwrap_or(tag)
}

/// Parses a full document and returns its root element, tolerating a
/// leading XML declaration/doctype/comments.
pub fn parse_document(xml: &str) -> Result<Node> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                let attrs = parse_attrs(&start, &reader);
                return parse_element(&mut reader, tag, attrs);
            }
            Ok(Event::Empty(start)) => {
                let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                let attrs = parse_attrs(&start, &reader);
                return Ok(Node { tag, attrs, children: Vec::new() });
            }
            Ok(Event::Eof) => return Err(Error::Parse("empty or malformed XML document".to_string())),
            Ok(_) => continue,
            Err(e) => return Err(Error::Parse(e.to_string())),
        }
    }
}

fn parse_element(reader: &mut Reader<&[u8]>, tag: String, attrs: Vec<(String, String)>) -> Result<Node> {
    let mut children = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                let child_tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                let child_attrs = parse_attrs(&start, reader);
                let child = parse_element(reader, child_tag, child_attrs)?;
                children.push(Child::Element(child));
            }
            Ok(Event::Empty(start)) => {
                let child_tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                let child_attrs = parse_attrs(&start, reader);
                children.push(Child::Element(Node { tag: child_tag, attrs: child_attrs, children: Vec::new() }));
            }
            Ok(Event::Text(text)) => {
                if let Ok(decoded) = text.unescape() {
                    children.push(Child::Text(decoded.into_owned()));
                }
            }
            Ok(Event::CData(cdata)) => {
                children.push(Child::Text(String::from_utf8_lossy(cdata.as_ref()).into_owned()));
            }
            Ok(Event::End(_)) | Ok(Event::Eof) => break,
            Ok(_) => continue,
            Err(_) => break,
        }
    }

    Ok(Node { tag, attrs, children })
}

fn parse_attrs(start: &quick_xml::events::BytesStart, reader: &Reader<&[u8]>) -> Vec<(String, String)> {
    start
        .attributes()
        .filter_map(|a| a.ok())
        .map(|a| {
            let key = String::from_utf8_lossy(a.key.as_ref()).into_owned();
            let value = a
                .decode_and_unescape_value(reader.decoder())
                .map(|v| v.into_owned())
                .unwrap_or_default();
            (key, value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_elements_and_text() {
        let xml = r#"<article><front><article-meta><title-group>
            <article-title>UCA1:4 is a lncRNA</article-title>
        </title-group></article-meta></front></article>"#;
        let root = parse_document(xml).unwrap();
        assert_eq!(root.local_name(), "article");
        let title = root.find_path("front/article-meta/title-group/article-title").unwrap();
        assert_eq!(title.text_content().trim(), "UCA1:4 is a lncRNA");
    }

    #[test]
    fn find_all_collects_every_matching_descendant_in_order() {
        let xml = r#"<body><sec><p>one</p></sec><sec><p>two</p></sec></body>"#;
        let root = parse_document(xml).unwrap();
        let mut secs = Vec::new();
        root.find_all("sec", &mut secs);
        assert_eq!(secs.len(), 2);
    }

    #[test]
    fn collect_text_skips_avoided_elements() {
        let xml = r#"<p>keep <xref>drop</xref> also keep</p>"#;
        let root = parse_document(xml).unwrap();
        let text = root.collect_text(&|tag| tag == "xref");
        assert_eq!(text, "keep  also keep");
    }

    #[test]
    fn local_name_strips_namespace_prefix() {
        assert_eq!(local_name("mml:math"), "math");
        assert_eq!(local_name("p"), "p");
    }
}
