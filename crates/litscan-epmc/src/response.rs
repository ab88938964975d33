//! Streaming parse of a Europe PMC search response:
//! `resultList/result/{pmcid, citedByCount}` and `nextCursorMark`.

use crate::client::{SearchHit, SearchPage};
use quick_xml::events::Event;
use quick_xml::name::QName;
use quick_xml::Reader;

pub fn parse_search_response(xml_bytes: &[u8]) -> Option<SearchPage> {
    let text = std::str::from_utf8(xml_bytes).ok()?;
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut hits = Vec::new();
    let mut next_cursor = None;

    let mut in_result = false;
    let mut in_next_cursor_mark = false;
    let mut current_tag = String::new();
    let mut current_pmcid: Option<String> = None;
    let mut current_cited_by: Option<i64> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                let name = local_name(&start.name());
                match name.as_str() {
                    "result" => {
                        in_result = true;
                        current_pmcid = None;
                        current_cited_by = None;
                    }
                    "nextCursorMark" => in_next_cursor_mark = true,
                    _ => {}
                }
                current_tag = name;
            }
            Ok(Event::Text(text_event)) => {
                let text = text_event.unescape().ok()?.into_owned();
                if in_result {
                    match current_tag.as_str() {
                        "pmcid" => current_pmcid = Some(text.trim().to_string()),
                        "citedByCount" => current_cited_by = text.trim().parse::<i64>().ok(),
                        _ => {}
                    }
                } else if in_next_cursor_mark {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        next_cursor = Some(trimmed.to_string());
                    }
                }
            }
            Ok(Event::End(end)) => {
                let name = local_name(&end.name());
                if name == "result" {
                    in_result = false;
                    if let (Some(pmcid), Some(cited_by)) = (current_pmcid.take(), current_cited_by.take()) {
                        hits.push(SearchHit { pmcid, cited_by });
                    }
                }
                if name == "nextCursorMark" {
                    in_next_cursor_mark = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => return None,
            _ => {}
        }
    }

    Some(SearchPage { hits, next_cursor })
}

fn local_name(qname: &QName) -> String {
    let raw = std::str::from_utf8(qname.as_ref()).unwrap_or("");
    raw.rsplit_once(':').map(|(_, n)| n).unwrap_or(raw).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<responseWrapper>
        <resultList>
            <result><pmcid>PMC1</pmcid><citedByCount>4</citedByCount></result>
            <result><pmcid>PMC2</pmcid><citedByCount>0</citedByCount></result>
        </resultList>
        <nextCursorMark>AAB</nextCursorMark>
    </responseWrapper>"#;

    #[test]
    fn parses_results_and_next_cursor() {
        let page = parse_search_response(SAMPLE.as_bytes()).unwrap();
        assert_eq!(page.hits.len(), 2);
        assert_eq!(page.hits[0], SearchHit { pmcid: "PMC1".to_string(), cited_by: 4 });
        assert_eq!(page.next_cursor, Some("AAB".to_string()));
    }

    #[test]
    fn skips_results_missing_pmcid_or_cited_by_count() {
        let xml = r#"<responseWrapper><resultList>
            <result><pmcid>PMC1</pmcid></result>
            <result><citedByCount>2</citedByCount></result>
            <result><pmcid>PMC3</pmcid><citedByCount>9</citedByCount></result>
        </resultList></responseWrapper>"#;
        let page = parse_search_response(xml.as_bytes()).unwrap();
        assert_eq!(page.hits, vec![SearchHit { pmcid: "PMC3".to_string(), cited_by: 9 }]);
    }

    #[test]
    fn absent_next_cursor_mark_is_none() {
        let xml = r#"<responseWrapper><resultList>
            <result><pmcid>PMC1</pmcid><citedByCount>1</citedByCount></result>
        </resultList></responseWrapper>"#;
        let page = parse_search_response(xml.as_bytes()).unwrap();
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn invalid_utf8_yields_none() {
        assert!(parse_search_response(&[0xff, 0xfe, 0xfd]).is_none());
    }
}
