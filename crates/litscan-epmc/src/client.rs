//! Thin `reqwest` wrapper around the Europe PMC REST API: literature
//! search (cursor-paged) and full-text XML retrieval.

use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::warn;

use crate::response::parse_search_response;

const DEFAULT_BASE_URL: &str = "https://www.ebi.ac.uk/europepmc/webservices/rest";
const PAGE_SIZE: u32 = 500;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub pmcid: String,
    pub cited_by: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub hits: Vec<SearchHit>,
    pub next_cursor: Option<String>,
}

/// Constructed once per process and cloned cheaply into each job
/// iteration; `reqwest::Client` is an `Arc` internally.
#[derive(Clone)]
pub struct EpmcClient {
    http: reqwest::Client,
    base_url: String,
}

impl EpmcClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client configuration is static and always valid");
        Self { http, base_url: base_url.into() }
    }

    pub fn from_env() -> Self {
        let base_url = std::env::var("EUROPE_PMC").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    /// Pages through `resultList/result` entries. Returns `None` on any
    /// transport or parse failure; the caller treats that as "nothing
    /// more to do this tick," not a hard error.
    pub async fn search(
        &self,
        identifier: &str,
        query_filter: Option<&str>,
        since_date: Option<DateTime<Utc>>,
        cursor: Option<&str>,
    ) -> Option<SearchPage> {
        let query = build_query(identifier, query_filter, since_date);
        let cursor_mark = cursor.unwrap_or("*");

        let response = self
            .http
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("query", query.as_str()),
                ("format", "xml"),
                ("pageSize", &PAGE_SIZE.to_string()),
                ("cursorMark", cursor_mark),
                ("sort", "P_PDATE_D asc"),
            ])
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "Europe PMC search request failed");
                return None;
            }
        };

        let bytes = match response.bytes().await {
            Ok(b) => b,
            Err(e) => {
                warn!(error = %e, "failed reading Europe PMC search response body");
                return None;
            }
        };

        match parse_search_response(&bytes) {
            Some(page) => Some(page),
            None => {
                warn!("failed to parse Europe PMC search response XML");
                None
            }
        }
    }

    /// Returns the raw full-text JATS XML for `pmcid`, or `None` if the
    /// article is missing or the response could not be read.
    pub async fn fetch_full_text(&self, pmcid: &str) -> Option<Vec<u8>> {
        let response = self
            .http
            .get(format!("{}/{pmcid}/fullTextXML", self.base_url))
            .send()
            .await;

        let response = match response {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                warn!(status = %r.status(), pmcid, "Europe PMC full-text fetch returned a non-success status");
                return None;
            }
            Err(e) => {
                warn!(error = %e, pmcid, "Europe PMC full-text fetch request failed");
                return None;
            }
        };

        match response.bytes().await {
            Ok(bytes) => Some(bytes.to_vec()),
            Err(e) => {
                warn!(error = %e, pmcid, "failed reading Europe PMC full-text response body");
                None
            }
        }
    }
}

fn build_query(identifier: &str, query_filter: Option<&str>, since_date: Option<DateTime<Utc>>) -> String {
    let mut query = format!("(\"{identifier}\"");
    if let Some(filter) = query_filter {
        if !filter.trim().is_empty() {
            query.push_str(" AND ");
            query.push_str(filter);
        }
    }
    query.push_str(" AND IN_EPMC:Y AND OPEN_ACCESS:Y AND NOT SRC:PPR");
    if let Some(since) = since_date {
        query.push_str(&format!(" AND (FIRST_PDATE:[{} TO today])", since.format("%Y-%m-%d")));
    }
    query.push(')');
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn builds_minimal_query_with_no_filter_or_date() {
        let q = build_query("UCA1", None, None);
        assert_eq!(q, "(\"UCA1\" AND IN_EPMC:Y AND OPEN_ACCESS:Y AND NOT SRC:PPR)");
    }

    #[test]
    fn builds_query_with_filter_and_since_date() {
        let since = Utc.with_ymd_and_hms(2022, 1, 15, 0, 0, 0).unwrap();
        let q = build_query("UCA1", Some("RNA"), Some(since));
        assert_eq!(
            q,
            "(\"UCA1\" AND RNA AND IN_EPMC:Y AND OPEN_ACCESS:Y AND NOT SRC:PPR AND (FIRST_PDATE:[2022-01-15 TO today]))"
        );
    }
}
