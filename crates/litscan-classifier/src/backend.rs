//! The classifier itself is treated as a pluggable backend behind a
//! small trait, never an in-process model.

use async_trait::async_trait;
use litscan_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub rna_related: bool,
    pub probability: f64,
}

#[async_trait]
pub trait ClassifierBackend: Send + Sync {
    async fn classify(&self, cleaned_abstract: &str) -> Result<Classification>;
}

/// Thin `reqwest` wrapper around a fixed scoring endpoint, reached once
/// per article, with no retry logic of its own (the batch pass owns
/// the fixed-backoff retry policy).
pub struct HttpClassifier {
    http: reqwest::Client,
    url: String,
}

impl HttpClassifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self { http: reqwest::Client::new(), url: url.into() }
    }
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    text: &'a str,
}

#[async_trait]
impl ClassifierBackend for HttpClassifier {
    async fn classify(&self, cleaned_abstract: &str) -> Result<Classification> {
        let response = self
            .http
            .post(&self.url)
            .json(&ClassifyRequest { text: cleaned_abstract })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Connection(format!("classifier backend returned {}", response.status())));
        }

        response.json::<Classification>().await.map_err(Error::from)
    }
}

/// Deterministic test double: returns a fixed classification, or can be
/// configured to fail a set number of times before succeeding, to drive
/// the fetch-retry behavior of the batch pass.
pub struct MockClassifier {
    fixed: Classification,
    remaining_failures: Arc<Mutex<u32>>,
}

impl MockClassifier {
    pub fn new(fixed: Classification) -> Self {
        Self { fixed, remaining_failures: Arc::new(Mutex::new(0)) }
    }

    pub fn failing_first(fixed: Classification, failures: u32) -> Self {
        Self { fixed, remaining_failures: Arc::new(Mutex::new(failures)) }
    }
}

#[async_trait]
impl ClassifierBackend for MockClassifier {
    async fn classify(&self, _cleaned_abstract: &str) -> Result<Classification> {
        let mut remaining = self.remaining_failures.lock().unwrap();
        if *remaining > 0 {
            *remaining -= 1;
            return Err(Error::Connection("mock classifier configured to fail".to_string()));
        }
        Ok(self.fixed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_classifier_returns_fixed_result() {
        let backend = MockClassifier::new(Classification { rna_related: true, probability: 0.91 });
        let result = backend.classify("some text").await.unwrap();
        assert_eq!(result, Classification { rna_related: true, probability: 0.91 });
    }

    #[tokio::test]
    async fn mock_classifier_fails_configured_number_of_times() {
        let backend = MockClassifier::failing_first(Classification { rna_related: false, probability: 0.1 }, 2);
        assert!(backend.classify("x").await.is_err());
        assert!(backend.classify("x").await.is_err());
        assert!(backend.classify("x").await.is_ok());
    }
}
