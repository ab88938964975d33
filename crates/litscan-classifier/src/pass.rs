//! The paged batch relevance pass: walk non-retracted articles ordered
//! by `pmcid`, classify each cleaned abstract, and persist the result.

use std::sync::Arc;
use std::time::Duration;

use litscan_core::Result;
use litscan_db::store::Store;
use tokio::time::sleep;
use tracing::{error, warn};

use crate::backend::ClassifierBackend;
use crate::cleaning::clean;

const MAX_CLASSIFY_ATTEMPTS: u32 = litscan_core::defaults::CLASSIFIER_FETCH_MAX_ATTEMPTS;
const RETRY_BACKOFF: Duration = Duration::from_secs(litscan_core::defaults::CLASSIFIER_FETCH_BACKOFF_SECS);

#[derive(Debug, Default, Clone, Copy)]
pub struct PassSummary {
    pub classified: usize,
    pub skipped: usize,
}

/// Runs one full pass over every non-retracted article, `batch_size` at
/// a time, cursoring by `pmcid`.
pub async fn run(store: &Arc<dyn Store>, backend: &dyn ClassifierBackend, batch_size: i64) -> Result<PassSummary> {
    let mut summary = PassSummary::default();
    let mut after: Option<String> = None;

    loop {
        let batch = store.next_classifier_batch(after.as_deref(), batch_size).await?;
        if batch.is_empty() {
            break;
        }

        for article in &batch {
            let cleaned = clean(&article.abstract_text);

            match classify_with_retry(backend, &cleaned).await {
                Ok(result) => {
                    match store.update_classification(&article.pmcid, result.rna_related, result.probability).await {
                        Ok(()) => summary.classified += 1,
                        Err(e) => {
                            error!(error = %e, pmcid = %article.pmcid, "failed to persist classification");
                            summary.skipped += 1;
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, pmcid = %article.pmcid, "classifier fetch failed after retries, skipping article");
                    summary.skipped += 1;
                }
            }
        }

        after = batch.last().map(|a| a.pmcid.clone());
    }

    Ok(summary)
}

async fn classify_with_retry(
    backend: &dyn ClassifierBackend,
    cleaned_abstract: &str,
) -> Result<crate::backend::Classification> {
    let mut last_err = None;
    for attempt in 1..=MAX_CLASSIFY_ATTEMPTS {
        match backend.classify(cleaned_abstract).await {
            Ok(result) => return Ok(round_probability(result)),
            Err(e) => {
                warn!(attempt, error = %e, "classifier fetch attempt failed");
                last_err = Some(e);
                if attempt < MAX_CLASSIFY_ATTEMPTS {
                    sleep(RETRY_BACKOFF).await;
                }
            }
        }
    }
    Err(last_err.expect("loop runs at least once"))
}

fn round_probability(mut c: crate::backend::Classification) -> crate::backend::Classification {
    c.probability = (c.probability * 100.0).round() / 100.0;
    c
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Classification, MockClassifier};

    #[tokio::test(start_paused = true)]
    async fn classify_with_retry_succeeds_after_transient_failures() {
        let backend = MockClassifier::failing_first(Classification { rna_related: true, probability: 0.873 }, 2);
        let result = classify_with_retry(&backend, "text").await.unwrap();
        assert!(result.rna_related);
        assert_eq!(result.probability, 0.87);
    }

    #[tokio::test(start_paused = true)]
    async fn classify_with_retry_gives_up_after_max_attempts() {
        let backend = MockClassifier::failing_first(Classification { rna_related: false, probability: 0.0 }, 10);
        assert!(classify_with_retry(&backend, "text").await.is_err());
    }
}
