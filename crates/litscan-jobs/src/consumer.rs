//! Consumer Worker: owns one Consumer row, runs at most one job body at
//! a time, and keeps its registration alive with a cancellable
//! background task.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use litscan_core::{ConsumerStatus, JobStatus, Result};
use litscan_db::store::{NewAbstractSentence, NewArticle, NewBodySentence, Store};
use litscan_epmc::EpmcClient;
use tokio::sync::{broadcast, mpsc};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub enum ConsumerEvent {
    ConsumerStarted,
    JobStarted { job_id: String },
    JobCompleted { job_id: String, hit_count: i64 },
    JobFailed { job_id: String, error: String },
    ConsumerStopped,
}

pub struct ConsumerHandle {
    shutdown_tx: mpsc::Sender<()>,
    event_rx: broadcast::Receiver<ConsumerEvent>,
}

impl ConsumerHandle {
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }

    pub fn events(&self) -> broadcast::Receiver<ConsumerEvent> {
        self.event_rx.resubscribe()
    }
}

#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    pub ip: String,
    pub port: String,
    pub registration_refresh: Duration,
    pub rate_limit_sleep: Duration,
}

pub struct ConsumerWorker {
    store: Arc<dyn Store>,
    epmc: EpmcClient,
    config: ConsumerConfig,
    event_tx: broadcast::Sender<ConsumerEvent>,
}

impl ConsumerWorker {
    pub fn new(store: Arc<dyn Store>, epmc: EpmcClient, config: ConsumerConfig) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { store, epmc, config, event_tx }
    }

    pub fn events(&self) -> broadcast::Receiver<ConsumerEvent> {
        self.event_tx.subscribe()
    }

    /// Registers this consumer, spawns the registration-refresh task,
    /// and returns a handle. Takes `Arc<Self>` rather than `Self` so the
    /// caller keeps a handle to call `submit_job` from the RPC endpoint
    /// after the registration loop is running.
    pub async fn start(worker: Arc<Self>) -> Result<ConsumerHandle> {
        worker.store.register_consumer(&worker.config.ip, &worker.config.port).await?;

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
        let event_rx = worker.event_tx.subscribe();
        let _ = worker.event_tx.send(ConsumerEvent::ConsumerStarted);

        let refresh_worker = worker.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!(ip = %refresh_worker.config.ip, "consumer registration refresh task stopping");
                        break;
                    }
                    _ = sleep(refresh_worker.config.registration_refresh) => {
                        if let Err(e) = refresh_worker.store.register_consumer(&refresh_worker.config.ip, &refresh_worker.config.port).await {
                            warn!(error = %e, "failed to refresh consumer registration");
                        }
                    }
                }
            }
            let _ = refresh_worker.event_tx.send(ConsumerEvent::ConsumerStopped);
        });

        Ok(ConsumerHandle { shutdown_tx, event_rx })
    }

    /// `POST /submit-job` handler body: accepts the job, transitions
    /// state, and spawns the job body without awaiting it.
    pub async fn submit_job(self: &Arc<Self>, job_id: String) -> Result<()> {
        self.store.set_consumer(&self.config.ip, ConsumerStatus::Busy, Some(&job_id)).await?;
        self.store.set_job_status(&job_id, JobStatus::Started).await?;
        let last_search = self.store.get_job(&job_id).await?.and_then(|j| j.finished);

        let _ = self.event_tx.send(ConsumerEvent::JobStarted { job_id: job_id.clone() });

        let worker = self.clone();
        tokio::spawn(async move {
            worker.run_job_body(job_id, last_search).await;
        });

        Ok(())
    }

    #[instrument(skip(self, last_search), fields(job_id = %job_id))]
    async fn run_job_body(&self, job_id: String, last_search: Option<DateTime<Utc>>) {
        match self.seek_references(&job_id, last_search).await {
            Ok(hit_count) => {
                let _ = self.event_tx.send(ConsumerEvent::JobCompleted { job_id: job_id.clone(), hit_count });
            }
            Err(e) => {
                // The job row stays `started`; no automatic error transition.
                error!(error = %e, job_id = %job_id, "job body failed, job left in started state");
                let _ = self.event_tx.send(ConsumerEvent::JobFailed { job_id: job_id.clone(), error: e.to_string() });
                return;
            }
        }

        if let Err(e) = self.store.set_consumer(&self.config.ip, ConsumerStatus::Available, None).await {
            error!(error = %e, "failed to release consumer back to available");
        }
    }

    /// Implements the job body: search, incremental de-dup, per-article
    /// extraction and persistence, hit-count accumulation.
    async fn seek_references(&self, job_id: &str, last_search: Option<DateTime<Utc>>) -> Result<i64> {
        let (query, search_limit) = self.store.get_query_and_limit(job_id).await?;
        let search_limit = search_limit.unwrap_or(litscan_core::defaults::DEFAULT_SEARCH_LIMIT);

        let job = self.store.get_job(job_id).await?.ok_or_else(|| {
            litscan_core::Error::NotFound(format!("job {job_id} not found"))
        })?;
        let identifier = job.display_id;
        let query_filter = strip_identifier(query.as_deref(), &identifier);

        let mut pmcids: Vec<(String, i64)> = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor: Option<String> = None;

        loop {
            let Some(page) = self
                .epmc
                .search(&identifier, query_filter.as_deref(), last_search, cursor.as_deref())
                .await
            else {
                break;
            };

            for hit in page.hits {
                if seen.insert(hit.pmcid.clone()) {
                    pmcids.push((hit.pmcid, hit.cited_by));
                }
                if pmcids.len() as i64 >= search_limit {
                    break;
                }
            }

            match page.next_cursor {
                Some(next) if (pmcids.len() as i64) < search_limit => cursor = Some(next),
                _ => break,
            }
        }

        let is_incremental = last_search.is_some() && !pmcids.is_empty();
        if is_incremental {
            let existing: HashSet<String> = self.store.get_pmcid_in_result(job_id).await?.into_iter().collect();
            pmcids.retain(|(pmcid, _)| !existing.contains(pmcid));
        }

        let mut hit_count = 0i64;

        for (pmcid, cited_by) in pmcids {
            sleep(self.config.rate_limit_sleep).await;

            let Some(xml) = self.epmc.fetch_full_text(&pmcid).await else { continue };
            let Some(extracted) = litscan_extract::extract(&xml, &identifier, job_id) else { continue };

            if self.store.get_pmcid(&pmcid).await?.is_none() {
                self.store
                    .save_article(&NewArticle {
                        pmcid: pmcid.clone(),
                        title: extracted.title.clone(),
                        abstract_text: extracted.abstract_sentences.join(" "),
                        author: extracted.author.clone(),
                        pmid: extracted.pmid.clone(),
                        doi: extracted.doi.clone(),
                        journal: extracted.journal.clone(),
                        article_type: extracted.article_type.clone(),
                        year: extracted.year,
                        score: extracted.score,
                        cited_by: cited_by as i32,
                    })
                    .await?;
            }

            let Some(result_id) = self
                .store
                .save_result(&pmcid, job_id, extracted.id_in_title, extracted.id_in_abstract, extracted.id_in_body)
                .await?
            else {
                continue;
            };

            if !extracted.abstract_sentences.is_empty() {
                let batch: Vec<NewAbstractSentence> = extracted
                    .abstract_sentences
                    .iter()
                    .map(|s| NewAbstractSentence { result_id, sentence: s.clone() })
                    .collect();
                self.store.save_abstract_sentences(&batch).await?;
            }

            if !extracted.body_sentences.is_empty() {
                let batch: Vec<NewBodySentence> = extracted
                    .body_sentences
                    .iter()
                    .map(|(location, sentence)| NewBodySentence { result_id, sentence: sentence.clone(), location: *location })
                    .collect();
                self.store.save_body_sentences(&batch).await?;
            }

            hit_count += 1;
        }

        if is_incremental {
            if let Some(prior) = self.store.get_hit_count(job_id).await? {
                hit_count += prior;
            }
        }

        self.store.save_hit_count(job_id, hit_count).await?;
        self.store.set_job_status(job_id, JobStatus::Success).await?;

        Ok(hit_count)
    }
}

/// Removes a quoted occurrence of `identifier` from `query`, since the
/// literature query already contains the identifier separately.
fn strip_identifier(query: Option<&str>, identifier: &str) -> Option<String> {
    let query = query?;
    let quoted = format!("\"{identifier}\"");
    let without = query.replace(quoted.as_str(), "").replace(identifier, "");
    let cleaned = without
        .trim()
        .trim_start_matches("AND")
        .trim_end_matches("AND")
        .trim()
        .to_string();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_identifier_removes_quoted_occurrence() {
        let stripped = strip_identifier(Some("\"UCA1\" AND homo sapiens"), "UCA1");
        assert_eq!(stripped.as_deref(), Some("homo sapiens"));
    }

    #[test]
    fn strip_identifier_handles_bare_query() {
        assert_eq!(strip_identifier(None, "UCA1"), None);
        assert_eq!(strip_identifier(Some("\"UCA1\""), "UCA1"), None);
    }
}
