//! The `Store` trait: the single shared mutable resource every component
//! coordinates through. No in-memory dispatcher registry exists anywhere
//! in this codebase — every decision is derived from a `Store` call.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use litscan_core::{Article, Consumer, Job, Metadata, ResultView, SectionBucket};
use litscan_core::Result;

/// One abstract sentence pending insertion, keyed by the `Result` row it
/// belongs to.
#[derive(Debug, Clone)]
pub struct NewAbstractSentence {
    pub result_id: i64,
    pub sentence: String,
}

/// One body sentence pending insertion.
#[derive(Debug, Clone)]
pub struct NewBodySentence {
    pub result_id: i64,
    pub sentence: String,
    pub location: SectionBucket,
}

/// A fully-formed Article ready to insert, as produced by the extractor
/// plus the search result's `cited_by` count.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub pmcid: String,
    pub title: String,
    pub abstract_text: String,
    pub author: String,
    pub pmid: String,
    pub doi: String,
    pub journal: String,
    pub article_type: String,
    pub year: Option<i32>,
    pub score: i32,
    pub cited_by: i32,
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Idempotent on duplicate `ip`: a consumer restarting with the same
    /// address re-registers as a no-op rather than erroring.
    async fn register_consumer(&self, ip: &str, port: &str) -> Result<()>;

    async fn set_consumer(&self, ip: &str, status: litscan_core::ConsumerStatus, job_id: Option<&str>) -> Result<()>;

    async fn find_available_consumers(&self) -> Result<Vec<Consumer>>;

    /// Returns the normalized `job_id` (lower-cased `display_id`).
    async fn save_job(&self, display_id: &str, query: Option<&str>, search_limit: Option<i64>) -> Result<String>;

    /// Case-insensitive lookup by normalized id; `value` is normalized
    /// internally so callers may pass either case.
    async fn search_performed(&self, value: &str) -> Result<Option<String>>;

    async fn set_job_status(&self, job_id: &str, status: litscan_core::JobStatus) -> Result<()>;

    async fn save_hit_count(&self, job_id: &str, hit_count: i64) -> Result<()>;

    /// The 8 oldest pending jobs, ascending by `submitted`.
    async fn find_jobs_to_run(&self) -> Result<Vec<Job>>;

    async fn get_job(&self, job_id: &str) -> Result<Option<Job>>;

    /// No-ops if the pmcid already exists.
    async fn save_article(&self, article: &NewArticle) -> Result<()>;

    /// Returns `None` if `(pmcid, job_id)` already exists (expected
    /// duplicate, swallowed rather than propagated).
    async fn save_result(
        &self,
        pmcid: &str,
        job_id: &str,
        id_in_title: bool,
        id_in_abstract: bool,
        id_in_body: bool,
    ) -> Result<Option<i64>>;

    async fn save_abstract_sentences(&self, batch: &[NewAbstractSentence]) -> Result<()>;

    async fn save_body_sentences(&self, batch: &[NewBodySentence]) -> Result<()>;

    async fn get_pmcid(&self, pmcid: &str) -> Result<Option<String>>;

    async fn get_pmcid_in_result(&self, job_id: &str) -> Result<Vec<String>>;

    /// Each entry no-ops if `(name, job_id, primary_id)` already exists.
    async fn save_metadata(&self, batch: &[Metadata]) -> Result<()>;

    async fn search_metadata(&self, job_id: &str, name: &str, primary_id: Option<&str>) -> Result<bool>;

    /// `finished` of the prior successful run, or `None` if this job has
    /// never completed.
    async fn get_search_date(&self, job_id: &str) -> Result<Option<DateTime<Utc>>>;

    async fn get_hit_count(&self, job_id: &str) -> Result<Option<i64>>;

    async fn get_query_and_limit(&self, job_id: &str) -> Result<(Option<String>, Option<i64>)>;

    /// Wipes Results/Sentences for the job, clears `hit_count`/`finished`,
    /// resets status to `pending`. The Job row itself is preserved.
    async fn reset_job_for_rescan(&self, job_id: &str) -> Result<()>;

    /// Joined Result+Article+Sentence projection for `GET /api/results/{job_id}`.
    async fn results_for_job(&self, job_id: &str) -> Result<Vec<ResultView>>;

    /// `SUM(hit_count)` grouped by `primary_id` for `name = 'rnacentral'`,
    /// restricted to `hit_count > 0`.
    async fn aggregate_hit_counts(&self) -> Result<Vec<litscan_core::HitCountRow>>;

    /// Non-retracted articles ordered by `pmcid`, paged by a `pmcid >` cursor.
    async fn next_classifier_batch(&self, after_pmcid: Option<&str>, limit: i64) -> Result<Vec<Article>>;

    async fn update_classification(&self, pmcid: &str, rna_related: bool, probability: f64) -> Result<()>;
}
