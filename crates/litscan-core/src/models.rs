//! Persisted entities. Names follow the conceptual data model; storage
//! details (surrogate ids, FK columns) live in `litscan-db`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Started,
    Success,
    Error,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Success | JobStatus::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Started => "started",
            JobStatus::Success => "success",
            JobStatus::Error => "error",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(JobStatus::Pending),
            "started" => Some(JobStatus::Started),
            "success" => Some(JobStatus::Success),
            "error" => Some(JobStatus::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ConsumerStatus {
    Available,
    Busy,
    Error,
}

impl ConsumerStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ConsumerStatus::Available => "available",
            ConsumerStatus::Busy => "busy",
            ConsumerStatus::Error => "error",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "available" => Some(ConsumerStatus::Available),
            "busy" => Some(ConsumerStatus::Busy),
            "error" => Some(ConsumerStatus::Error),
            _ => None,
        }
    }
}

/// One submission; the identity under which the search for references runs.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Job {
    pub job_id: String,
    pub display_id: String,
    pub query: Option<String>,
    pub search_limit: Option<i64>,
    pub status: JobStatus,
    pub submitted: DateTime<Utc>,
    pub finished: Option<DateTime<Utc>>,
    pub hit_count: Option<i64>,
}

/// A single consumer process. Self-owned: only the worker holding `ip`
/// ever writes its row.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Consumer {
    pub ip: String,
    pub port: String,
    pub status: ConsumerStatus,
    pub job_id: Option<String>,
}

/// An article discovered in the literature corpus. Immutable once inserted
/// except for `retracted` and the classifier-written fields.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Article {
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
    pub retracted: bool,
    pub rna_related: Option<bool>,
    pub probability: Option<f64>,
}

/// A section bucket assigned to a body sentence (or `Abstract` for sentences
/// stored separately from the body tree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SectionBucket {
    Intro,
    Results,
    Discussion,
    Conclusion,
    Method,
    Other,
    Abstract,
}

impl SectionBucket {
    pub fn as_str(self) -> &'static str {
        match self {
            SectionBucket::Intro => "intro",
            SectionBucket::Results => "results",
            SectionBucket::Discussion => "discussion",
            SectionBucket::Conclusion => "conclusion",
            SectionBucket::Method => "method",
            SectionBucket::Other => "other",
            SectionBucket::Abstract => "abstract",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "intro" => Some(SectionBucket::Intro),
            "results" => Some(SectionBucket::Results),
            "discussion" => Some(SectionBucket::Discussion),
            "conclusion" => Some(SectionBucket::Conclusion),
            "method" => Some(SectionBucket::Method),
            "other" => Some(SectionBucket::Other),
            "abstract" => Some(SectionBucket::Abstract),
            _ => None,
        }
    }
}

/// One (Article, Job) hit. Unique on `(pmcid, job_id)`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ResultRow {
    pub id: i64,
    pub pmcid: String,
    pub job_id: String,
    pub id_in_title: bool,
    pub id_in_abstract: bool,
    pub id_in_body: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AbstractSentence {
    pub result_id: i64,
    pub sentence: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct BodySentence {
    pub result_id: i64,
    pub sentence: String,
    pub location: SectionBucket,
}

/// Links a Job to an external dataset, optionally as a child of a primary
/// identifier. Unique on `(name, job_id, primary_id)`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Metadata {
    pub name: String,
    pub job_id: String,
    pub primary_id: Option<String>,
}

/// Projection returned by `GET /api/results/{job_id}`: one Result joined
/// with its Article and ordered sentence children.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ResultView {
    pub job_id: String,
    pub pmcid: String,
    pub title: String,
    pub author: String,
    pub pmid: String,
    pub doi: String,
    pub year: Option<i32>,
    pub journal: String,
    pub score: i32,
    pub cited_by: i32,
    pub retracted: bool,
    pub id_in_title: bool,
    pub id_in_abstract: bool,
    pub id_in_body: bool,
    pub abstract_sentence: Vec<String>,
    pub body_sentence: Vec<BodySentenceView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct BodySentenceView {
    pub location: String,
    pub sentence: String,
}

/// One row of `GET /api/hit_count`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct HitCountRow {
    pub urs: String,
    pub hit_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_status_round_trips_through_str() {
        for s in [JobStatus::Pending, JobStatus::Started, JobStatus::Success, JobStatus::Error] {
            assert_eq!(JobStatus::from_str(s.as_str()), Some(s));
        }
    }

    #[test]
    fn terminal_statuses_are_success_and_error() {
        assert!(JobStatus::Success.is_terminal());
        assert!(JobStatus::Error.is_terminal());
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Started.is_terminal());
    }

    #[test]
    fn consumer_status_round_trips_through_str() {
        for s in [ConsumerStatus::Available, ConsumerStatus::Busy, ConsumerStatus::Error] {
            assert_eq!(ConsumerStatus::from_str(s.as_str()), Some(s));
        }
    }

    #[test]
    fn section_bucket_round_trips_through_str() {
        for b in [
            SectionBucket::Intro,
            SectionBucket::Results,
            SectionBucket::Discussion,
            SectionBucket::Conclusion,
            SectionBucket::Method,
            SectionBucket::Other,
            SectionBucket::Abstract,
        ] {
            assert_eq!(SectionBucket::from_str(b.as_str()), Some(b));
        }
    }
}
