//! Producer HTTP surface: job submission and read-only result/statistics
//! endpoints, all backed by the shared `Store`.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use litscan_core::{HitCountRow, ResultView};
use litscan_db::store::Store;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::{OpenApi, ToSchema};

use crate::error::ApiError;
use crate::extract::ApiJson;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitJobRequest {
    pub id: Option<String>,
    pub query: Option<String>,
    pub search_limit: Option<i64>,
    pub rescan: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitJobResponse {
    pub job_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MultipleJobsRequest {
    pub job_id: Option<Vec<String>>,
    pub job_list: Option<Vec<String>>,
    pub primary_id: Option<String>,
    pub id: Option<String>,
    pub database: Option<String>,
    pub query: Option<String>,
    pub search_limit: Option<i64>,
    pub rescan: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MultipleJobsResponse {
    pub job_id: Vec<String>,
    pub name: String,
    pub primary_id: Option<String>,
}

const DEFAULT_DATABASE: &str = "uninformed";

/// Validates `rescan`, when present, is a JSON boolean; returns it or a
/// validation error. Absent is treated as `false`.
fn validate_rescan(value: &Option<serde_json::Value>) -> Result<bool, ApiError> {
    match value {
        None => Ok(false),
        Some(serde_json::Value::Bool(b)) => Ok(*b),
        Some(_) => Err(ApiError::Validation("rescan must be a boolean".to_string())),
    }
}

/// Looks the identifier up; if absent, saves a new pending Job; if
/// present and `rescan`, wipes derived rows and re-queues it; otherwise
/// returns the existing job_id unchanged.
async fn upsert_job(
    store: &Arc<dyn Store>,
    display_id: &str,
    query: Option<&str>,
    search_limit: Option<i64>,
    rescan: bool,
) -> Result<String, ApiError> {
    match store.search_performed(display_id).await? {
        Some(job_id) => {
            if rescan {
                store.reset_job_for_rescan(&job_id).await?;
            }
            Ok(job_id)
        }
        None => Ok(store.save_job(display_id, query, search_limit).await?),
    }
}

#[utoipa::path(
    post,
    path = "/api/submit-job",
    request_body = SubmitJobRequest,
    responses(
        (status = 201, description = "Job accepted", body = SubmitJobResponse),
        (status = 400, description = "Validation error"),
    )
)]
#[instrument(skip(state, body))]
async fn submit_job(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SubmitJobRequest>,
) -> Result<(axum::http::StatusCode, Json<SubmitJobResponse>), ApiError> {
    let id = body.id.filter(|s| !s.is_empty()).ok_or_else(|| ApiError::Validation("id is required".to_string()))?;
    let rescan = validate_rescan(&body.rescan)?;

    let job_id = upsert_job(&state.store, &id, body.query.as_deref(), body.search_limit, rescan).await?;

    Ok((axum::http::StatusCode::CREATED, Json(SubmitJobResponse { job_id })))
}

#[utoipa::path(
    post,
    path = "/api/multiple-jobs",
    request_body = MultipleJobsRequest,
    responses(
        (status = 201, description = "Jobs accepted", body = MultipleJobsResponse),
        (status = 400, description = "Validation error"),
    )
)]
#[instrument(skip(state, body))]
async fn multiple_jobs(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<MultipleJobsRequest>,
) -> Result<(axum::http::StatusCode, Json<MultipleJobsResponse>), ApiError> {
    let children = body.job_id.or(body.job_list).unwrap_or_default();
    let primary = body.primary_id.or(body.id);

    if children.is_empty() && primary.is_none() {
        return Err(ApiError::Validation("you must submit job_id/job_list and/or id".to_string()));
    }

    let rescan = validate_rescan(&body.rescan)?;
    let database = body.database.map(|d| d.to_lowercase()).unwrap_or_else(|| DEFAULT_DATABASE.to_string());

    let mut job_ids = Vec::with_capacity(children.len());
    for child in &children {
        let job_id = upsert_job(&state.store, child, body.query.as_deref(), body.search_limit, rescan).await?;
        job_ids.push(job_id);
    }

    let primary_id = match primary {
        Some(p) => Some(upsert_job(&state.store, &p, body.query.as_deref(), body.search_limit, rescan).await?),
        None => None,
    };

    let mut metadata = Vec::new();
    for job_id in &job_ids {
        if !state.store.search_metadata(job_id, &database, primary_id.as_deref()).await? {
            metadata.push(litscan_core::Metadata {
                name: database.clone(),
                job_id: job_id.clone(),
                primary_id: primary_id.clone(),
            });
        }
    }
    if let Some(primary_id) = &primary_id {
        if !state.store.search_metadata(primary_id, &database, None).await? {
            metadata.push(litscan_core::Metadata { name: database.clone(), job_id: primary_id.clone(), primary_id: None });
        }
    }
    if !metadata.is_empty() {
        state.store.save_metadata(&metadata).await?;
    }

    Ok((axum::http::StatusCode::CREATED, Json(MultipleJobsResponse { job_id: job_ids, name: database, primary_id })))
}

#[utoipa::path(
    get,
    path = "/api/results/{job_id}",
    responses((status = 200, description = "Ordered results for the job", body = [ResultView])),
    params(("job_id" = String, Path, description = "Case-insensitive job identifier"))
)]
#[instrument(skip(state))]
async fn get_results(State(state): State<AppState>, Path(job_id): Path<String>) -> Result<Json<Vec<ResultView>>, ApiError> {
    let normalized = job_id.to_lowercase();
    Ok(Json(state.store.results_for_job(&normalized).await?))
}

#[utoipa::path(
    get,
    path = "/api/hit_count",
    responses((status = 200, description = "Aggregated hit counts per RNAcentral urs", body = [HitCountRow]))
)]
#[instrument(skip(state))]
async fn hit_count(State(state): State<AppState>) -> Result<Json<Vec<HitCountRow>>, ApiError> {
    Ok(Json(state.store.aggregate_hit_counts().await?))
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Liveness probe"))
)]
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[derive(OpenApi)]
#[openapi(
    paths(submit_job, multiple_jobs, get_results, hit_count, health),
    components(schemas(
        SubmitJobRequest, SubmitJobResponse, MultipleJobsRequest, MultipleJobsResponse,
        ResultView, litscan_core::BodySentenceView, HitCountRow,
    ))
)]
pub struct ApiDoc;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/submit-job", post(submit_job))
        .route("/api/multiple-jobs", post(multiple_jobs))
        .route("/api/results/:job_id", get(get_results))
        .route("/api/hit_count", get(hit_count))
        .route("/api/health", get(health))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rescan_defaults_absent_to_false() {
        assert!(!validate_rescan(&None).unwrap());
    }

    #[test]
    fn validate_rescan_accepts_bool() {
        assert!(validate_rescan(&Some(serde_json::json!(true))).unwrap());
        assert!(!validate_rescan(&Some(serde_json::json!(false))).unwrap());
    }

    #[test]
    fn validate_rescan_rejects_non_bool() {
        assert!(validate_rescan(&Some(serde_json::json!("yes"))).is_err());
        assert!(validate_rescan(&Some(serde_json::json!(1))).is_err());
    }
}
