//! Consumer RPC surface: the single `/submit-job` endpoint a Producer
//! dispatches to, plus a liveness probe.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use litscan_jobs::ConsumerWorker;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};
use utoipa::{OpenApi, ToSchema};

use crate::error::ApiError;
use crate::extract::ApiJson;

#[derive(Clone)]
pub struct AppState {
    pub worker: Arc<ConsumerWorker>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitJobRequest {
    pub job_id: Option<String>,
}

#[utoipa::path(
    post,
    path = "/submit-job",
    request_body = SubmitJobRequest,
    responses(
        (status = 201, description = "Job accepted for processing"),
        (status = 400, description = "Malformed body"),
    )
)]
#[instrument(skip(state, body))]
async fn submit_job(State(state): State<AppState>, ApiJson(body): ApiJson<SubmitJobRequest>) -> Result<axum::http::StatusCode, ApiError> {
    let job_id = body.job_id.filter(|s| !s.is_empty()).ok_or_else(|| ApiError::Validation("job_id is required".to_string()))?;

    if let Err(e) = state.worker.submit_job(job_id).await {
        warn!(error = %e, "failed to accept job");
        return Err(e.into());
    }

    Ok(axum::http::StatusCode::CREATED)
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Liveness probe"))
)]
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[derive(OpenApi)]
#[openapi(paths(submit_job, health), components(schemas(SubmitJobRequest)))]
pub struct ApiDoc;

pub fn router(state: AppState) -> Router {
    Router::new().route("/submit-job", post(submit_job)).route("/health", get(health)).with_state(state)
}
