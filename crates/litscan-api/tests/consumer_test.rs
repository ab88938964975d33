//! Integration tests against a real Postgres instance and a wiremock
//! stand-in for Europe PMC, following the `wiremock`-based pattern used
//! for backend clients elsewhere in this codebase. Requires
//! `DATABASE_URL` (or the default `litscan_test` database) to be
//! reachable; run with `cargo test --features test-fixtures -- --ignored`.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use litscan_api::consumer::{router, AppState};
use litscan_core::ConsumerStatus;
use litscan_db::test_fixtures::TestDatabase;
use litscan_epmc::EpmcClient;
use litscan_jobs::{ConsumerConfig, ConsumerWorker};
use serde_json::json;
use tower::ServiceExt;
use wiremock::MockServer;

async fn app(db: &TestDatabase, epmc_uri: String) -> (axum::Router, Arc<ConsumerWorker>) {
    let worker = Arc::new(ConsumerWorker::new(
        Arc::new(db.store.clone()),
        EpmcClient::new(epmc_uri),
        ConsumerConfig {
            ip: "127.0.0.1".to_string(),
            port: "9000".to_string(),
            registration_refresh: Duration::from_secs(3600),
            rate_limit_sleep: Duration::from_millis(0),
        },
    ));
    let handle = ConsumerWorker::start(worker.clone()).await.unwrap();
    // Leak the handle for the test's lifetime; the process exits at test end.
    std::mem::forget(handle);
    (router(AppState { worker: worker.clone() }), worker)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
#[ignore]
async fn submit_job_registers_consumer_and_marks_job_started() {
    let db = TestDatabase::new().await;
    let epmc_server = MockServer::start().await;
    let (app, _worker) = app(&db, epmc_server.uri()).await;

    let job_id = db.store.save_job("UCA1", None, None).await.unwrap();

    let request = Request::post("/submit-job")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "job_id": job_id }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let consumers = db.store.find_available_consumers().await.unwrap();
    assert!(consumers.iter().any(|c| c.ip == "127.0.0.1" && c.status == ConsumerStatus::Busy));

    let job = db.store.get_job(&job_id).await.unwrap().unwrap();
    assert_eq!(job.status, litscan_core::JobStatus::Started);
}

#[tokio::test]
#[ignore]
async fn submit_job_rejects_missing_job_id() {
    let db = TestDatabase::new().await;
    let epmc_server = MockServer::start().await;
    let (app, _worker) = app(&db, epmc_server.uri()).await;

    let request = Request::post("/submit-job")
        .header("content-type", "application/json")
        .body(Body::from(json!({}).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert!(body["Error"].as_str().unwrap().contains("job_id is required"));
}

/// An unknown `job_id` is still accepted synchronously (the status
/// update is a no-op `UPDATE ... WHERE job_id = $1`, and nonexistence is
/// only discovered once the spawned job body calls `get_job`), so this
/// endpoint never 404s on a bad identifier the way `get_results` can.
#[tokio::test]
#[ignore]
async fn submit_job_accepts_unknown_job_id_synchronously() {
    let db = TestDatabase::new().await;
    let epmc_server = MockServer::start().await;
    let (app, _worker) = app(&db, epmc_server.uri()).await;

    let request = Request::post("/submit-job")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "job_id": "no-such-job" }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
#[ignore]
async fn health_reports_ok() {
    let db = TestDatabase::new().await;
    let epmc_server = MockServer::start().await;
    let (app, _worker) = app(&db, epmc_server.uri()).await;

    let response = app.oneshot(Request::get("/health").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}
