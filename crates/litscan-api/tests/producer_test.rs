//! Integration tests against a real Postgres instance, following the
//! same convention as `litscan-db`'s own store tests. Requires
//! `DATABASE_URL` (or the default `litscan_test` database) to be
//! reachable; run with `cargo test --features test-fixtures -- --ignored`.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use litscan_api::producer::{router, AppState, SubmitJobResponse};
use litscan_db::test_fixtures::TestDatabase;
use serde_json::json;
use tower::ServiceExt;

fn app(db: &TestDatabase) -> axum::Router {
    router(AppState { store: Arc::new(db.store.clone()) })
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
#[ignore]
async fn submit_job_creates_a_new_pending_job() {
    let db = TestDatabase::new().await;
    let app = app(&db);

    let request = Request::post("/api/submit-job")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "id": "UCA1" }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: SubmitJobResponse = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(body.job_id, "uca1");

    let job = db.store.get_job("uca1").await.unwrap().unwrap();
    assert_eq!(job.display_id, "UCA1");
}

#[tokio::test]
#[ignore]
async fn submit_job_rejects_missing_id() {
    let db = TestDatabase::new().await;
    let app = app(&db);

    let request = Request::post("/api/submit-job")
        .header("content-type", "application/json")
        .body(Body::from(json!({}).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert!(body["Error"].as_str().unwrap().contains("id is required"));
}

#[tokio::test]
#[ignore]
async fn submit_job_rejects_non_boolean_rescan() {
    let db = TestDatabase::new().await;
    let app = app(&db);

    let request = Request::post("/api/submit-job")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "id": "UCA1", "rescan": "yes" }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn submit_job_is_idempotent_without_rescan() {
    let db = TestDatabase::new().await;

    let first = app(&db)
        .oneshot(
            Request::post("/api/submit-job")
                .header("content-type", "application/json")
                .body(Body::from(json!({ "id": "UCA1" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let first_body: SubmitJobResponse = serde_json::from_value(body_json(first).await).unwrap();

    let second = app(&db)
        .oneshot(
            Request::post("/api/submit-job")
                .header("content-type", "application/json")
                .body(Body::from(json!({ "id": "UCA1" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let second_body: SubmitJobResponse = serde_json::from_value(body_json(second).await).unwrap();

    assert_eq!(first_body.job_id, second_body.job_id);
}

#[tokio::test]
#[ignore]
async fn multiple_jobs_defaults_database_to_uninformed_and_links_primary() {
    let db = TestDatabase::new().await;
    let app = app(&db);

    let request = Request::post("/api/multiple-jobs")
        .header("content-type", "application/json")
        .body(
            Body::from(
                json!({ "job_list": ["URS1", "URS2"], "id": "GENE1" }).to_string(),
            ),
        )
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["name"], "uninformed");
    assert_eq!(body["job_id"].as_array().unwrap().len(), 2);
    assert_eq!(body["primary_id"], "gene1");
}

#[tokio::test]
#[ignore]
async fn multiple_jobs_rejects_when_neither_children_nor_primary_given() {
    let db = TestDatabase::new().await;
    let app = app(&db);

    let request = Request::post("/api/multiple-jobs")
        .header("content-type", "application/json")
        .body(Body::from(json!({}).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn get_results_is_case_insensitive_and_empty_for_unknown_job() {
    let db = TestDatabase::new().await;
    let app = app(&db);

    let response = app
        .oneshot(Request::get("/api/results/NO-SUCH-JOB").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
#[ignore]
async fn health_reports_ok() {
    let db = TestDatabase::new().await;
    let app = app(&db);

    let response = app.oneshot(Request::get("/api/health").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}
