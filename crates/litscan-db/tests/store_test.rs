//! Integration tests against a real Postgres instance. Requires
//! `DATABASE_URL` (or the default `litscan_test` database) to be
//! reachable; run with `cargo test --features test-fixtures -- --ignored`.

#![cfg(feature = "test-fixtures")]

use litscan_core::{ConsumerStatus, JobStatus};
use litscan_db::store::{NewArticle, Store};
use litscan_db::test_fixtures::TestDatabase;

#[tokio::test]
#[ignore]
async fn save_job_normalizes_to_lowercase_and_is_found_case_insensitively() {
    let db = TestDatabase::new().await;

    let job_id = db.store.save_job("FOO", None, None).await.unwrap();
    assert_eq!(job_id, "foo");

    assert_eq!(db.store.search_performed("FOO").await.unwrap(), Some("foo".to_string()));
    assert_eq!(db.store.search_performed("foo").await.unwrap(), Some("foo".to_string()));
    assert_eq!(db.store.search_performed("Foo").await.unwrap(), Some("foo".to_string()));
}

#[tokio::test]
#[ignore]
async fn register_consumer_is_idempotent_on_duplicate_ip() {
    let db = TestDatabase::new().await;

    db.store.register_consumer("10.0.0.1", "9000").await.unwrap();
    db.store.register_consumer("10.0.0.1", "9000").await.unwrap();

    let consumers = db.store.find_available_consumers().await.unwrap();
    assert_eq!(consumers.iter().filter(|c| c.ip == "10.0.0.1").count(), 1);
}

#[tokio::test]
#[ignore]
async fn save_result_swallows_duplicate_pmcid_job_id() {
    let db = TestDatabase::new().await;
    let job_id = db.store.save_job("uca1:4", None, None).await.unwrap();
    db.store
        .save_article(&NewArticle {
            pmcid: "PMC1".to_string(),
            title: "t".to_string(),
            abstract_text: String::new(),
            author: String::new(),
            pmid: String::new(),
            doi: String::new(),
            journal: String::new(),
            article_type: String::new(),
            year: None,
            score: 1,
            cited_by: 0,
        })
        .await
        .unwrap();

    let first = db.store.save_result("PMC1", &job_id, true, false, false).await.unwrap();
    let second = db.store.save_result("PMC1", &job_id, true, false, false).await.unwrap();

    assert!(first.is_some());
    assert!(second.is_none());
}

#[tokio::test]
#[ignore]
async fn set_job_status_sets_finished_only_on_terminal_transitions() {
    let db = TestDatabase::new().await;
    let job_id = db.store.save_job("bar", None, None).await.unwrap();

    db.store.set_job_status(&job_id, JobStatus::Started).await.unwrap();
    let job = db.store.get_job(&job_id).await.unwrap().unwrap();
    assert!(job.finished.is_none());

    db.store.set_job_status(&job_id, JobStatus::Success).await.unwrap();
    let job = db.store.get_job(&job_id).await.unwrap().unwrap();
    assert!(job.finished.is_some());
}

#[tokio::test]
#[ignore]
async fn consumer_status_and_job_id_move_together() {
    let db = TestDatabase::new().await;
    let job_id = db.store.save_job("baz", None, None).await.unwrap();
    db.store.register_consumer("10.0.0.2", "9000").await.unwrap();

    db.store.set_consumer("10.0.0.2", ConsumerStatus::Busy, Some(&job_id)).await.unwrap();
    let idle = db.store.find_available_consumers().await.unwrap();
    assert!(idle.iter().all(|c| c.ip != "10.0.0.2"));

    db.store.set_consumer("10.0.0.2", ConsumerStatus::Available, None).await.unwrap();
    let idle = db.store.find_available_consumers().await.unwrap();
    assert!(idle.iter().any(|c| c.ip == "10.0.0.2"));
}
