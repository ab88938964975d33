//! Producer Scheduler: a single background task that pairs pending jobs
//! with idle consumers and dispatches them over HTTP.

use std::sync::Arc;
use std::time::Duration;

use litscan_core::Result;
use litscan_db::store::Store;
use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tokio::time::sleep;
use tracing::{info, warn};

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub enum ProducerEvent {
    ProducerStarted,
    Tick { dispatched: usize, pending_remaining: usize },
    DispatchFailed { job_id: String, consumer_ip: String },
    ProducerStopped,
}

pub struct ProducerHandle {
    shutdown_tx: mpsc::Sender<()>,
    event_rx: broadcast::Receiver<ProducerEvent>,
}

impl ProducerHandle {
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }

    pub fn events(&self) -> broadcast::Receiver<ProducerEvent> {
        self.event_rx.resubscribe()
    }
}

#[derive(Debug, Clone)]
pub struct ProducerConfig {
    pub poll_interval: Duration,
    pub dispatch_timeout: Duration,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(litscan_core::defaults::PRODUCER_POLL_INTERVAL_MS),
            dispatch_timeout: Duration::from_secs(litscan_core::defaults::DISPATCH_TIMEOUT_SECS),
        }
    }
}

pub struct ProducerScheduler {
    store: Arc<dyn Store>,
    http: reqwest::Client,
    config: ProducerConfig,
    event_tx: broadcast::Sender<ProducerEvent>,
}

#[derive(Serialize)]
struct SubmitJobBody<'a> {
    job_id: &'a str,
}

impl ProducerScheduler {
    pub fn new(store: Arc<dyn Store>, config: ProducerConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.dispatch_timeout)
            .build()
            .expect("dispatch client configuration is static and always valid");
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { store, http, config, event_tx }
    }

    pub fn events(&self) -> broadcast::Receiver<ProducerEvent> {
        self.event_tx.subscribe()
    }

    pub fn start(self) -> ProducerHandle {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
        let event_rx = self.event_tx.subscribe();
        let scheduler = Arc::new(self);
        let _ = scheduler.event_tx.send(ProducerEvent::ProducerStarted);

        let loop_scheduler = scheduler.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("producer scheduler stopping");
                        break;
                    }
                    _ = sleep(loop_scheduler.config.poll_interval) => {
                        if let Err(e) = loop_scheduler.tick().await {
                            warn!(error = %e, "producer tick failed");
                        }
                    }
                }
            }
            let _ = loop_scheduler.event_tx.send(ProducerEvent::ProducerStopped);
        });

        ProducerHandle { shutdown_tx, event_rx }
    }

    async fn tick(&self) -> Result<()> {
        // `find_jobs_to_run` returns oldest-first; drain it front-to-back so
        // the oldest pending job pairs with an idle consumer first.
        let mut pending = self.store.find_jobs_to_run().await?.into_iter();
        let mut idle = self.store.find_available_consumers().await?;

        let mut dispatched = 0usize;
        let mut remaining = 0usize;
        while let Some(job) = pending.next() {
            let Some(consumer) = idle.pop() else {
                remaining = 1 + pending.count();
                break;
            };
            if self.dispatch(&consumer.ip, &consumer.port, &job.job_id).await {
                dispatched += 1;
            } else {
                let _ = self.event_tx.send(ProducerEvent::DispatchFailed {
                    job_id: job.job_id.clone(),
                    consumer_ip: consumer.ip.clone(),
                });
            }
        }

        let _ = self.event_tx.send(ProducerEvent::Tick { dispatched, pending_remaining: remaining });

        Ok(())
    }

    /// Single-attempt dispatch; every failure mode is logged and
    /// swallowed so the job is retried on the next tick.
    async fn dispatch(&self, ip: &str, port: &str, job_id: &str) -> bool {
        let url = format!("http://{ip}:{port}/submit-job");
        match self.http.post(&url).json(&SubmitJobBody { job_id }).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!(status = %response.status(), job_id, ip, "dispatch received a non-2xx response");
                false
            }
            Err(e) => {
                warn!(error = %e, job_id, ip, "dispatch request failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use litscan_db::test_fixtures::TestDatabase;
    use litscan_db::store::Store;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    /// With a single idle consumer and two pending jobs, the oldest
    /// pending job (by `submitted`) must be dispatched first, per P8.
    #[tokio::test]
    #[ignore]
    async fn tick_dispatches_oldest_pending_job_first() {
        let db = TestDatabase::new().await;

        let older = db.store.save_job("OLDER", None, None).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        let newer = db.store.save_job("NEWER", None, None).await.unwrap();
        assert_ne!(older, newer);

        let consumer = MockServer::start().await;
        let port = consumer.uri().rsplit(':').next().unwrap().to_string();
        db.store.register_consumer("127.0.0.1", &port).await.unwrap();

        Mock::given(method("POST"))
            .and(path("/submit-job"))
            .and(body_json(serde_json::json!({ "job_id": older })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&consumer)
            .await;

        let scheduler = ProducerScheduler::new(Arc::new(db.store.clone()), ProducerConfig::default());
        scheduler.tick().await.unwrap();

        // The mock only accepts a request carrying `older`'s job_id, with
        // exactly one expected call; it panics on drop if that expectation
        // isn't met, which is the actual assertion for this test.
        let _ = newer;
    }
}
