//! The Consumer process: registers itself, serves `/submit-job`, and runs
//! at most one job body at a time.

use std::sync::Arc;

use litscan_api::consumer::{router, ApiDoc, AppState};
use litscan_core::config::ServerConfig;
use litscan_epmc::EpmcClient;
use litscan_jobs::ConsumerWorker;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let _logging_guard = litscan_core::logging::init();

    let database_url = litscan_core::config::database_url();
    let pg_store = litscan_db::connect(&database_url).await?;
    if litscan_core::config::should_migrate() {
        pg_store.migrate().await?;
    }
    let store: Arc<dyn litscan_db::Store> = Arc::new(pg_store);

    let server_config = ServerConfig::from_env_with_default_port(8081);
    let epmc_config = litscan_core::config::EpmcConfig::from_env();
    let consumer_config = litscan_core::config::ConsumerConfig::from_env();

    let epmc = EpmcClient::new(epmc_config.base_url);
    let worker = Arc::new(ConsumerWorker::new(
        store,
        epmc,
        litscan_jobs::ConsumerConfig {
            ip: litscan_core::config::consumer_advertised_ip(),
            port: server_config.port.to_string(),
            registration_refresh: consumer_config.registration_refresh,
            rate_limit_sleep: consumer_config.rate_limit_sleep,
        },
    ));

    let mut events = worker.events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            info!(?event, "consumer worker event");
        }
    });
    let worker_handle = ConsumerWorker::start(worker.clone()).await?;

    let app = litscan_api::middleware::with_ambient_layers(
        router(AppState { worker }).merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi())),
    );

    let addr = server_config.bind_addr();
    info!(%addr, "starting consumer");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    worker_handle.shutdown().await;
    Ok(())
}
