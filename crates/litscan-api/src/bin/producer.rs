//! The Producer process: submission/read HTTP API plus the background
//! scheduler that dispatches pending jobs to idle consumers.

use std::sync::Arc;

use litscan_api::producer::{router, ApiDoc, AppState};
use litscan_core::config::ServerConfig;
use litscan_jobs::ProducerScheduler;
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

    let server_config = ServerConfig::from_env_with_default_port(8080);
    let producer_config = litscan_core::config::ProducerConfig::from_env();

    let scheduler = ProducerScheduler::new(store.clone(), litscan_jobs::ProducerConfig {
        poll_interval: producer_config.poll_interval,
        dispatch_timeout: producer_config.dispatch_timeout,
    });
    let mut events = scheduler.events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            info!(?event, "producer scheduler event");
        }
    });
    let scheduler_handle = scheduler.start();

    let app = litscan_api::middleware::with_ambient_layers(
        router(AppState { store }).merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi())),
    );

    let addr = server_config.bind_addr();
    info!(%addr, "starting producer");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    scheduler_handle.shutdown().await;
    Ok(())
}
