//! Standalone classifier pass runner: one full batch pass over
//! non-retracted articles, then exit. Intended to be invoked by an
//! external scheduler (cron, k8s CronJob), mirroring this codebase's
//! convention of shipping batch maintenance as a standalone binary
//! rather than folding it into a long-running HTTP server.

use std::sync::Arc;

use litscan_classifier::HttpClassifier;
use litscan_db::Store;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let _logging_guard = litscan_core::logging::init();

    let database_url = litscan_core::config::database_url();
    let store: Arc<dyn Store> = Arc::new(litscan_db::connect(&database_url).await?);

    let classifier_config = litscan_core::config::ClassifierConfig::from_env();
    let url = classifier_config
        .url
        .ok_or_else(|| anyhow::anyhow!("CLASSIFIER_URL must be set to run the classifier pass"))?;
    let backend = HttpClassifier::new(url);

    let summary = litscan_classifier::run(&store, &backend, classifier_config.batch_size).await?;
    info!(classified = summary.classified, skipped = summary.skipped, "classifier pass complete");

    Ok(())
}
