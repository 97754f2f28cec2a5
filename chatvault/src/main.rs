mod config;
mod retention;

use chatvault_core::SlackClient;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::RetentionConfig;
use crate::retention::pipeline::RetentionPipeline;

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,chatvault=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging();
    info!("starting");

    let config = RetentionConfig::from_env()?;
    let client = SlackClient::new(config.token.clone())?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let pipeline = RetentionPipeline::new(
        client,
        config.archive_root.clone(),
        config.retention_days,
        config.page_size,
    );
    let report = pipeline.run(&cancel).await?;
    info!(
        listed = report.listed,
        archived = report.archived,
        skipped = report.skipped,
        deleted = report.deleted,
        archive_failures = report.archive_failures,
        delete_failures = report.delete_failures,
        "retention run complete"
    );
    Ok(())
}
