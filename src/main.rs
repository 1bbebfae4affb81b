use anyhow::Result;
use tracing_subscriber::EnvFilter;

use studytrack_api::config::AppConfig;
use studytrack_api::server;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("[Main] Starting StudyTrack API on {}", config.bind_addr);
    server::serve(config).await
}
