use std::time::Duration;
use tracing::info;

use rag_orchestrator::config::Config;
use rag_orchestrator::gateways::{OpenAiEmbeddings, OpenAiGeneration};
use rag_orchestrator::{batch, db};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!("Starting embedding backfill");

    let db_pool = db::create_pool(&config.database_url).await?;

    let api_key = config
        .openai_api_key
        .clone()
        .ok_or_else(|| anyhow::anyhow!("OPENAI_API_KEY must be set"))?;
    let timeout = Duration::from_secs(config.gateway_timeout_secs);

    let embeddings = OpenAiEmbeddings::new(
        api_key.clone(),
        config.embedding_model.clone(),
        config.openai_base_url.clone(),
        timeout,
    )?;
    let generation = OpenAiGeneration::new(
        api_key,
        config.chat_model.clone(),
        config.openai_base_url.clone(),
        timeout,
    )?;

    let report = batch::run(&db_pool, &embeddings, &generation).await?;
    info!(
        "Backfill complete: {} scanned, {} updated, {} failed",
        report.scanned, report.updated, report.failed
    );

    db_pool.close().await;

    Ok(())
}
