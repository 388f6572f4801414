use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use warp::Filter;

use rag_orchestrator::config::Config;
use rag_orchestrator::gateways::{OpenAiEmbeddings, OpenAiGeneration};
use rag_orchestrator::index::PgVectorIndex;
use rag_orchestrator::pipeline::{QueryPipeline, RetrievalConfig};
use rag_orchestrator::{api, db, error, middleware};

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

    info!("Starting RAG query orchestrator");

    let db_pool = db::create_pool(&config.database_url).await?;
    info!("Database connection pool created");

    sqlx::migrate!("./migrations").run(&db_pool).await?;
    info!("Database migrations applied");

    let api_key = config
        .openai_api_key
        .clone()
        .ok_or_else(|| anyhow::anyhow!("OPENAI_API_KEY must be set"))?;
    let timeout = Duration::from_secs(config.gateway_timeout_secs);

    let embeddings = Arc::new(OpenAiEmbeddings::new(
        api_key.clone(),
        config.embedding_model.clone(),
        config.openai_base_url.clone(),
        timeout,
    )?);
    let generation = Arc::new(OpenAiGeneration::new(
        api_key,
        config.chat_model.clone(),
        config.openai_base_url.clone(),
        timeout,
    )?);
    let index = Arc::new(PgVectorIndex::new(db_pool.clone()));

    let pipeline = Arc::new(QueryPipeline::new(
        index,
        embeddings,
        generation,
        RetrievalConfig::from(&config),
    ));

    // Build API routes
    let api_routes = api::routes(pipeline)
        .with(warp::log("api"))
        .with(middleware::cors())
        .recover(error::handle_rejection);

    // Health check route
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::json(&serde_json::json!({"status": "healthy"})));

    // Metrics route
    let metrics = warp::path("metrics").and(warp::get()).map(|| {
        use prometheus::{Encoder, TextEncoder};
        let encoder = TextEncoder::new();
        let metric_families = prometheus::gather();
        let mut buffer = vec![];
        encoder.encode(&metric_families, &mut buffer).unwrap();
        warp::reply::with_header(buffer, "Content-Type", encoder.format_type())
    });

    let routes = health.or(metrics).or(api_routes);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let (bound, server) = warp::serve(routes).bind_with_graceful_shutdown(addr, async {
        tokio::signal::ctrl_c().await.ok();
    });
    info!("Server listening on {}", bound);

    server.await;

    db_pool.close().await;
    info!("Shutdown complete");

    Ok(())
}
