use std::sync::Arc;
use tracing::info;
use warp::{Rejection, Reply};

use crate::error::PipelineError;
use crate::models::QueryRequest;
use crate::pipeline::QueryPipeline;

pub async fn handle_query(
    request: QueryRequest,
    pipeline: Arc<QueryPipeline>,
) -> Result<impl Reply, Rejection> {
    if request.query.trim().is_empty() {
        return Err(warp::reject::custom(PipelineError::EmptyQuery));
    }

    info!("Processing query: {}", request.query);

    let envelope = pipeline
        .answer(&request.query)
        .await
        .map_err(warp::reject::custom)?;

    info!("Response source: {}", envelope.source);
    Ok(warp::reply::json(&envelope))
}
