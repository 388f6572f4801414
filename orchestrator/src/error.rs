use thiserror::Error;
use tracing::error;
use warp::{http::StatusCode, reject::Reject, Rejection, Reply};

/// Failures the query pipeline can produce, grouped by phase.
///
/// Only `EmptyQuery` is reported to the caller verbatim; everything else
/// surfaces as an opaque processing failure with detail kept in the logs.
/// An embedding failure counts as a retrieval failure, never as "no
/// evidence found": the query vector is only ever computed to drive the
/// fallback search.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Query is required")]
    EmptyQuery,

    #[error("Vector index error: {0}")]
    Index(#[from] sqlx::Error),

    #[error("Embedding gateway error: {0}")]
    Embedding(String),

    #[error("Generation gateway error: {0}")]
    Generation(String),
}

impl Reject for PipelineError {}

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Rejection> {
    if let Some(pipeline_err) = err.find::<PipelineError>() {
        let (code, message) = match pipeline_err {
            PipelineError::EmptyQuery => (StatusCode::BAD_REQUEST, pipeline_err.to_string()),
            other => {
                error!("Query processing failed: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error processing request".to_string(),
                )
            }
        };

        let json = warp::reply::json(&serde_json::json!({ "error": message }));
        Ok(warp::reply::with_status(json, code))
    } else {
        Err(err)
    }
}
