use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, Rejection, Reply};

use crate::pipeline::QueryPipeline;

mod query;

pub fn routes(
    pipeline: Arc<QueryPipeline>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let api = warp::path("api").and(warp::path("v1"));

    api.and(warp::path("query"))
        .and(warp::post())
        .and(warp::body::json())
        .and(with_pipeline(pipeline))
        .and_then(query::handle_query)
}

fn with_pipeline(
    pipeline: Arc<QueryPipeline>,
) -> impl Filter<Extract = (Arc<QueryPipeline>,), Error = Infallible> + Clone {
    warp::any().map(move || pipeline.clone())
}
