//! Search access to the `vectors` corpus table.
//!
//! Both search paths return distances in `score`, ascending = more relevant:
//! the content search normalizes trigram similarity to `1 - similarity` and
//! the embedding search uses pgvector cosine distance directly, so results
//! from the two paths rank on one convention.

use async_trait::async_trait;

use crate::db::DbPool;
use crate::error::PipelineError;
use crate::models::ScoredDocument;

/// Nearest-neighbor access to the corpus, by coarse content match or by
/// query vector.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Coarse lexical search: substring filter ranked by lexical distance.
    async fn search_content(
        &self,
        query: &str,
        limit: usize,
        max_distance: f32,
    ) -> Result<Vec<ScoredDocument>, PipelineError>;

    /// Pure nearest-neighbor search by embedding, bounded by cosine distance.
    async fn search_embedding(
        &self,
        embedding: &[f32],
        limit: usize,
        max_distance: f32,
    ) -> Result<Vec<ScoredDocument>, PipelineError>;
}

const CONTENT_SEARCH_SQL: &str = r#"
SELECT id, content, metadata, (1 - similarity(content, $1))::float4 AS score
FROM vectors
WHERE content ILIKE '%' || $1 || '%'
  AND (1 - similarity(content, $1)) <= $2
ORDER BY score
LIMIT $3
"#;

const EMBEDDING_SEARCH_SQL: &str = r#"
SELECT id, content, metadata, (embedding <=> $1::vector)::float4 AS score
FROM vectors
WHERE embedding IS NOT NULL
  AND (embedding <=> $1::vector) <= $2
ORDER BY score
LIMIT $3
"#;

pub struct PgVectorIndex {
    pool: DbPool,
}

impl PgVectorIndex {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VectorIndex for PgVectorIndex {
    async fn search_content(
        &self,
        query: &str,
        limit: usize,
        max_distance: f32,
    ) -> Result<Vec<ScoredDocument>, PipelineError> {
        let rows = sqlx::query_as::<_, ScoredDocument>(CONTENT_SEARCH_SQL)
            .bind(query)
            .bind(max_distance)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn search_embedding(
        &self,
        embedding: &[f32],
        limit: usize,
        max_distance: f32,
    ) -> Result<Vec<ScoredDocument>, PipelineError> {
        let rows = sqlx::query_as::<_, ScoredDocument>(EMBEDDING_SEARCH_SQL)
            .bind(vector_literal(embedding))
            .bind(max_distance)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }
}

/// pgvector input literal for a query embedding; bound as text and cast
/// server-side, since the driver has no native vector type.
pub(crate) fn vector_literal(embedding: &[f32]) -> String {
    let dims: Vec<String> = embedding.iter().map(|v| v.to_string()).collect();
    format!("[{}]", dims.join(","))
}
