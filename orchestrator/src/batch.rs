//! Offline embedding and auto-tag backfill.
//!
//! Scans corpus rows that have no embedding yet, and for each one computes
//! the embedding, asks the generation gateway for classification tags, and
//! writes both back. Runs row by row: one failed row is retried once, then
//! logged and skipped, so a single bad row cannot sink the batch. Re-running
//! the job only touches rows still missing an embedding.

use futures::TryStreamExt;
use serde_json::json;
use tracing::{error, warn};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::PipelineError;
use crate::gateways::{EmbeddingGateway, GenerationGateway};
use crate::index::vector_literal;
use crate::models::ChatMessage;

const PENDING_ROWS_SQL: &str = r#"
SELECT id, content
FROM vectors
WHERE embedding IS NULL
ORDER BY created_at
"#;

const UPDATE_ROW_SQL: &str = r#"
UPDATE vectors
SET embedding = $1::vector,
    metadata = metadata || jsonb_build_object('tags', $2)
WHERE id = $3
"#;

#[derive(Debug, Default)]
pub struct BackfillReport {
    pub scanned: usize,
    pub updated: usize,
    pub failed: usize,
}

#[derive(Debug, sqlx::FromRow)]
struct PendingRow {
    id: Uuid,
    content: String,
}

pub async fn run(
    pool: &DbPool,
    embeddings: &dyn EmbeddingGateway,
    generation: &dyn GenerationGateway,
) -> Result<BackfillReport, PipelineError> {
    let mut rows = sqlx::query_as::<_, PendingRow>(PENDING_ROWS_SQL).fetch(pool);
    let mut report = BackfillReport::default();

    while let Some(row) = rows.try_next().await? {
        report.scanned += 1;

        let mut attempts = 0;
        loop {
            attempts += 1;
            match backfill_row(pool, embeddings, generation, &row).await {
                Ok(()) => {
                    report.updated += 1;
                    break;
                }
                Err(e) if attempts == 1 => {
                    warn!("Retrying row {}: {}", row.id, e);
                }
                Err(e) => {
                    error!("Skipping row {}: {}", row.id, e);
                    report.failed += 1;
                    break;
                }
            }
        }
    }

    Ok(report)
}

async fn backfill_row(
    pool: &DbPool,
    embeddings: &dyn EmbeddingGateway,
    generation: &dyn GenerationGateway,
    row: &PendingRow,
) -> Result<(), PipelineError> {
    let embedding = embeddings.embed(&row.content).await?;
    let tags = generate_tags(generation, &row.content).await?;

    sqlx::query(UPDATE_ROW_SQL)
        .bind(vector_literal(&embedding))
        .bind(json!(tags))
        .bind(row.id)
        .execute(pool)
        .await?;

    Ok(())
}

async fn generate_tags(
    generation: &dyn GenerationGateway,
    content: &str,
) -> Result<Vec<String>, PipelineError> {
    let raw = generation
        .generate(&[ChatMessage::user(tag_prompt(content))])
        .await?;
    Ok(parse_tags(&raw))
}

fn tag_prompt(content: &str) -> String {
    format!(
        "Analyze the following course description and generate 3-5 relevant tags.\n\
         Tags should be concise, relevant, and useful for categorization.\n\n\
         Course Description: \"{content}\"\n\n\
         Output only a JSON array of tags, like this:\n\
         [\"AI\", \"Machine Learning\", \"Programming\"]"
    )
}

/// Model output that is not a JSON string array degrades to no tags rather
/// than failing the row.
fn parse_tags(raw: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<String>>(raw.trim()) {
        Ok(tags) => tags,
        Err(e) => {
            warn!("Could not parse tags from model output: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_tag_array_is_parsed() {
        let tags = parse_tags(r#"["AI", "Machine Learning", "Programming"]"#);
        assert_eq!(tags, vec!["AI", "Machine Learning", "Programming"]);
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        let tags = parse_tags("\n  [\"Databases\"]  \n");
        assert_eq!(tags, vec!["Databases"]);
    }

    #[test]
    fn prose_output_degrades_to_no_tags() {
        assert!(parse_tags("Here are your tags: AI, ML").is_empty());
    }

    #[test]
    fn non_array_json_degrades_to_no_tags() {
        assert!(parse_tags(r#"{"tags": ["AI"]}"#).is_empty());
    }

    #[test]
    fn prompt_embeds_the_row_content() {
        let prompt = tag_prompt("Intro to Rust");
        assert!(prompt.contains("Course Description: \"Intro to Rust\""));
        assert!(prompt.contains("JSON array"));
    }
}
