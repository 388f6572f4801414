use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::error::PipelineError;
use crate::gateways::EmbeddingGateway;
use crate::index::VectorIndex;
use crate::models::RetrievalResult;

/// Tuning for one retrieval pass. The two cutoffs are independent: the
/// primary pass filters on lexical distance, the fallback pass on cosine
/// distance, and the fallback cutoff is expected to be the looser one.
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub primary_max_distance: f32,
    pub fallback_max_distance: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            primary_max_distance: 0.4,
            fallback_max_distance: 0.5,
        }
    }
}

impl From<&Config> for RetrievalConfig {
    fn from(config: &Config) -> Self {
        Self {
            top_k: config.top_k,
            primary_max_distance: config.primary_max_distance,
            fallback_max_distance: config.fallback_max_distance,
        }
    }
}

/// Two-phase retrieval: a cheap content-filtered pass first, then a vector
/// nearest-neighbor pass to top up when the first pass comes back short.
/// The query is only embedded when the fallback actually runs.
pub struct Retriever {
    index: Arc<dyn VectorIndex>,
    embeddings: Arc<dyn EmbeddingGateway>,
    config: RetrievalConfig,
}

impl Retriever {
    pub fn new(
        index: Arc<dyn VectorIndex>,
        embeddings: Arc<dyn EmbeddingGateway>,
        config: RetrievalConfig,
    ) -> Self {
        Self { index, embeddings, config }
    }

    pub async fn retrieve(&self, query: &str) -> Result<RetrievalResult, PipelineError> {
        let budget = self.config.top_k;

        let mut documents = self
            .index
            .search_content(query, budget, self.config.primary_max_distance)
            .await?;

        if documents.len() < budget {
            info!(
                "Primary search returned {} of {} candidates, running vector fallback",
                documents.len(),
                budget
            );
            let embedding = self.embeddings.embed(query).await?;
            let fallback = self
                .index
                .search_embedding(&embedding, 2 * budget, self.config.fallback_max_distance)
                .await?;

            let seen: HashSet<Uuid> = documents.iter().map(|d| d.document.id).collect();
            documents.extend(
                fallback
                    .into_iter()
                    .filter(|d| !seen.contains(&d.document.id)),
            );
        }

        documents.truncate(budget);
        Ok(RetrievalResult { documents })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{scored, FakeEmbeddings, FakeIndex};
    use std::sync::atomic::Ordering;

    fn retriever(
        index: FakeIndex,
        embeddings: Arc<FakeEmbeddings>,
    ) -> Retriever {
        Retriever::new(Arc::new(index), embeddings, RetrievalConfig::default())
    }

    #[tokio::test]
    async fn full_primary_pass_never_embeds() {
        let primary: Vec<_> = (0..5).map(|i| scored(&format!("doc {i}"), 0.1)).collect();
        let embeddings = Arc::new(FakeEmbeddings::default());
        let r = retriever(FakeIndex::new(primary, vec![scored("extra", 0.2)]), embeddings.clone());

        let result = r.retrieve("Python basics").await.unwrap();

        assert_eq!(result.len(), 5);
        assert_eq!(embeddings.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn underfilled_primary_is_topped_up_in_fallback_rank_order() {
        let primary = vec![scored("lexical hit", 0.1)];
        let fallback = vec![scored("semantic a", 0.2), scored("semantic b", 0.3)];
        let embeddings = Arc::new(FakeEmbeddings::default());
        let r = retriever(FakeIndex::new(primary, fallback), embeddings.clone());

        let result = r.retrieve("query").await.unwrap();

        assert_eq!(embeddings.calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.len(), 3);
        let contents: Vec<_> = result
            .documents
            .iter()
            .map(|d| d.document.content.as_str())
            .collect();
        assert_eq!(contents, vec!["lexical hit", "semantic a", "semantic b"]);
    }

    #[tokio::test]
    async fn fallback_duplicates_are_skipped() {
        let shared = scored("both passes", 0.1);
        let primary = vec![shared.clone()];
        let fallback = vec![shared, scored("fallback only", 0.2)];
        let r = retriever(FakeIndex::new(primary, fallback), Arc::new(FakeEmbeddings::default()));

        let result = r.retrieve("query").await.unwrap();

        assert_eq!(result.len(), 2);
        let mut ids: Vec<_> = result.documents.iter().map(|d| d.document.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 2);
    }

    #[tokio::test]
    async fn merged_results_are_truncated_to_budget() {
        let primary = vec![scored("p", 0.1)];
        let fallback: Vec<_> = (0..10).map(|i| scored(&format!("f{i}"), 0.2)).collect();
        let r = retriever(FakeIndex::new(primary, fallback), Arc::new(FakeEmbeddings::default()));

        let result = r.retrieve("query").await.unwrap();

        assert_eq!(result.len(), 5);
    }

    #[tokio::test]
    async fn empty_corpus_yields_empty_result() {
        let r = retriever(FakeIndex::new(vec![], vec![]), Arc::new(FakeEmbeddings::default()));

        let result = r.retrieve("query").await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn embedding_failure_surfaces_instead_of_faking_no_evidence() {
        let embeddings = Arc::new(FakeEmbeddings::failing());
        let r = retriever(FakeIndex::new(vec![], vec![scored("x", 0.2)]), embeddings);

        let err = r.retrieve("query").await.unwrap_err();

        assert!(matches!(err, PipelineError::Embedding(_)));
    }

    #[tokio::test]
    async fn repeated_retrieval_is_deterministic() {
        let primary = vec![scored("a", 0.1), scored("b", 0.2)];
        let fallback = vec![scored("c", 0.3)];
        let r = retriever(
            FakeIndex::new(primary, fallback),
            Arc::new(FakeEmbeddings::default()),
        );

        let first = r.retrieve("query").await.unwrap();
        let second = r.retrieve("query").await.unwrap();

        let ids = |result: &RetrievalResult| {
            result
                .documents
                .iter()
                .map(|d| d.document.id)
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(&first), ids(&second));
    }
}
