//! The retrieval-and-generation decision pipeline.
//!
//! One query flows through strictly sequential stages: retrieve (primary,
//! then fallback if under-filled), assemble grounding context, select the
//! generation mode, call the generation gateway, wrap the result in a
//! provenance-labeled envelope. The pipeline holds no per-request state and
//! performs no writes.

pub mod context;
pub mod response;
pub mod retriever;
pub mod selector;

pub use retriever::{RetrievalConfig, Retriever};

use std::sync::Arc;
use tracing::info;

use crate::error::PipelineError;
use crate::gateways::{EmbeddingGateway, GenerationGateway};
use crate::index::VectorIndex;
use crate::models::ResponseEnvelope;

pub struct QueryPipeline {
    retriever: Retriever,
    generation: Arc<dyn GenerationGateway>,
}

impl QueryPipeline {
    pub fn new(
        index: Arc<dyn VectorIndex>,
        embeddings: Arc<dyn EmbeddingGateway>,
        generation: Arc<dyn GenerationGateway>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            retriever: Retriever::new(index, embeddings, config),
            generation,
        }
    }

    pub async fn answer(&self, query: &str) -> Result<ResponseEnvelope, PipelineError> {
        let evidence = self.retriever.retrieve(query).await?;
        info!("Retrieved {} documents", evidence.len());

        let grounding = context::assemble(&evidence);
        let mode = selector::select(&evidence);
        let messages = selector::build_messages(mode, query, &grounding);

        let generated = self.generation.generate(&messages).await?;

        Ok(response::assemble(mode, generated, evidence))
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{scored, FakeEmbeddings, FakeGeneration, FakeIndex};
    use super::*;
    use crate::models::Role;
    use std::sync::atomic::Ordering;

    fn pipeline(
        index: FakeIndex,
        embeddings: Arc<FakeEmbeddings>,
        generation: Arc<FakeGeneration>,
    ) -> QueryPipeline {
        QueryPipeline::new(index_arc(index), embeddings, generation, RetrievalConfig::default())
    }

    fn index_arc(index: FakeIndex) -> Arc<dyn VectorIndex> {
        Arc::new(index)
    }

    #[tokio::test]
    async fn lexically_saturated_query_stays_grounded_without_embedding() {
        let primary: Vec<_> = (0..5).map(|i| scored(&format!("Python basics {i}"), 0.1)).collect();
        let embeddings = Arc::new(FakeEmbeddings::default());
        let generation = Arc::new(FakeGeneration::replying("Python is a language."));
        let p = pipeline(FakeIndex::new(primary, vec![]), embeddings.clone(), generation.clone());

        let envelope = p.answer("Python basics").await.unwrap();

        assert_eq!(envelope.source, "RAG");
        assert_eq!(envelope.text, "Python is a language.");
        assert_eq!(envelope.evidence.unwrap().len(), 5);
        assert_eq!(embeddings.calls.load(Ordering::SeqCst), 0);

        let seen = generation.seen_messages.lock().unwrap();
        assert_eq!(seen[0].len(), 3);
        assert_eq!(seen[0][2].role, Role::Assistant);
    }

    #[tokio::test]
    async fn semantic_only_matches_still_ground_the_answer() {
        let fallback = vec![scored("a", 0.2), scored("b", 0.3), scored("c", 0.4)];
        let p = pipeline(
            FakeIndex::new(vec![], fallback),
            Arc::new(FakeEmbeddings::default()),
            Arc::new(FakeGeneration::replying("grounded answer")),
        );

        let envelope = p.answer("lexically unrelated phrasing").await.unwrap();

        assert_eq!(envelope.source, "RAG");
        assert_eq!(envelope.evidence.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn empty_corpus_discloses_ungrounded_generation() {
        let generation = Arc::new(FakeGeneration::replying("made up answer"));
        let p = pipeline(
            FakeIndex::new(vec![], vec![]),
            Arc::new(FakeEmbeddings::default()),
            generation.clone(),
        );

        let envelope = p.answer("anything").await.unwrap();

        assert_eq!(envelope.source, "OpenAI");
        assert!(envelope.text.starts_with("[generated without RAG] "));
        assert!(envelope.evidence.is_none());

        // No system priming and no context message on the ungrounded path
        let seen = generation.seen_messages.lock().unwrap();
        assert_eq!(seen[0].len(), 1);
        assert_eq!(seen[0][0].role, Role::User);
    }

    #[tokio::test]
    async fn empty_generation_text_yields_placeholder_with_true_provenance() {
        let primary: Vec<_> = (0..5).map(|i| scored(&format!("doc {i}"), 0.1)).collect();
        let p = pipeline(
            FakeIndex::new(primary, vec![]),
            Arc::new(FakeEmbeddings::default()),
            Arc::new(FakeGeneration::replying("")),
        );

        let envelope = p.answer("query").await.unwrap();

        assert_eq!(envelope.text, "No response available.");
        assert_eq!(envelope.source, "RAG");
    }

    #[tokio::test]
    async fn generation_failure_propagates_without_fabricated_text() {
        let p = pipeline(
            FakeIndex::new(vec![scored("doc", 0.1)], vec![]),
            Arc::new(FakeEmbeddings::default()),
            Arc::new(FakeGeneration::failing()),
        );

        let err = p.answer("query").await.unwrap_err();

        assert!(matches!(err, PipelineError::Generation(_)));
    }
}
