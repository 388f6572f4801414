//! Clients for the external model gateways.
//!
//! The pipeline only sees the traits; the OpenAI-backed implementations live
//! in the submodules so tests can substitute in-process fakes.

mod embeddings;
mod generation;

pub use embeddings::{EmbeddingGateway, OpenAiEmbeddings};
pub use generation::{GenerationGateway, OpenAiGeneration};
