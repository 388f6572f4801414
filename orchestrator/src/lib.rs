//! RAG query orchestrator.
//!
//! Answers natural-language queries by grounding them in a pgvector-backed
//! document corpus and falling back to unconditioned generation when no
//! sufficiently relevant material exists. The library is shared by the
//! `orchestrator` HTTP service and the offline `backfill` job.

pub mod api;
pub mod batch;
pub mod config;
pub mod db;
pub mod error;
pub mod gateways;
pub mod index;
pub mod middleware;
pub mod models;
pub mod pipeline;
