use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One corpus row as seen by the query path. Owned by the vector index,
/// borrowed for the duration of a single request.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Document {
    pub id: Uuid,
    pub content: String,
    pub metadata: serde_json::Value,
}

/// A document with its relevance score. Scores are distances: lower means
/// more relevant, whichever search path produced them.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ScoredDocument {
    #[sqlx(flatten)]
    pub document: Document,
    pub score: f32,
}

/// Evidence gathered for one query: at most the configured budget of
/// documents, ascending by score, no id appearing twice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RetrievalResult {
    pub documents: Vec<ScoredDocument>,
}

impl RetrievalResult {
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    Grounded,
    Ungrounded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged message for the chat gateway, serialized in the wire
/// shape the completion API expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

// API request/response models

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

/// What the caller gets back. `source` records which mode actually produced
/// the text; grounded answers also carry the documents they were based on.
#[derive(Debug, Serialize)]
pub struct ResponseEnvelope {
    #[serde(rename = "response")]
    pub text: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<RetrievalResult>,
}
