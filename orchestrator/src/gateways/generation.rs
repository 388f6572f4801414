use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::PipelineError;
use crate::models::ChatMessage;

/// Turns a message sequence into generated text. May fail outright, and may
/// legitimately return empty content; callers decide what to do with either.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, PipelineError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    // Null for some models while they emit no visible text
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI chat completions endpoint.
pub struct OpenAiGeneration {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiGeneration {
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PipelineError::Generation(e.to_string()))?;

        Ok(Self { client, base_url, api_key, model })
    }
}

#[async_trait]
impl GenerationGateway for OpenAiGeneration {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, PipelineError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest { model: &self.model, messages };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| PipelineError::Generation(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Generation(format!(
                "API error {status}: {body}"
            )));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Generation(e.to_string()))?;

        let content = result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        Ok(content)
    }
}
