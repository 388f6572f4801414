use crate::models::{GenerationMode, ResponseEnvelope, RetrievalResult};

pub const SOURCE_GROUNDED: &str = "RAG";
pub const SOURCE_UNGROUNDED: &str = "OpenAI";

/// The one signal a caller has that no corpus evidence backed the answer.
pub const UNGROUNDED_PREFIX: &str = "[generated without RAG] ";

/// Substituted when the generation gateway succeeds but hands back nothing.
pub const NO_RESPONSE_PLACEHOLDER: &str = "No response available.";

/// Wraps generated text in an envelope whose `source` matches the mode that
/// actually ran. Grounded answers carry their evidence; ungrounded answers
/// carry the disclosure prefix instead.
pub fn assemble(
    mode: GenerationMode,
    generated: String,
    evidence: RetrievalResult,
) -> ResponseEnvelope {
    let body = if generated.trim().is_empty() {
        NO_RESPONSE_PLACEHOLDER.to_string()
    } else {
        generated
    };

    match mode {
        GenerationMode::Grounded => ResponseEnvelope {
            text: body,
            source: SOURCE_GROUNDED.to_string(),
            evidence: Some(evidence),
        },
        GenerationMode::Ungrounded => ResponseEnvelope {
            text: format!("{UNGROUNDED_PREFIX}{body}"),
            source: SOURCE_UNGROUNDED.to_string(),
            evidence: None,
        },
    }
}
