use crate::models::{ChatMessage, GenerationMode, RetrievalResult};

/// Grounded iff retrieval produced any evidence. Decided purely from the
/// retrieval outcome, before generation runs.
pub fn select(result: &RetrievalResult) -> GenerationMode {
    if result.is_empty() {
        GenerationMode::Ungrounded
    } else {
        GenerationMode::Grounded
    }
}

/// Builds the message sequence for the generation gateway. Grounding context
/// rides in its own assistant message and is never spliced into the user's
/// query text. Ungrounded queries go out bare, with no system priming and
/// no context.
pub fn build_messages(mode: GenerationMode, query: &str, context: &str) -> Vec<ChatMessage> {
    match mode {
        GenerationMode::Grounded => vec![
            ChatMessage::system("You are a helpful assistant."),
            ChatMessage::user(query),
            ChatMessage::assistant(context),
        ],
        GenerationMode::Ungrounded => vec![ChatMessage::user(query)],
    }
}
