use crate::engine::{CompletionMessage, CompletionRequest, Role};
use crate::ChatMessage;

pub const SYSTEM_PROMPT: &str = "You are a physio assistant.";

/// System prompt, then the transcript so far, then the new user turn.
pub fn build_request(history: &[ChatMessage], user_content: &str, max_tokens: u32) -> CompletionRequest {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(CompletionMessage {
        role: Role::System,
        content: SYSTEM_PROMPT.to_string(),
    });
    messages.extend(history.iter().map(|m| CompletionMessage {
        role: m.role,
        content: m.content.clone(),
    }));
    messages.push(CompletionMessage {
        role: Role::User,
        content: user_content.to_string(),
    });
    CompletionRequest {
        messages,
        max_tokens,
    }
}
