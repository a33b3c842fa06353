use crate::engine::AssistError;

/// Pull the first choice's message text out of a chat-completions body.
/// A body that parses but carries no non-empty content is `EmptyReply`.
pub fn reply_text(body: &str) -> Result<String, AssistError> {
    let val: serde_json::Value =
        serde_json::from_str(body).map_err(|e| AssistError::Malformed(e.to_string()))?;

    match val
        .pointer("/choices/0/message/content")
        .and_then(|c| c.as_str())
    {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(AssistError::EmptyReply),
    }
}
