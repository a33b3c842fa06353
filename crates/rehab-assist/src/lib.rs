pub mod engine;
mod parse;
mod prompt;

use serde::{Deserialize, Serialize};

pub use engine::{
    AssistError, AzureChatClient, CompletionClient, CompletionMessage, CompletionRequest, Role,
};
pub use prompt::SYSTEM_PROMPT;

use rehab_core::settings::DEFAULT_MAX_TOKENS;

pub const GREETING: &str = "Hi! I'm your AI assistant. How can I help?";
/// Quick replies offered under the greeting.
pub const GREETING_SUGGESTIONS: [&str; 3] = ["Shoulder pain", "Lower back tips", "Recovery"];
pub const CONNECTION_ERROR: &str = "Connection error. Check Azure keys.";
pub const SERVICE_UNAVAILABLE: &str = "Service unavailable.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Tappable prompts shown under the message; tapping one sends it.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

/// Text shown in place of a reply when the completion call fails.
pub fn fallback_text(err: &AssistError) -> &'static str {
    match err {
        AssistError::Transport(_) | AssistError::Malformed(_) => CONNECTION_ERROR,
        AssistError::Status(_) | AssistError::EmptyReply => SERVICE_UNAVAILABLE,
    }
}

/// State of the assistant chat screen: transcript, input box and the
/// loading indicator. A send always ends with exactly one assistant message,
/// either the reply or a fallback.
///
/// Sends may overlap. Each request carries the transcript as it stood when
/// that send began, and the session stays loading until every send has
/// finished.
#[derive(Debug, Clone)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    input: String,
    in_flight: u32,
    max_tokens: u32,
    seq: u64,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TOKENS)
    }
}

impl ChatSession {
    pub fn new(max_tokens: u32) -> Self {
        let mut session = Self {
            messages: Vec::new(),
            input: String::new(),
            in_flight: 0,
            max_tokens,
            seq: 0,
        };
        session.push(Role::Assistant, GREETING.to_string());
        session.messages[0].suggestions = GREETING_SUGGESTIONS.iter().map(|s| s.to_string()).collect();
        session
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn set_input(&mut self, text: &str) {
        self.input = text.to_string();
    }

    fn push(&mut self, role: Role, content: String) -> &ChatMessage {
        let timestamp = chrono::Utc::now().timestamp_millis();
        self.seq += 1;
        self.messages.push(ChatMessage {
            id: format!("{timestamp}-{}", self.seq),
            role,
            content,
            timestamp,
            suggestions: Vec::new(),
        });
        &self.messages[self.messages.len() - 1]
    }

    /// Record the user's turn and build the completion request for it.
    /// Blank input is ignored and returns `None`.
    pub fn begin(&mut self, content: &str) -> Option<CompletionRequest> {
        if content.trim().is_empty() {
            return None;
        }
        let request = prompt::build_request(&self.messages, content, self.max_tokens);
        self.push(Role::User, content.to_string());
        self.input.clear();
        self.in_flight += 1;
        Some(request)
    }

    /// Append the assistant's reply, or the fallback for a failed call,
    /// and settle one in-flight send.
    pub fn finish(&mut self, outcome: Result<String, AssistError>) -> &ChatMessage {
        let content = match outcome {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "chat completion failed");
                fallback_text(&e).to_string()
            }
        };
        self.in_flight = self.in_flight.saturating_sub(1);
        self.push(Role::Assistant, content)
    }

    /// Send `content` through `client` and return the assistant message
    /// that was appended. `None` when the input was blank.
    pub async fn send(
        &mut self,
        client: &dyn CompletionClient,
        content: &str,
    ) -> Option<&ChatMessage> {
        let request = self.begin(content)?;
        let outcome = client.complete(&request).await;
        Some(self.finish(outcome))
    }

    /// The `index`th suggestion attached to message `message_id`.
    pub fn suggestion(&self, message_id: &str, index: usize) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.id == message_id)?
            .suggestions
            .get(index)
            .map(String::as_str)
    }

    /// Send a suggestion as if it had been typed. `None` when there is no
    /// such suggestion.
    pub async fn send_suggestion(
        &mut self,
        client: &dyn CompletionClient,
        message_id: &str,
        index: usize,
    ) -> Option<&ChatMessage> {
        let content = self.suggestion(message_id, index)?.to_string();
        self.send(client, &content).await
    }

    /// Send whatever is in the input box.
    pub async fn send_input(&mut self, client: &dyn CompletionClient) -> Option<&ChatMessage> {
        let content = self.input.clone();
        self.send(client, &content).await
    }
}
