use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use rehab_core::AssistSettings;

use crate::parse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionMessage {
    pub role: Role,
    pub content: String,
}

/// Body of a chat-completions call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionRequest {
    pub messages: Vec<CompletionMessage>,
    pub max_tokens: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum AssistError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("completion service returned HTTP {0}")]
    Status(u16),

    #[error("malformed completion response: {0}")]
    Malformed(String),

    #[error("completion response had no content")]
    EmptyReply,
}

/// One request in, one reply text or error out. Retry and timeout policy
/// belong in implementations of this trait, not in the chat session.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, AssistError>;
}

/// Azure OpenAI chat-completions deployment, authenticated with `api-key`.
#[derive(Debug, Clone)]
pub struct AzureChatClient {
    http: reqwest::Client,
    settings: AssistSettings,
}

impl AzureChatClient {
    pub fn new(settings: AssistSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }

    /// Use a preconfigured HTTP client (proxies, TLS roots, timeouts).
    pub fn with_http(settings: AssistSettings, http: reqwest::Client) -> Self {
        Self { http, settings }
    }
}

#[async_trait]
impl CompletionClient for AzureChatClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, AssistError> {
        let url = self.settings.completions_url();
        tracing::debug!(deployment = %self.settings.deployment, messages = request.messages.len(), "sending chat completion");

        let response = self
            .http
            .post(&url)
            .header("api-key", &self.settings.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| AssistError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AssistError::Transport(e.to_string()))?;

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), body = %body, "completion service error");
            // an unreadable error page is a connection problem, a JSON error is not
            return match parse::reply_text(&body) {
                Err(AssistError::Malformed(e)) => Err(AssistError::Malformed(e)),
                _ => Err(AssistError::Status(status.as_u16())),
            };
        }
        parse::reply_text(&body)
    }
}
