//! OpenAI-compatible chat-completion client.

use super::{
    domain::CompletionRequest,
    ports::{AssistError, AssistResult, TextCompletion},
};
use crate::config::ChatConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// System message sent ahead of every prompt.
pub const SYSTEM_PROMPT: &str = "You help sales engineers prepare for customer conversations. \
     Answer briefly and concretely.";

/// Chat message on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    /// `system` or `user`.
    pub role: &'static str,
    /// Message text.
    pub content: String,
}

/// Request body for `POST /chat/completions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    /// Model name.
    pub model: String,
    /// Conversation, system messages first.
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Builds the request body for a completion.
#[must_use]
pub fn build_request_body(model: &str, request: &CompletionRequest) -> ChatRequest {
    let mut messages = vec![ChatMessage {
        role: "system",
        content: SYSTEM_PROMPT.to_owned(),
    }];
    if let Some(context) = request.context() {
        messages.push(ChatMessage {
            role: "system",
            content: format!("Context:\n{context}"),
        });
    }
    messages.push(ChatMessage {
        role: "user",
        content: request.prompt().to_owned(),
    });
    ChatRequest {
        model: model.to_owned(),
        messages,
    }
}

/// Extracts the first choice's text from a response body.
///
/// # Errors
///
/// Returns [`AssistError::InvalidResponse`] for malformed JSON or a
/// response without non-blank content.
pub fn completion_text(body: &str) -> AssistResult<String> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|err| AssistError::InvalidResponse(err.to_string()))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| AssistError::InvalidResponse("no completion content".to_owned()))
}

/// Extracts the service's error message, falling back to the raw body.
#[must_use]
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiError>(body).map_or_else(
        |_| body.trim().to_owned(),
        |parsed| parsed.error.message,
    )
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
///
/// The credential comes from the [`ChatConfig`] handed to [`Self::new`];
/// without one every call fails with [`AssistError::NotConfigured`].
#[derive(Debug, Clone)]
pub struct ChatCompletionClient {
    http: Client,
    config: ChatConfig,
}

impl ChatCompletionClient {
    /// Creates a client with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`AssistError::Unavailable`] when the HTTP client cannot be
    /// built.
    pub fn new(config: ChatConfig) -> AssistResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(AssistError::unavailable)?;
        Ok(Self { http, config })
    }

    /// Returns the completion endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl TextCompletion for ChatCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> AssistResult<String> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Err(AssistError::NotConfigured);
        };
        let body = build_request_body(&self.config.model, request);
        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(AssistError::unavailable)?;

        let status = response.status();
        let text = response.text().await.map_err(AssistError::unavailable)?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "chat completion rejected");
            return Err(AssistError::Rejected {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }
        debug!(model = %self.config.model, bytes = text.len(), "chat completion received");
        completion_text(&text)
    }
}
