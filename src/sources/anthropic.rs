//! Anthropic Messages API client used for pattern analysis and chat.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::{ChatAssistant, PatternOracle};
use crate::error::SourceError;
use crate::services::prompts::{scan_prompt, AnalysisRequest, ChatPrompt};
use crate::types::{ChatMessage, ChatRole};

const ANTHROPIC_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

fn wire_role(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "user",
        ChatRole::Assistant => "assistant",
    }
}

/// First text block of a response.
fn first_text(response: MessagesResponse) -> Result<String, SourceError> {
    response
        .content
        .into_iter()
        .find(|block| block.kind == "text")
        .and_then(|block| block.text)
        .ok_or_else(|| SourceError::InvalidResponse("no text content in response".to_string()))
}

/// Anthropic API client.
pub struct AnthropicClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
}

impl AnthropicClient {
    /// Create a new client. Without an API key every call fails with
    /// `SourceError::NotConfigured`.
    pub fn new(api_key: Option<String>, model: String, max_tokens: u32, timeout: Duration) -> Self {
        Self::with_base_url(ANTHROPIC_URL, api_key, model, max_tokens, timeout)
    }

    /// Create a client against a different host (used by tests).
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: String,
        max_tokens: u32,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder().timeout(timeout).build().unwrap_or_default();

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model,
            max_tokens,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn send(&self, system: Option<&str>, messages: &[ChatMessage]) -> Result<String, SourceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SourceError::NotConfigured("ANTHROPIC_API_KEY".to_string()))?;

        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system,
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: wire_role(m.role),
                    content: &m.content,
                })
                .collect(),
        };

        debug!("Sending {} message(s) to {}", messages.len(), self.model);

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            warn!("Anthropic API error {}: {}", status, message);
            return Err(SourceError::Request(format!("{}: {}", status, message)));
        }

        let data: MessagesResponse = response
            .json()
            .await
            .map_err(|e| SourceError::InvalidResponse(e.to_string()))?;

        first_text(data)
    }
}

#[async_trait]
impl PatternOracle for AnthropicClient {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<String, SourceError> {
        let prompt = scan_prompt(request);
        self.send(None, &[ChatMessage::user(prompt)]).await
    }
}

#[async_trait]
impl ChatAssistant for AnthropicClient {
    async fn reply(&self, prompt: &ChatPrompt) -> Result<String, SourceError> {
        self.send(Some(&prompt.system), &prompt.messages).await
    }
}
