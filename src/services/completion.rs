// src/services/completion.rs
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    StatusCode,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::tone::Tone;

pub const MODEL: &str = "gpt-3.5-turbo";
pub const MAX_TOKENS: u32 = 150;
const COMPLETIONS_PATH: &str = "/v1/chat/completions";
const MISSING_KEY: &str = "OPENAI_API_KEY is not set";

/// Every way a provider call can fail.
///
/// `Display` is only the failure description; callers add their own prefix.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0}")]
    Network(String),

    #[error("{0}")]
    Timeout(String),

    #[error("{0}")]
    Authentication(String),

    #[error("{0}")]
    RateLimited(String),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    MalformedResponse(String),

    #[error("provider returned no completion choices")]
    EmptyChoices,

    #[error("{0}")]
    Setup(String),
}

impl ProviderError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Timeout(_) => "timeout",
            Self::Authentication(_) => "authentication",
            Self::RateLimited(_) => "rate_limited",
            Self::Api { .. } => "api",
            Self::MalformedResponse(_) => "malformed_response",
            Self::EmptyChoices => "empty_choices",
            Self::Setup(_) => "setup",
        }
    }

    fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Authentication(message),
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited(message),
            _ => Self::Api {
                status: status.as_u16(),
                message,
            },
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else if e.is_decode() {
            Self::MalformedResponse(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: Option<String>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// System prompt for `tone`, then the user's text.
    pub fn for_tone(tone: Tone, user_message: &str) -> Self {
        Self {
            model: MODEL.to_string(),
            messages: vec![
                ChatMessage::new(Role::System, tone.system_prompt()),
                ChatMessage::new(Role::User, user_message),
            ],
            max_tokens: MAX_TOKENS,
        }
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::System)
            .and_then(|m| m.content.as_deref())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CompletionChoice {
    #[serde(default)]
    pub index: u32,
    pub message: ChatMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    pub choices: Vec<CompletionChoice>,
}

impl CompletionResponse {
    /// A response with one assistant choice.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            choices: vec![CompletionChoice {
                index: 0,
                message: ChatMessage::new(Role::Assistant, text),
                finish_reason: Some("stop".to_string()),
            }],
        }
    }
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Anything that turns a chat exchange into completion choices.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, ProviderError>;
}

/// Chat completions over HTTPS with a bearer key.
pub struct OpenAiClient {
    http: reqwest::Client,
    url: String,
    has_key: bool,
}

impl OpenAiClient {
    /// Without a key every call fails with [`ProviderError::Authentication`].
    pub fn new(
        api_key: Option<&str>,
        base_url: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|e| ProviderError::Setup(format!("invalid API key header: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ProviderError::Setup(format!("could not build HTTP client: {e}")))?;

        Ok(Self {
            http,
            url: format!("{}{COMPLETIONS_PATH}", base_url.trim_end_matches('/')),
            has_key: api_key.is_some(),
        })
    }

    #[cfg(test)]
    fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        if !self.has_key {
            return Err(ProviderError::Authentication(MISSING_KEY.to_string()));
        }

        let response = self.http.post(&self.url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(%status, "completion provider error body: {body}");
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| {
                    if body.trim().is_empty() {
                        status.to_string()
                    } else {
                        body
                    }
                });
            return Err(ProviderError::from_status(status, message));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ProviderError::MalformedResponse(e.to_string()))
    }
}
