//! LLM Client: the single point of entry for chat-completion calls.
//!
//! ARCHITECTURAL RULE: No other module may call the provider API directly.
//!
//! Model: gpt-4o-mini, hardcoded so it cannot drift between deployments.
//! One attempt per question. No retry, no backoff, no streaming.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;

/// The model used for all LLM calls.
pub const MODEL: &str = "gpt-4o-mini";
const TEMPERATURE: f32 = 0.3;
const CREDENTIAL_PREFIX: &str = "sk-";
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Missing OPENAI_API_KEY")]
    MissingCredential,

    #[error("OPENAI_API_KEY looks invalid (must start with \"sk-\")")]
    InvalidCredentialFormat,

    #[error("provider rejected the API key: {0}")]
    UnauthorizedCredential(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl LlmError {
    /// Configuration problems are detected locally, before any network I/O.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            LlmError::MissingCredential | LlmError::InvalidCredentialFormat
        )
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Trimmed text of the first choice, if it has any.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    message: String,
    code: Option<String>,
}

/// Chat-completions client. The credential is checked on each call rather
/// than at startup so the rest of the server runs without one.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl LlmClient {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Validates the configured credential without touching the network.
    pub fn credential(&self) -> Result<&str, LlmError> {
        let key = self.api_key.as_deref().map(str::trim).unwrap_or_default();
        if key.is_empty() {
            return Err(LlmError::MissingCredential);
        }
        if !key.starts_with(CREDENTIAL_PREFIX) {
            return Err(LlmError::InvalidCredentialFormat);
        }
        Ok(key)
    }

    /// Makes a single-turn call and returns the full response object.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<ChatResponse, LlmError> {
        let api_key = self.credential()?;

        let request_body = ChatRequest {
            model: MODEL,
            temperature: TEMPERATURE,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let parsed = serde_json::from_str::<ProviderError>(&body).ok();
            let code = parsed.as_ref().and_then(|e| e.error.code.as_deref());

            if status == StatusCode::UNAUTHORIZED || code == Some("invalid_api_key") {
                let message = parsed.map(|e| e.error.message).unwrap_or(body);
                return Err(LlmError::UnauthorizedCredential(message));
            }

            return Err(LlmError::Api {
                status: status.as_u16(),
                message: parsed.map(|e| e.error.message).unwrap_or(body),
            });
        }

        let chat_response: ChatResponse = response.json().await?;

        if let Some(usage) = &chat_response.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(chat_response)
    }
}
