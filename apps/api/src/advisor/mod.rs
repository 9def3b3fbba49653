// Finance Q&A proxy: one question in, one canned educational answer out.
// All provider calls go through llm_client.

pub mod handlers;

use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::llm_client::prompts::FINANCE_EDUCATION_SYSTEM;
use crate::llm_client::{LlmClient, LlmError};

const NO_ANSWER: &str = "No answer from model.";

/// Wire shape of a successful answer. The trailing null fields are part of
/// the contract the site expects and are always empty.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    pub answer: String,
    pub source: String,
    pub goal: Option<String>,
    pub years: Option<u32>,
    pub assumed_return: Option<f64>,
    pub sip: Option<f64>,
    pub lump: Option<f64>,
    pub categories: Vec<String>,
}

impl AskResponse {
    fn from_model(answer: String) -> Self {
        Self {
            answer,
            source: "openai".to_string(),
            goal: None,
            years: None,
            assumed_return: None,
            sip: None,
            lump: None,
            categories: Vec::new(),
        }
    }
}

/// Classified failure of a finance question.
#[derive(Debug, Error)]
pub enum AskError {
    #[error("Missing OPENAI_API_KEY")]
    MissingCredential,

    #[error("OPENAI_API_KEY looks invalid (must start with \"sk-\")")]
    InvalidCredentialFormat,

    #[error("provider rejected the API key")]
    UnauthorizedCredential,

    #[error("provider call failed")]
    ProviderError,
}

impl AskError {
    /// Tag reported in the `source` field of the error body.
    pub fn source_tag(&self) -> &'static str {
        match self {
            AskError::MissingCredential | AskError::InvalidCredentialFormat => "server_config",
            AskError::UnauthorizedCredential => "invalid_api_key",
            AskError::ProviderError => "error",
        }
    }

    /// Client-facing message. Names the configuration to fix, never echoes the key.
    pub fn user_message(&self) -> String {
        match self {
            AskError::MissingCredential | AskError::InvalidCredentialFormat => {
                format!("{self}. Set it in the server environment and restart.")
            }
            AskError::UnauthorizedCredential => {
                "OpenAI rejected the API key (invalid/expired). Update OPENAI_API_KEY and restart."
                    .to_string()
            }
            AskError::ProviderError => "OpenAI call failed. Try again later.".to_string(),
        }
    }
}

impl From<LlmError> for AskError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::MissingCredential => AskError::MissingCredential,
            LlmError::InvalidCredentialFormat => AskError::InvalidCredentialFormat,
            LlmError::UnauthorizedCredential(_) => AskError::UnauthorizedCredential,
            LlmError::Http(_) | LlmError::Api { .. } => AskError::ProviderError,
        }
    }
}

/// Forwards one question to the model. Not retried on failure.
pub async fn ask_finance_question(llm: &LlmClient, query: &str) -> Result<AskResponse, AskError> {
    let response = llm
        .call(query, FINANCE_EDUCATION_SYSTEM)
        .await
        .map_err(|e| {
            if e.is_configuration() {
                warn!("Finance question rejected: {e}");
            } else {
                error!("ai-finance error: {e}");
            }
            AskError::from(e)
        })?;

    let answer = response.text().unwrap_or(NO_ANSWER).to_string();
    Ok(AskResponse::from_model(answer))
}
