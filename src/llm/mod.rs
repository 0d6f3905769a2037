pub mod gemini;
pub mod openai;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::{Config, Provider};
use crate::error::{ChatError, Result};

use self::gemini::GeminiClient;
use self::openai::OpenAiClient;

/// Sampling temperature for every request; answers should be as
/// deterministic as the backend allows.
pub const TEMPERATURE: f32 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged entry of the prompt sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A single call to a text-generation endpoint.
///
/// Implementations make exactly one request per call and never retry; any
/// failure comes back as a `ChatError::Transport`.
#[async_trait]
pub trait AnswerService: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Short label for logs and status output
    fn describe(&self) -> String;
}

/// Build the backend selected by the configuration.
pub fn from_config(config: &Config) -> Result<Arc<dyn AnswerService>> {
    let http = http_client(config.request_timeout)?;
    let service: Arc<dyn AnswerService> = match config.provider {
        Provider::OpenAi => Arc::new(OpenAiClient::new(http, config)),
        Provider::Gemini => Arc::new(GeminiClient::new(http, config)),
    };
    Ok(service)
}

fn http_client(timeout: Option<Duration>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| ChatError::Config(format!("failed to create HTTP client: {e}")))
}
