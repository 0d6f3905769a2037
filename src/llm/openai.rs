//! Client for OpenAI-compatible chat completion endpoints.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::{AnswerService, ChatMessage, TEMPERATURE};
use crate::config::Config;
use crate::error::{ChatError, Result, TransportKind};

pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            max_tokens: config.max_tokens,
        }
    }

    fn request<'a>(&'a self, messages: &'a [ChatMessage]) -> CompletionRequest<'a> {
        CompletionRequest {
            model: &self.model,
            messages,
            temperature: TEMPERATURE,
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl AnswerService for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let api_url = format!("{}/chat/completions", self.base_url);
        debug!(
            "Sending {} message(s) to {} model {}",
            messages.len(),
            api_url,
            self.model
        );

        let response = self
            .client
            .post(&api_url)
            .bearer_auth(&self.api_key)
            .json(&self.request(messages))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("API request failed with status {}: {}", status, error_text);
            return Err(ChatError::transport(
                TransportKind::from_status(status),
                format!("HTTP {status}: {error_text}"),
            ));
        }

        let body = response.text().await?;
        extract_answer(&body)
    }

    fn describe(&self) -> String {
        format!("openai ({})", self.model)
    }
}

/// Pull the answer text out of a chat completion response body.
fn extract_answer(body: &str) -> Result<String> {
    let response: CompletionResponse = serde_json::from_str(body)
        .map_err(|e| ChatError::transport(TransportKind::MalformedResponse, e.to_string()))?;

    let choice = response.choices.into_iter().next().ok_or_else(|| {
        ChatError::transport(TransportKind::MalformedResponse, "response has no choices")
    })?;

    match choice.message.content {
        Some(content) if !content.is_empty() => Ok(content),
        _ => Err(ChatError::transport(
            TransportKind::MalformedResponse,
            format!(
                "response has no text (finish reason: {})",
                choice.finish_reason.as_deref().unwrap_or("unknown")
            ),
        )),
    }
}
