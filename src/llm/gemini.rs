use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, error};

use super::{AnswerService, ChatMessage, Role, TEMPERATURE};
use crate::config::Config;
use crate::error::{ChatError, Result, TransportKind};

pub struct GeminiClient {
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            max_tokens: config.max_tokens,
            client,
        }
    }

    fn request_body(&self, messages: &[ChatMessage]) -> Value {
        // System entries go into the system instruction, the rest become turns
        let system_text = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let contents = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| {
                let role = match m.role {
                    Role::Assistant => "model",
                    _ => "user",
                };
                json!({
                    "role": role,
                    "parts": [
                        {
                            "text": m.content
                        }
                    ]
                })
            })
            .collect::<Vec<_>>();

        let mut body = json!({
            "contents": contents,
            "generationConfig": {
                "temperature": TEMPERATURE,
                "maxOutputTokens": self.max_tokens
            }
        });

        if !system_text.is_empty() {
            body["systemInstruction"] = json!({
                "parts": [
                    {
                        "text": system_text
                    }
                ]
            });
        }

        body
    }
}

#[async_trait]
impl AnswerService for GeminiClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let api_url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let request_body = self.request_body(messages);
        debug!(
            "Sending {} message(s) to Gemini model {}",
            messages.len(),
            self.model
        );

        let response = self
            .client
            .post(&api_url)
            .query(&[("key", &self.api_key)])
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("API request failed with response: {}", error_text);
            return Err(ChatError::transport(
                TransportKind::from_status(status),
                format!("HTTP {status}: {error_text}"),
            ));
        }

        let response_json: Value = response.json().await?;
        extract_answer(&response_json)
    }

    fn describe(&self) -> String {
        format!("gemini ({})", self.model)
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_answer(response_json: &Value) -> Result<String> {
    let candidate = response_json
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .ok_or_else(|| {
            let reason = response_json
                .pointer("/promptFeedback/blockReason")
                .and_then(|r| r.as_str())
                .unwrap_or("no candidates");
            ChatError::transport(TransportKind::MalformedResponse, reason)
        })?;

    let text = candidate
        .pointer("/content/parts")
        .and_then(|parts| parts.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
                .collect::<String>()
        })
        .unwrap_or_default();

    if text.is_empty() {
        let finish_reason = candidate
            .get("finishReason")
            .and_then(|r| r.as_str())
            .unwrap_or("unknown");
        return Err(ChatError::transport(
            TransportKind::MalformedResponse,
            format!("response has no text (finish reason: {finish_reason})"),
        ));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::{local_service, serve_nothing, serve_once, transport_kind};

    fn client() -> GeminiClient {
        let config = Config::from_lookup(|key| match key {
            "DOCUMIND_PROVIDER" => Some("gemini".to_string()),
            "GEMINI_API_KEY" => Some("g-key".to_string()),
            _ => None,
        })
        .unwrap();
        GeminiClient::new(reqwest::Client::new(), &config)
    }

    #[test]
    fn system_entry_becomes_system_instruction() {
        let messages = vec![
            ChatMessage::system("use the document"),
            ChatMessage::user("q1"),
            ChatMessage::assistant("a1"),
            ChatMessage::user("q2"),
        ];

        let body = client().request_body(&messages);

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "use the document");
        let roles: Vec<&str> = body["contents"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["role"].as_str().unwrap())
            .collect();
        assert_eq!(roles, vec!["user", "model", "user"]);
        assert_eq!(body["contents"][2]["parts"][0]["text"], "q2");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1000);
    }

    #[test]
    fn joins_text_parts() {
        let response = json!({
            "candidates": [
                { "content": { "parts": [ { "text": "Par" }, { "text": "is." } ] }, "finishReason": "STOP" }
            ]
        });
        assert_eq!(extract_answer(&response).unwrap(), "Paris.");
    }

    #[test]
    fn blocked_prompt_is_malformed() {
        let response = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        match extract_answer(&response) {
            Err(ChatError::Transport { kind, cause }) => {
                assert_eq!(kind, TransportKind::MalformedResponse);
                assert_eq!(cause, "SAFETY");
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[test]
    fn candidate_without_text_is_malformed() {
        let response = json!({
            "candidates": [ { "content": { "parts": [] }, "finishReason": "MAX_TOKENS" } ]
        });
        let err = extract_answer(&response).unwrap_err();
        assert!(err.to_string().contains("MAX_TOKENS"));
    }

    #[tokio::test]
    async fn answers_over_http() {
        let base_url = serve_once(
            "200 OK",
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Paris."}]},"finishReason":"STOP"}]}"#,
        )
        .await;
        let service = local_service("gemini", &base_url, None);

        let answer = service.complete(&[ChatMessage::user("capital?")]).await.unwrap();

        assert_eq!(answer, "Paris.");
    }

    #[tokio::test]
    async fn slow_endpoint_times_out() {
        let base_url = serve_nothing().await;
        let service = local_service("gemini", &base_url, Some("1"));

        let result = service.complete(&[ChatMessage::user("hello")]).await;

        assert_eq!(transport_kind(result), TransportKind::Timeout);
    }

    #[tokio::test]
    async fn error_statuses_are_classified() {
        let base_url = serve_once("429 Too Many Requests", "quota").await;
        let service = local_service("gemini", &base_url, None);
        let result = service.complete(&[ChatMessage::user("hello")]).await;
        assert_eq!(transport_kind(result), TransportKind::RateLimit);

        let base_url = serve_once("403 Forbidden", "bad key").await;
        let service = local_service("gemini", &base_url, None);
        let result = service.complete(&[ChatMessage::user("hello")]).await;
        assert_eq!(transport_kind(result), TransportKind::Authentication);
    }

    #[tokio::test]
    async fn truncated_body_is_malformed() {
        let base_url = serve_once("200 OK", r#"{"candidates":[{"content":"#).await;
        let service = local_service("gemini", &base_url, None);

        let result = service.complete(&[ChatMessage::user("hello")]).await;

        assert_eq!(transport_kind(result), TransportKind::MalformedResponse);
    }
}
