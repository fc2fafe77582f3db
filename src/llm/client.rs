use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::GenerationError;
use crate::models::{ChatMessage, ChatRole};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_MAX_TOKENS: u32 = 8192;
const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Text generation collaborator
///
/// Given a prompt it returns the model's text. Calls may be slow, may
/// truncate and may ignore instructions; callers treat the output as untrusted.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Single-shot generation from one prompt
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Multi-turn chat: reply to an ordered, append-only message history
    /// under the given system instruction
    async fn converse(
        &self,
        system: &str,
        history: &[ChatMessage],
    ) -> Result<String, GenerationError>;
}

/// Configuration for the Anthropic API client
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key (from ANTHROPIC_API_KEY env var)
    pub api_key: String,
    /// Model to use (ARCHGEN_MODEL overrides)
    pub model: String,
    /// Sampling temperature (0-1)
    pub temperature: f64,
    /// Maximum tokens per response; bounds each stage's output
    pub max_tokens: u32,
    /// API root, without the `/v1/messages` path
    pub base_url: String,
}

impl AnthropicConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self, GenerationError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(GenerationError::MissingApiKey)?;

        let mut config = Self::new(api_key, DEFAULT_MODEL.to_string());

        if let Ok(model) = std::env::var("ARCHGEN_MODEL") {
            config.model = model;
        }
        if let Some(max_tokens) = env_parse::<u32>("ARCHGEN_MAX_TOKENS") {
            config.max_tokens = max_tokens;
        }
        if let Some(temperature) = env_parse::<f64>("ARCHGEN_TEMPERATURE") {
            config.temperature = temperature;
        }
        if let Ok(base_url) = std::env::var("ARCHGEN_BASE_URL") {
            config.base_url = base_url;
        }

        Ok(config)
    }

    /// Create with custom settings
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url.trim_end_matches('/'))
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Anthropic API client
pub struct AnthropicClient {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicClient {
    pub fn new(config: AnthropicConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &AnthropicConfig {
        &self.config
    }

    async fn send(
        &self,
        system: Option<&str>,
        messages: Vec<Message>,
    ) -> Result<String, GenerationError> {
        let request = AnthropicRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: Some(self.config.temperature),
            system: system.map(str::to_string),
            messages,
        };

        debug!(
            "Sending {} message(s) to {}",
            request.messages.len(),
            self.config.model
        );

        let response = self
            .client
            .post(self.config.messages_url())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api { status, body });
        }

        let body = response.text().await?;
        let response: AnthropicResponse =
            serde_json::from_str(&body).map_err(|e| GenerationError::Decode(e.to_string()))?;

        if response.stop_reason.as_deref() == Some("max_tokens") {
            debug!("Response hit max_tokens and was truncated");
        }

        let text: String = response
            .content
            .iter()
            .filter(|c| c.content_type == "text")
            .map(|c| c.text.as_str())
            .collect();

        if text.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        Ok(text)
    }
}

#[async_trait]
impl GenerationService for AnthropicClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.send(None, vec![Message::user(prompt)]).await
    }

    async fn converse(
        &self,
        system: &str,
        history: &[ChatMessage],
    ) -> Result<String, GenerationError> {
        let messages = history.iter().map(Message::from).collect();
        self.send(Some(system), messages).await
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

impl Message {
    fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

impl From<&ChatMessage> for Message {
    fn from(message: &ChatMessage) -> Self {
        let role = match message.role {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        };
        Self {
            role: role.to_string(),
            content: message.content.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::prompts::SYSTEM_INSTRUCTION;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> AnthropicClient {
        let mut config = AnthropicConfig::new("test-key".to_string(), "test-model".to_string());
        config.base_url = server.uri();
        AnthropicClient::new(config)
    }

    #[tokio::test]
    async fn test_generate_returns_text_blocks() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "test-model",
                "messages": [{"role": "user", "content": "Describe the system"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [
                    {"type": "text", "text": "## Executive Summary\n"},
                    {"type": "text", "text": "A web platform."}
                ],
                "stop_reason": "end_turn"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let text = client.generate("Describe the system").await.unwrap();
        assert_eq!(text, "## Executive Summary\nA web platform.");
    }

    #[tokio::test]
    async fn test_converse_sends_system_and_history() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(body_partial_json(serde_json::json!({
                "system": SYSTEM_INSTRUCTION,
                "messages": [
                    {"role": "user", "content": "Hi"},
                    {"role": "assistant", "content": "Hello! What are you building?"},
                    {"role": "user", "content": "An order API"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{"type": "text", "text": "Who are the users?"}]
            })))
            .mount(&server)
            .await;

        let history = vec![
            ChatMessage::user("Hi"),
            ChatMessage::assistant("Hello! What are you building?"),
            ChatMessage::user("An order API"),
        ];
        let reply = client_for(&server)
            .converse(SYSTEM_INSTRUCTION, &history)
            .await
            .unwrap();
        assert_eq!(reply, "Who are the users?");
    }

    #[tokio::test]
    async fn test_converse_uses_caller_system_instruction() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({"system": "Answer in one line."})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{"type": "text", "text": "ok"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client_for(&server)
            .converse("Answer in one line.", &[ChatMessage::user("Hi")])
            .await
            .unwrap();
        assert_eq!(reply, "ok");
    }

    #[tokio::test]
    async fn test_api_error_propagates_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(529).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = client_for(&server).generate("x").await.unwrap_err();
        match err {
            GenerationError::Api { status, body } => {
                assert_eq!(status, 529);
                assert_eq!(body, "overloaded");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_empty_content_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"content": []})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).generate("x").await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyResponse));
    }

    #[test]
    fn test_messages_url_trims_trailing_slash() {
        let mut config = AnthropicConfig::new("k".into(), "m".into());
        config.base_url = "http://localhost:8080/".into();
        assert_eq!(config.messages_url(), "http://localhost:8080/v1/messages");
    }
}
