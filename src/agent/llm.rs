//! Language-model client for OpenAI-compatible chat completion endpoints.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{HttpConfig, LlmConfig};
use crate::utils::HttpClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
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

/// One chat completion call
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// The model's reply; `content` is `None` when the endpoint returned nothing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub content: Option<String>,
    pub finish_reason: Option<String>,
}

impl Completion {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            finish_reason: Some("stop".to_string()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,

    #[error("Model request failed: {0}")]
    Network(String),

    #[error("Model API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse model response: {0}")]
    Parse(String),

    #[error("Failed to create model client: {0}")]
    Client(String),
}

/// A chat completion endpoint
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError>;
}

#[derive(Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: Option<OpenAiMessage>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
}

/// Client for `/chat/completions` (OpenAI, OpenRouter, Ollama, vLLM...)
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    referer: Option<String>,
    app_title: Option<String>,
    http_client: HttpClient,
}

impl OpenAiClient {
    /// Create a client; a missing or blank key is fatal
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        http: &HttpConfig,
    ) -> Result<Self, LlmError> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(LlmError::MissingApiKey)?;

        // Connect timeout only; the iteration cap bounds total effort
        let http_client =
            HttpClient::without_request_timeout(http).map_err(|e| LlmError::Client(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            referer: None,
            app_title: None,
            http_client,
        })
    }

    pub fn from_config(config: &LlmConfig, http: &HttpConfig) -> Result<Self, LlmError> {
        let mut client = Self::new(&config.base_url, config.resolved_api_key(), http)?;
        client.referer = config.referer.clone();
        client.app_title = config.app_title.clone();
        Ok(client)
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut http_req = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request);
        if let Some(ref referer) = self.referer {
            http_req = http_req.header("HTTP-Referer", referer);
        }
        if let Some(ref title) = self.app_title {
            http_req = http_req.header("X-Title", title);
        }

        let response = http_req
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let Some(choice) = parsed.choices.into_iter().next() else {
            return Ok(Completion::default());
        };

        Ok(Completion {
            content: choice.message.and_then(|m| m.content),
            finish_reason: choice.finish_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "test/model".to_string(),
            messages: vec![ChatMessage::system("Be helpful."), ChatMessage::user("Hello")],
            max_tokens: 512,
            temperature: 0.2,
        }
    }

    fn client(server: &mockito::ServerGuard, key: &str) -> OpenAiClient {
        OpenAiClient::new(server.url(), Some(key.to_string()), &HttpConfig::default()).unwrap()
    }

    #[test]
    fn test_request_body_matches_openai_format() {
        let json = serde_json::to_value(request()).unwrap();

        assert_eq!(json["model"], "test/model");
        assert_eq!(json["max_tokens"], 512);
        let messages = json["messages"].as_array().unwrap();
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[1]["content"], "Hello");
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        assert!(matches!(
            OpenAiClient::new("http://localhost", None, &HttpConfig::default()),
            Err(LlmError::MissingApiKey)
        ));
        assert!(matches!(
            OpenAiClient::new("http://localhost", Some("  ".to_string()), &HttpConfig::default()),
            Err(LlmError::MissingApiKey)
        ));
    }

    #[tokio::test]
    async fn test_complete_returns_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({"model": "test/model"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"<thought>hi</thought>"},"finish_reason":"stop"}]}"#)
            .create_async()
            .await;

        let client = client(&server, "sk-test");
        let completion = client.complete(&request()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(completion.content.as_deref(), Some("<thought>hi</thought>"));
    }

    #[tokio::test]
    async fn test_complete_without_content() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":null},"finish_reason":"length"}]}"#)
            .create_async()
            .await;

        let client = client(&server, "sk-test");
        let completion = client.complete(&request()).await.unwrap();
        assert_eq!(completion.content, None);
    }

    #[tokio::test]
    async fn test_complete_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body("invalid key")
            .create_async()
            .await;

        let client = client(&server, "sk-bad");
        let result = client.complete(&request()).await;
        assert!(matches!(result, Err(LlmError::Api { status: 401, .. })));
    }

    #[tokio::test]
    async fn test_configured_user_agent_is_sent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("user-agent", "cite-bot/9.9")
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"ok"},"finish_reason":"stop"}]}"#)
            .create_async()
            .await;

        let http = HttpConfig {
            user_agent: "cite-bot/9.9".to_string(),
            connect_timeout_secs: 3,
            ..HttpConfig::default()
        };
        let llm = LlmConfig {
            base_url: server.url(),
            api_key: Some("sk-test".to_string()),
            ..LlmConfig::default()
        };
        let client = OpenAiClient::from_config(&llm, &http).unwrap();
        let completion = client.complete(&request()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(completion.content.as_deref(), Some("ok"));
    }
}
