//! The `SlideExplainer` trait and its OpenAI-compatible implementation.
//!
//! `OpenAiExplainer` calls any `/v1/chat/completions` endpoint: OpenAI,
//! Ollama (OpenAI mode), Groq, LM Studio, vLLM. All connection details come
//! from [`LlmConfig`].

use async_trait::async_trait;
use explainer_core::PromptBuilder;
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::LlmError;

/// Async trait for anything that can explain a slide prompt.
///
/// Implementors must be `Send + Sync` so one instance can serve every slide
/// of a run (e.g. behind `Arc<dyn SlideExplainer>`).
#[async_trait]
pub trait SlideExplainer: Send + Sync {
    async fn explain(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Calls an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiExplainer {
    client: reqwest::Client,
    config: LlmConfig,
    system_message: String,
}

impl OpenAiExplainer {
    /// Build an explainer from config.
    ///
    /// The per-request deadline is enforced by the dispatcher; the client
    /// itself only bounds connection setup.
    pub fn from_config(config: &LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self::with_client(config, client)
    }

    /// Build an explainer around an existing HTTP client.
    pub fn with_client(config: &LlmConfig, client: reqwest::Client) -> Self {
        let system_message = PromptBuilder::new()
            .with_system_message(config.system_message.clone().unwrap_or_default())
            .system_message()
            .to_string();

        Self {
            client,
            config: config.clone(),
            system_message,
        }
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": self.system_message },
                { "role": "user",   "content": prompt }
            ],
            "stream": false,
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens
        })
    }
}

#[async_trait]
impl SlideExplainer for OpenAiExplainer {
    /// Send one prompt and return the trimmed reply.
    ///
    /// The `Authorization: Bearer` header is attached only when an API key
    /// is configured and non-empty.
    async fn explain(&self, prompt: &str) -> Result<String, LlmError> {
        let mut req = self
            .client
            .post(self.config.completions_url())
            .json(&self.request_body(prompt));

        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::from_status(status.as_u16(), &body));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        parse_completion(&json)
    }
}

/// Pull the reply text out of a completion response.
///
/// Reads `choices[0].message.content` (chat) or `choices[0].text` (legacy
/// completions).
pub fn parse_completion(json: &serde_json::Value) -> Result<String, LlmError> {
    let choice = json
        .get("choices")
        .and_then(|c| c.get(0))
        .ok_or_else(|| LlmError::Parse("response has no choices".to_string()))?;

    let text = choice["message"]["content"]
        .as_str()
        .or_else(|| choice["text"].as_str())
        .ok_or(LlmError::EmptyResponse)?
        .trim();

    if text.is_empty() {
        return Err(LlmError::EmptyResponse);
    }

    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn make_config(base_url: String, api_key: Option<&str>) -> LlmConfig {
        LlmConfig {
            base_url,
            api_key: api_key.map(|s| s.to_string()),
            model: "test-model".into(),
            ..LlmConfig::default()
        }
    }

    /// Local test servers must not be routed through an ambient proxy.
    fn explainer(config: &LlmConfig) -> OpenAiExplainer {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        OpenAiExplainer::with_client(config, client)
    }

    /// Serve one canned HTTP response and hand back the raw request.
    async fn serve_once(status_line: &'static str, body: String) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];

            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);

                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|l| {
                            let lower = l.to_ascii_lowercase();
                            lower
                                .strip_prefix("content-length:")
                                .and_then(|v| v.trim().parse::<usize>().ok())
                        })
                        .unwrap_or(0);
                    if request.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();

            String::from_utf8_lossy(&request).to_string()
        });

        (format!("http://{}", addr), handle)
    }

    #[test]
    fn test_parse_chat_completion() {
        let json = json!({
            "choices": [{ "message": { "role": "assistant", "content": "  An overview.\n" } }]
        });
        assert_eq!(parse_completion(&json).unwrap(), "An overview.");
    }

    #[test]
    fn test_parse_legacy_completion() {
        let json = json!({ "choices": [{ "text": "\n\nLegacy reply" }] });
        assert_eq!(parse_completion(&json).unwrap(), "Legacy reply");
    }

    #[test]
    fn test_parse_empty_and_malformed() {
        let blank = json!({ "choices": [{ "message": { "content": "   " } }] });
        assert!(matches!(parse_completion(&blank), Err(LlmError::EmptyResponse)));

        let null = json!({ "choices": [{ "message": { "content": null } }] });
        assert!(matches!(parse_completion(&null), Err(LlmError::EmptyResponse)));

        let none = json!({ "id": "cmpl-1" });
        assert!(matches!(parse_completion(&none), Err(LlmError::Parse(_))));
    }

    /// Verify that `OpenAiExplainer` is usable as `dyn SlideExplainer`.
    #[test]
    fn test_explainer_is_object_safe() {
        let config = make_config("http://localhost:1".into(), None);
        let explainer: Box<dyn SlideExplainer> = Box::new(OpenAiExplainer::from_config(&config));
        drop(explainer);
    }

    #[tokio::test]
    async fn test_explain_sends_chat_request() {
        let body = json!({
            "choices": [{ "message": { "role": "assistant", "content": "It covers ownership." } }]
        })
        .to_string();
        let (base_url, server) = serve_once("HTTP/1.1 200 OK", body).await;

        let explainer = explainer(&make_config(base_url, Some("sk-test")));
        let reply = explainer.explain("Slide 1:\nOwnership\n\nExplain.").await.unwrap();
        assert_eq!(reply, "It covers ownership.");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /v1/chat/completions"));
        assert!(request.to_ascii_lowercase().contains("authorization: bearer sk-test"));
        assert!(request.contains("\"model\":\"test-model\""));
        assert!(request.contains("Slide 1:\\nOwnership"));
    }

    #[tokio::test]
    async fn test_explain_without_key_sends_no_auth_header() {
        let body = json!({ "choices": [{ "message": { "content": "ok" } }] }).to_string();
        let (base_url, server) = serve_once("HTTP/1.1 200 OK", body).await;

        let explainer = explainer(&make_config(base_url, Some("")));
        explainer.explain("prompt").await.unwrap();

        let request = server.await.unwrap();
        assert!(!request.to_ascii_lowercase().contains("authorization:"));
    }

    #[tokio::test]
    async fn test_explain_maps_rate_limit() {
        let body = json!({ "error": { "message": "Rate limit reached" } }).to_string();
        let (base_url, server) = serve_once("HTTP/1.1 429 Too Many Requests", body).await;

        let explainer = explainer(&make_config(base_url, None));
        let err = explainer.explain("prompt").await.unwrap_err();
        assert!(matches!(err, LlmError::RateLimited));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_connection_refused_is_request_error() {
        // Bind then drop to get a port with nothing listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let explainer = explainer(&make_config(format!("http://{}", addr), None));
        let err = explainer.explain("prompt").await.unwrap_err();
        assert!(matches!(err, LlmError::Request(_)));
    }
}
