//! Connection and concurrency settings for explanation requests.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for the language-model backend.
///
/// Every field has a default, so a config file only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API.
    ///
    /// - OpenAI: `https://api.openai.com`
    /// - Ollama: `http://localhost:11434`
    pub base_url: String,
    /// Bearer credential. `None` for local providers.
    pub api_key: Option<String>,
    /// Model identifier sent to the API.
    pub model: String,
    /// Upper bound on reply length.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 - 2.0).
    pub temperature: f32,
    /// Seconds to wait for one reply before giving up on that slide.
    pub timeout_secs: u64,
    /// Requests allowed in flight at once.
    pub max_concurrency: usize,
    /// Extra attempts after an HTTP 429.
    pub rate_limit_retries: u32,
    /// Seconds to wait before retrying after an HTTP 429.
    pub rate_limit_backoff_secs: u64,
    /// Replaces the default instruction appended to each slide's prompt.
    pub instruction: Option<String>,
    /// Replaces the default system message.
    pub system_message: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".into(),
            api_key: None,
            model: "gpt-4o-mini".into(),
            max_tokens: 1024,
            temperature: 0.3,
            timeout_secs: 60,
            max_concurrency: 4,
            rate_limit_retries: 0,
            rate_limit_backoff_secs: 60,
            instruction: None,
            system_message: None,
        }
    }
}

impl LlmConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn rate_limit_backoff(&self) -> Duration {
        Duration::from_secs(self.rate_limit_backoff_secs)
    }

    /// Concurrency ceiling, never below one.
    pub fn concurrency(&self) -> usize {
        self.max_concurrency.max(1)
    }

    /// The completions endpoint for `base_url`.
    pub fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }
}
