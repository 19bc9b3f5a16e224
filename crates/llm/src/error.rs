//! Errors for a single explanation request.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while requesting one slide's explanation.
///
/// None of these abort a run: the dispatcher records the message in place
/// of the slide's explanation.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP transport or connection error.
    #[error("request failed: {0}")]
    Request(String),

    /// No response within the configured time.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The API rejected the request because of its rate limit.
    #[error("rate limit exceeded (HTTP 429)")]
    RateLimited,

    /// The API rejected the credential.
    #[error("authentication failed (HTTP {0}): check the API key")]
    Authentication(u16),

    /// Any other non-success status.
    #[error("API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body was not the expected JSON.
    #[error("failed to parse API response: {0}")]
    Parse(String),

    /// The response carried no usable text.
    #[error("API returned an empty explanation")]
    EmptyResponse,
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            LlmError::Parse(e.to_string())
        } else {
            LlmError::Request(e.to_string())
        }
    }
}

impl LlmError {
    /// Map a non-success HTTP status and its body to an error.
    ///
    /// OpenAI-style bodies carry the reason in `error.message`; anything
    /// else is reported verbatim.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            429 => LlmError::RateLimited,
            401 | 403 => LlmError::Authentication(status),
            _ => {
                let message = serde_json::from_str::<serde_json::Value>(body)
                    .ok()
                    .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
                    .unwrap_or_else(|| body.trim().to_string());
                LlmError::Api { status, message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert!(matches!(LlmError::from_status(429, ""), LlmError::RateLimited));
        assert!(matches!(
            LlmError::from_status(401, "{}"),
            LlmError::Authentication(401)
        ));

        let err = LlmError::from_status(
            500,
            r#"{"error": {"message": "The server had an error", "type": "server_error"}}"#,
        );
        assert_eq!(err.to_string(), "API returned HTTP 500: The server had an error");

        let err = LlmError::from_status(502, "Bad Gateway\n");
        assert_eq!(err.to_string(), "API returned HTTP 502: Bad Gateway");
    }

    #[test]
    fn test_timeout_message() {
        let err = LlmError::Timeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "request timed out after 30s");
    }
}
