//! Language-model requests for slide explanations.
//!
//! * [`SlideExplainer`]: async trait implemented by every backend.
//! * [`OpenAiExplainer`]: OpenAI-compatible `/v1/chat/completions` client.
//! * [`ExplanationDispatcher`]: sends one request per slide concurrently,
//!   bounded by a semaphore, each with its own timeout, and collects the
//!   outcomes in slide order.
//! * [`LlmConfig`]: connection and concurrency settings.
//! * [`LlmError`]: per-request failures.

pub mod client;
pub mod config;
pub mod dispatcher;
pub mod error;

pub use client::{OpenAiExplainer, SlideExplainer};
pub use config::LlmConfig;
pub use dispatcher::ExplanationDispatcher;
pub use error::LlmError;
