//! Concurrent explanation requests for every slide of a deck.
//!
//! Each slide becomes one future. All of them are polled together on the
//! current task, so total time tracks the slowest request rather than the
//! sum. A semaphore caps how many requests are in flight at once, and every
//! request carries its own timeout. A failure only ever affects its own
//! slide.

use explainer_core::{PromptBuilder, SlideExplanation, SlideText};
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::client::SlideExplainer;
use crate::config::LlmConfig;
use crate::error::LlmError;

/// Sends slide prompts to a [`SlideExplainer`] and gathers the outcomes.
pub struct ExplanationDispatcher {
    explainer: Arc<dyn SlideExplainer>,
    prompts: PromptBuilder,
    permits: Semaphore,
    request_timeout: Duration,
    rate_limit_retries: u32,
    rate_limit_backoff: Duration,
}

impl ExplanationDispatcher {
    pub fn new(explainer: Arc<dyn SlideExplainer>, config: &LlmConfig) -> Self {
        let mut prompts = PromptBuilder::new();
        if let Some(instruction) = &config.instruction {
            prompts = prompts.with_instruction(instruction.as_str());
        }

        Self {
            explainer,
            prompts,
            permits: Semaphore::new(config.concurrency()),
            request_timeout: config.request_timeout(),
            rate_limit_retries: config.rate_limit_retries,
            rate_limit_backoff: config.rate_limit_backoff(),
        }
    }

    /// Explain every slide. The result has one entry per input slide, in
    /// input order, whatever order the requests complete in.
    pub async fn run(&self, slides: &[SlideText]) -> Vec<SlideExplanation> {
        log::debug!(
            "Requesting {} explanations (max {} in flight)",
            slides.len(),
            self.permits.available_permits()
        );
        join_all(slides.iter().map(|slide| self.explain_slide(slide))).await
    }

    async fn explain_slide(&self, slide: &SlideText) -> SlideExplanation {
        let prompt = self.prompts.build(slide.number, &slide.text);

        match self.request_with_retries(slide.number, &prompt).await {
            Ok(text) => {
                log::debug!("Slide {} explained ({} chars)", slide.number, text.len());
                SlideExplanation::success(slide.number, text)
            }
            Err(e) => {
                log::warn!("Slide {}: {}", slide.number, e);
                SlideExplanation::failure(slide.number, e.to_string())
            }
        }
    }

    async fn request_with_retries(&self, slide_number: usize, prompt: &str) -> Result<String, LlmError> {
        let mut attempt = 0;
        loop {
            let result = {
                let _permit = self
                    .permits
                    .acquire()
                    .await
                    .map_err(|e| LlmError::Request(e.to_string()))?;
                log::debug!("Processing slide {}", slide_number);
                self.request_once(prompt).await
            };

            match result {
                Err(LlmError::RateLimited) if attempt < self.rate_limit_retries => {
                    attempt += 1;
                    log::warn!(
                        "Slide {}: rate limited, retrying in {:?} ({}/{})",
                        slide_number,
                        self.rate_limit_backoff,
                        attempt,
                        self.rate_limit_retries
                    );
                    tokio::time::sleep(self.rate_limit_backoff).await;
                }
                other => return other,
            }
        }
    }

    /// One attempt, abandoned once the timeout expires. The clock starts
    /// after a permit is held.
    async fn request_once(&self, prompt: &str) -> Result<String, LlmError> {
        match tokio::time::timeout(self.request_timeout, self.explainer.explain(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout(self.request_timeout)),
        }
    }
}
