//! One deck in, one report out.

use anyhow::{Context, Result};
use explainer_core::{output_path, write_report, ExplanationReport, TextNormalizer};
use explainer_llm::ExplanationDispatcher;
use explainer_pptx::load_presentation;
use std::path::{Path, PathBuf};

/// Load, normalize, explain and write: the full run for a single deck.
pub struct Pipeline {
    normalizer: TextNormalizer,
    dispatcher: ExplanationDispatcher,
    output_dir: Option<PathBuf>,
}

impl Pipeline {
    pub fn new(dispatcher: ExplanationDispatcher, output_dir: Option<PathBuf>) -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            dispatcher,
            output_dir,
        }
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    /// Where the report for `input` is written.
    pub fn report_path(&self, input: &Path) -> PathBuf {
        output_path(input, self.output_dir())
    }

    /// Explain every non-empty slide of `input`.
    ///
    /// Fails only if the deck cannot be loaded, before any request is sent.
    /// Per-slide failures are recorded in the report.
    pub async fn explain_file(&self, input: &Path) -> Result<ExplanationReport> {
        let presentation = load_presentation(input)
            .with_context(|| format!("Failed to load {}", input.display()))?;

        let slides = self.normalizer.non_empty_slides(&presentation);
        log::info!(
            "{}: {} slides, {} with text",
            presentation.filename,
            presentation.slide_count(),
            slides.len()
        );

        let results = self.dispatcher.run(&slides).await;
        let report = ExplanationReport::new(presentation.filename, results);

        if report.failure_count() > 0 {
            log::warn!(
                "{}: {} of {} slides could not be explained",
                report.source,
                report.failure_count(),
                report.slides.len()
            );
        }

        Ok(report)
    }

    /// Explain `input` and write its report. Returns the report path.
    pub async fn process_to_file(&self, input: &Path) -> Result<PathBuf> {
        let report = self.explain_file(input).await?;
        let path = self.report_path(input);
        write_report(&path, &report)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}
