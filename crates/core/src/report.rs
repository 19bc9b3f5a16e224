//! Explanation results and the JSON report written for each deck.
//!
//! The report is a JSON array with one entry per explained slide, in slide
//! order:
//!
//! ```json
//! [
//!   { "slide": 1, "explanation": "This slide introduces..." },
//!   { "slide": 3, "error": "request timed out after 30s" }
//! ]
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Extension of the report file.
pub const REPORT_EXTENSION: &str = "json";

/// Outcome of explaining one slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Explanation {
    /// The model's reply.
    #[serde(rename = "explanation")]
    Success(String),
    /// Why no explanation could be obtained.
    #[serde(rename = "error")]
    Failure(String),
}

impl Explanation {
    /// Whether the slide was explained.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// One slide's entry in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideExplanation {
    /// 1-based slide number in the source deck.
    pub slide: usize,

    #[serde(flatten)]
    pub outcome: Explanation,
}

impl SlideExplanation {
    pub fn success(slide: usize, text: impl Into<String>) -> Self {
        Self {
            slide,
            outcome: Explanation::Success(text.into()),
        }
    }

    pub fn failure(slide: usize, message: impl Into<String>) -> Self {
        Self {
            slide,
            outcome: Explanation::Failure(message.into()),
        }
    }
}

/// All explanations for one presentation.
#[derive(Debug, Clone)]
pub struct ExplanationReport {
    /// Filename of the source deck.
    pub source: String,

    /// Entries in slide order.
    pub slides: Vec<SlideExplanation>,
}

impl ExplanationReport {
    /// Build a report, ordering entries by slide number.
    pub fn new(source: impl Into<String>, mut slides: Vec<SlideExplanation>) -> Self {
        slides.sort_by_key(|s| s.slide);
        Self {
            source: source.into(),
            slides,
        }
    }

    /// Number of slides that failed.
    pub fn failure_count(&self) -> usize {
        self.slides.iter().filter(|s| !s.outcome.is_success()).count()
    }

    /// Serialize the entries as a pretty-printed JSON array.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.slides)?)
    }
}

/// Determine where the report for `input` goes.
///
/// The report keeps the input's base name with the extension replaced by
/// `.json`, next to the input unless an output directory is given.
pub fn output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");

    let output_filename = format!("{}.{}", stem, REPORT_EXTENSION);

    match output_dir {
        Some(dir) => dir.join(output_filename),
        None => match input.parent() {
            Some(parent) => parent.join(output_filename),
            None => PathBuf::from(output_filename),
        },
    }
}

/// Write a report to `path`, creating the parent directory if needed.
pub fn write_report(path: &Path, report: &ExplanationReport) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut json = report.to_json()?;
    json.push('\n');
    fs::write(path, json)?;

    log::info!("Explanation saved: {}", path.display());
    Ok(())
}
