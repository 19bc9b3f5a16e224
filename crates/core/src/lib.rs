//! Core domain types, text normalization, prompt building and JSON report
//! writing for slide explanations.

pub mod error;
pub mod normalize;
pub mod prompt;
pub mod report;
pub mod types;

pub use error::{Error, Result};
pub use normalize::{SlideText, TextNormalizer};
pub use prompt::PromptBuilder;
pub use report::{output_path, write_report, Explanation, ExplanationReport, SlideExplanation};
pub use types::{Presentation, PresentationFormat, Slide, TextFragment};
