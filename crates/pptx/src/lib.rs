//! PPTX (Office Open XML) loader for slide explanations.
//!
//! Parses .pptx files which are ZIP archives containing XML documents, and
//! extracts the text of every text-bearing shape on each slide.

pub mod loader;
pub mod parser;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use loader::load_presentation;
pub use parser::PptxParser;
