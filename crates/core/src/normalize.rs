//! Text normalization for slide content.
//!
//! Slide text arrives with whatever layout the author gave it: tabs, hard
//! line breaks, runs of spaces, stray control characters. Before a prompt is
//! built every slide is reduced to single-spaced text, and slides that end up
//! empty are dropped.

use crate::types::{Presentation, Slide};
use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Regex matching any run of whitespace or control characters.
static WHITESPACE_COLLAPSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\p{Cc}]+").unwrap());

/// Normalized text of a slide that has something to explain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideText {
    /// 1-based slide number in the source deck.
    pub number: usize,
    /// Single-spaced slide text. Never empty.
    pub text: String,
}

/// Text normalizer for slide content.
#[derive(Debug, Clone, Default)]
pub struct TextNormalizer;

impl TextNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize a piece of text.
    ///
    /// - Composes Unicode to NFC
    /// - Collapses runs of whitespace and control characters to one space
    /// - Trims leading/trailing whitespace
    pub fn normalize(&self, text: &str) -> String {
        let composed: String = text.nfc().collect();

        WHITESPACE_COLLAPSE_REGEX
            .replace_all(&composed, " ")
            .trim()
            .to_string()
    }

    /// Normalized text of a whole slide: every fragment normalized, empty
    /// fragments dropped, the rest joined by a single space.
    pub fn slide_text(&self, slide: &Slide) -> String {
        slide
            .texts()
            .map(|t| self.normalize(t))
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Normalized text of every slide that has any, in slide order.
    pub fn non_empty_slides(&self, presentation: &Presentation) -> Vec<SlideText> {
        presentation
            .slides
            .iter()
            .filter_map(|slide| {
                let text = self.slide_text(slide);
                if text.is_empty() {
                    log::debug!("Skipping slide {} (no text)", slide.number);
                    None
                } else {
                    Some(SlideText {
                        number: slide.number,
                        text,
                    })
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PresentationFormat;

    #[test]
    fn test_collapse_whitespace() {
        let normalizer = TextNormalizer::new();

        assert_eq!(normalizer.normalize("Hello    world"), "Hello world");
        assert_eq!(normalizer.normalize("  trim me  "), "trim me");
        assert_eq!(normalizer.normalize("tab\there"), "tab here");
    }

    #[test]
    fn test_tabs_newlines_and_repeated_spaces() {
        let normalizer = TextNormalizer::new();

        assert_eq!(
            normalizer.normalize("\tIntro\n\nto   Rust\r\n\t ownership  "),
            "Intro to Rust ownership"
        );
    }

    #[test]
    fn test_control_characters_become_spaces() {
        let normalizer = TextNormalizer::new();

        assert_eq!(normalizer.normalize("a\u{0B}b\u{0C}c\u{07}d"), "a b c d");
        assert_eq!(normalizer.normalize("non\u{A0}breaking"), "non breaking");
    }

    #[test]
    fn test_whitespace_only_is_empty() {
        let normalizer = TextNormalizer::new();

        assert_eq!(normalizer.normalize(" \t\r\n "), "");
        assert_eq!(normalizer.normalize(""), "");
    }

    #[test]
    fn test_unicode_composition() {
        let normalizer = TextNormalizer::new();
        // "e" followed by a combining acute accent
        assert_eq!(normalizer.normalize("caf\u{0065}\u{0301}"), "caf\u{00E9}");
    }

    #[test]
    fn test_slide_text_joins_fragments() {
        let normalizer = TextNormalizer::new();
        let mut slide = Slide::new(1);
        slide.add_fragment("Title\n");
        slide.add_fragment("   ");
        slide.add_fragment("First point\nSecond\tpoint");

        assert_eq!(
            normalizer.slide_text(&slide),
            "Title First point Second point"
        );
    }

    #[test]
    fn test_non_empty_slides_skips_blank_slides() {
        let normalizer = TextNormalizer::new();
        let mut presentation = Presentation::new("deck.pptx", PresentationFormat::Pptx);

        let mut first = Slide::new(1);
        first.add_fragment("Welcome");
        presentation.add_slide(first);

        let mut blank = Slide::new(2);
        blank.add_fragment(" \n\t ");
        presentation.add_slide(blank);

        presentation.add_slide(Slide::new(3));

        let mut last = Slide::new(4);
        last.add_fragment("Questions?");
        presentation.add_slide(last);

        let slides = normalizer.non_empty_slides(&presentation);
        assert_eq!(
            slides,
            vec![
                SlideText {
                    number: 1,
                    text: "Welcome".to_string()
                },
                SlideText {
                    number: 4,
                    text: "Questions?".to_string()
                },
            ]
        );
    }
}
