//! Domain types for representing a loaded presentation.

/// Represents an entire presentation with its extracted text.
#[derive(Debug, Clone)]
pub struct Presentation {
    /// Original filename (without path).
    pub filename: String,

    /// Detected format of the source file.
    pub format: PresentationFormat,

    /// Slides in presentation order.
    pub slides: Vec<Slide>,
}

impl Presentation {
    /// Create a new presentation with the given filename and format.
    pub fn new(filename: impl Into<String>, format: PresentationFormat) -> Self {
        Self {
            filename: filename.into(),
            format,
            slides: Vec::new(),
        }
    }

    /// Add a slide to the presentation.
    pub fn add_slide(&mut self, slide: Slide) {
        self.slides.push(slide);
    }

    /// Number of slides, including empty ones.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }
}

/// The format of the source presentation file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationFormat {
    /// Modern PPTX (Office Open XML).
    Pptx,
    /// Legacy PPT (OLE/CFB binary). Recognized only so it can be rejected
    /// with a clear message.
    LegacyPpt,
}

impl PresentationFormat {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pptx" => Some(Self::Pptx),
            "ppt" => Some(Self::LegacyPpt),
            _ => None,
        }
    }

    /// Detect format from file magic bytes.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        // PPTX is a ZIP file (PK\x03\x04)
        if bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04]) {
            return Some(Self::Pptx);
        }

        // PPT is an OLE/CFB file (D0 CF 11 E0 A1 B1 1A E1)
        if bytes.len() >= 8
            && bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1])
        {
            return Some(Self::LegacyPpt);
        }

        None
    }
}

/// A single slide: its position in the deck and the text of its shapes.
#[derive(Debug, Clone)]
pub struct Slide {
    /// 1-based slide number.
    pub number: usize,

    /// Text from each text-bearing shape, in reading order.
    pub fragments: Vec<TextFragment>,
}

impl Slide {
    /// Create a new slide with the given number.
    pub fn new(number: usize) -> Self {
        Self {
            number,
            fragments: Vec::new(),
        }
    }

    /// Add a text fragment to this slide.
    pub fn add_fragment(&mut self, text: impl Into<String>) {
        self.fragments.push(TextFragment::new(text));
    }

    /// Add a text fragment with position information.
    pub fn add_fragment_with_position(&mut self, text: impl Into<String>, y: f64, x: f64) {
        self.fragments.push(TextFragment::with_position(text, y, x));
    }

    /// Sort fragments by position (top-to-bottom, then left-to-right).
    ///
    /// Fragments without a position keep their relative order after the
    /// positioned ones.
    pub fn sort_by_position(&mut self) {
        self.fragments.sort_by(|a, b| {
            let key_a = (a.y_position, a.x_position);
            let key_b = (b.y_position, b.x_position);
            match (key_a, key_b) {
                ((Some(ya), xa), (Some(yb), xb)) => {
                    let y_cmp = ya.partial_cmp(&yb).unwrap_or(std::cmp::Ordering::Equal);
                    if y_cmp == std::cmp::Ordering::Equal {
                        xa.partial_cmp(&xb).unwrap_or(std::cmp::Ordering::Equal)
                    } else {
                        y_cmp
                    }
                }
                ((Some(_), _), (None, _)) => std::cmp::Ordering::Less,
                ((None, _), (Some(_), _)) => std::cmp::Ordering::Greater,
                _ => std::cmp::Ordering::Equal,
            }
        });
    }

    /// Raw fragment texts, in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.fragments.iter().map(|f| f.text.as_str())
    }
}

/// Text content from one shape's text frame.
#[derive(Debug, Clone)]
pub struct TextFragment {
    /// The text, with paragraphs separated by newlines.
    pub text: String,

    /// Y position for ordering (top-to-bottom). None if unknown.
    pub y_position: Option<f64>,

    /// X position for ordering (left-to-right). None if unknown.
    pub x_position: Option<f64>,
}

impl TextFragment {
    /// Create a fragment without position info.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            y_position: None,
            x_position: None,
        }
    }

    /// Create a fragment with position info.
    pub fn with_position(text: impl Into<String>, y: f64, x: f64) -> Self {
        Self {
            text: text.into(),
            y_position: Some(y),
            x_position: Some(x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_magic() {
        assert_eq!(
            PresentationFormat::from_magic(b"PK\x03\x04rest"),
            Some(PresentationFormat::Pptx)
        );
        assert_eq!(
            PresentationFormat::from_magic(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]),
            Some(PresentationFormat::LegacyPpt)
        );
        assert_eq!(PresentationFormat::from_magic(b"%PDF-1.7"), None);
        assert_eq!(PresentationFormat::from_magic(b"PK"), None);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(PresentationFormat::from_extension("PPTX"), Some(PresentationFormat::Pptx));
        assert_eq!(PresentationFormat::from_extension("ppt"), Some(PresentationFormat::LegacyPpt));
        assert_eq!(PresentationFormat::from_extension("key"), None);
    }

    #[test]
    fn test_sort_by_position() {
        let mut slide = Slide::new(1);
        slide.add_fragment("unplaced");
        slide.add_fragment_with_position("bottom", 500.0, 0.0);
        slide.add_fragment_with_position("top right", 100.0, 300.0);
        slide.add_fragment_with_position("top left", 100.0, 10.0);

        slide.sort_by_position();

        let texts: Vec<&str> = slide.texts().collect();
        assert_eq!(texts, vec!["top left", "top right", "bottom", "unplaced"]);
    }
}
