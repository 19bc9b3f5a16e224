//! Open a presentation file from disk.

use crate::parser::PptxParser;
use explainer_core::{Error, Presentation, PresentationFormat, Result};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

/// Load a presentation from `path`.
///
/// Fails with [`Error::FileNotFound`] when the path does not exist and with
/// [`Error::UnsupportedFormat`] when it is not a PPTX archive.
pub fn load_presentation(path: &Path) -> Result<Presentation> {
    if !path.is_file() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    // Read magic bytes to detect format
    let mut magic = Vec::with_capacity(8);
    reader.by_ref().take(8).read_to_end(&mut magic)?;
    reader.rewind()?;

    match PresentationFormat::from_magic(&magic) {
        Some(PresentationFormat::Pptx) => {}
        Some(PresentationFormat::LegacyPpt) => {
            return Err(Error::UnsupportedFormat(format!(
                "{} is a legacy binary .ppt file; save it as .pptx first",
                path.display()
            )));
        }
        None => {
            return Err(Error::UnsupportedFormat(format!(
                "{} is not a PPTX archive",
                path.display()
            )));
        }
    }

    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown");

    log::debug!("Parsing {} as PPTX", path.display());
    PptxParser::new().parse(reader, filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{build_deck, slide_xml, text_shape};

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.pptx");

        let err = load_presentation(&path).unwrap_err();
        assert!(matches!(err, Error::FileNotFound(p) if p == path));
    }

    #[test]
    fn test_directory_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_presentation(dir.path()).unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }

    #[test]
    fn test_plain_text_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.pptx");
        std::fs::write(&path, "just some notes").unwrap();

        let err = load_presentation(&path).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn test_tiny_file_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.pptx");
        std::fs::write(&path, b"PK").unwrap();

        let err = load_presentation(&path).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn test_legacy_ppt_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.ppt");
        std::fs::write(&path, [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1, 0, 0]).unwrap();

        let err = load_presentation(&path).unwrap_err();
        match err {
            Error::UnsupportedFormat(msg) => assert!(msg.contains("legacy")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lecture.pptx");
        std::fs::write(
            &path,
            build_deck(&[slide_xml(&text_shape(0, 0, &["Hello"]))]),
        )
        .unwrap();

        let presentation = load_presentation(&path).unwrap();
        assert_eq!(presentation.filename, "lecture.pptx");
        assert_eq!(presentation.slide_count(), 1);
    }
}
