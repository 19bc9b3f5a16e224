//! PPTX file parser implementation.

use explainer_core::{Error, Presentation, PresentationFormat, Result, Slide};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Read, Seek};
use zip::result::ZipError;
use zip::ZipArchive;

const PRESENTATION_PATH: &str = "ppt/presentation.xml";
const PRESENTATION_RELS_PATH: &str = "ppt/_rels/presentation.xml.rels";

/// Parser for PPTX (Office Open XML) files.
pub struct PptxParser;

impl PptxParser {
    /// Create a new PPTX parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse a PPTX file from a reader.
    pub fn parse<R: Read + Seek>(&self, reader: R, filename: &str) -> Result<Presentation> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::UnsupportedFormat(format!("not a PPTX archive: {}", e)))?;

        let mut presentation = Presentation::new(filename, PresentationFormat::Pptx);

        let slide_order = self.get_slide_order(&mut archive)?;
        log::debug!("{}: {} slides", filename, slide_order.len());

        for (idx, slide_path) in slide_order.iter().enumerate() {
            let slide = match slide_path {
                Some(path) => self.parse_slide(&mut archive, path, idx + 1)?,
                // Keep the ordinal so later slides keep their numbers.
                None => Slide::new(idx + 1),
            };
            presentation.add_slide(slide);
        }

        Ok(presentation)
    }

    /// Get the ordered list of slide part paths.
    ///
    /// The slide id list in presentation.xml is authoritative. Decks that
    /// lack one fall back to the numbers in the slide part names. An id with
    /// no matching relationship still takes a position, as `None`.
    fn get_slide_order<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
    ) -> Result<Vec<Option<String>>> {
        let presentation_xml = self.read_package_part(archive, PRESENTATION_PATH)?;
        let rels_xml = self.read_package_part(archive, PRESENTATION_RELS_PATH)?;

        let slide_rels = parse_slide_relationships(&rels_xml)?;
        let slide_ids = parse_slide_id_list(&presentation_xml)?;

        if slide_ids.is_empty() {
            log::debug!("No slide id list; ordering slides by part name");
            let mut slides: Vec<(String, Option<usize>)> = slide_rels
                .into_values()
                .map(|path| {
                    let num = extract_slide_number(&path);
                    (path, num)
                })
                .collect();

            slides.sort_by(|a, b| match (a.1, b.1) {
                (Some(na), Some(nb)) => na.cmp(&nb),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => a.0.cmp(&b.0),
            });

            return Ok(slides.into_iter().map(|(path, _)| Some(path)).collect());
        }

        let order = slide_ids
            .iter()
            .enumerate()
            .map(|(idx, rel_id)| {
                let path = slide_rels.get(rel_id).cloned();
                if path.is_none() {
                    log::warn!(
                        "Slide {}: relationship '{}' not found; treating as empty",
                        idx + 1,
                        rel_id
                    );
                }
                path
            })
            .collect();
        Ok(order)
    }

    /// Parse a single slide from the archive.
    fn parse_slide<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        slide_path: &str,
        slide_number: usize,
    ) -> Result<Slide> {
        let mut slide = Slide::new(slide_number);

        let content = match self.read_file_from_archive(archive, slide_path) {
            Ok(content) => content,
            Err(Error::PptxParseError(msg)) => {
                // Keep the ordinal so later slides keep their numbers.
                log::warn!("Slide {} unreadable ({}); treating as empty", slide_number, msg);
                return Ok(slide);
            }
            Err(e) => return Err(e),
        };

        for shape in extract_shapes_from_xml(&content) {
            match shape.position {
                Some((x, y)) => slide.add_fragment_with_position(shape.text, y, x),
                None => slide.add_fragment(shape.text),
            }
        }

        // Sort by position (top-to-bottom, left-to-right)
        slide.sort_by_position();

        Ok(slide)
    }

    /// Read a part that every presentation package must contain.
    fn read_package_part<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<String> {
        self.read_file_from_archive(archive, path).map_err(|e| match e {
            Error::PptxParseError(_) => Error::UnsupportedFormat(format!(
                "archive has no '{}'; not a PowerPoint presentation",
                path
            )),
            other => other,
        })
    }

    /// Read a file from the ZIP archive.
    fn read_file_from_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<String> {
        let mut file = archive.by_name(path).map_err(|e| match e {
            ZipError::FileNotFound => {
                Error::PptxParseError(format!("'{}' missing from archive", path))
            }
            other => Error::ZipError(format!("Failed to open '{}': {}", path, other)),
        })?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

        Ok(content)
    }
}

impl Default for PptxParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Text and offset of one shape.
#[derive(Debug, Default)]
struct ShapeInfo {
    text: String,
    position: Option<(f64, f64)>,
}

/// Map of relationship id to slide part path for every slide relationship.
fn parse_slide_relationships(rels_xml: &str) -> Result<HashMap<String, String>> {
    let mut slides = HashMap::new();
    let mut reader = Reader::from_str(rels_xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                let mut rel_type = String::new();
                let mut target = String::new();
                let mut id = String::new();

                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Type" => rel_type = String::from_utf8_lossy(&attr.value).to_string(),
                        b"Target" => target = String::from_utf8_lossy(&attr.value).to_string(),
                        b"Id" => id = String::from_utf8_lossy(&attr.value).to_string(),
                        _ => {}
                    }
                }

                if rel_type.ends_with("/slide") {
                    slides.insert(id, resolve_target(&target));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing relationships: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(slides)
}

/// Relationship ids of `<p:sldId>` entries, in presentation order.
fn parse_slide_id_list(presentation_xml: &str) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    let mut reader = Reader::from_str(presentation_xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"sldId" =>
            {
                if let Some(id) = relationship_id(e) {
                    ids.push(id);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing presentation.xml: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(ids)
}

/// The namespaced `r:id` attribute of an element.
fn relationship_id(e: &BytesStart) -> Option<String> {
    e.attributes().flatten().find_map(|attr| {
        let key = attr.key.as_ref();
        // Plain `id` is the numeric slide id; we want the prefixed one.
        if key != b"id" && local_name(key) == b"id" {
            Some(String::from_utf8_lossy(&attr.value).to_string())
        } else {
            None
        }
    })
}

/// Turn a relationship target into a path inside the archive.
fn resolve_target(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut parts: Vec<&str> = vec!["ppt"];
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

/// Extract shapes with text and position from slide XML.
///
/// Only `<a:t>` run text inside a shape's `<p:txBody>` is collected.
/// Paragraphs and `<a:br/>` become newlines.
fn extract_shapes_from_xml(xml_content: &str) -> Vec<ShapeInfo> {
    let mut shapes = Vec::new();
    let mut reader = Reader::from_str(xml_content);
    // Run text must keep its spaces: "Hello " + "world".
    reader.trim_text(false);

    let mut current_shape: Option<ShapeInfo> = None;
    let mut in_text_body = false;
    let mut in_run_text = false;
    let mut paragraphs = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"sp" => {
                    current_shape = Some(ShapeInfo::default());
                    paragraphs = 0;
                }
                b"off" => set_offset(&mut current_shape, e),
                b"txBody" if current_shape.is_some() => in_text_body = true,
                b"p" if in_text_body => {
                    if let Some(ref mut shape) = current_shape {
                        if paragraphs > 0 {
                            shape.text.push('\n');
                        }
                    }
                    paragraphs += 1;
                }
                b"t" if in_text_body => in_run_text = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match local_name(e.name().as_ref()) {
                b"off" => set_offset(&mut current_shape, e),
                b"br" if in_text_body => {
                    if let Some(ref mut shape) = current_shape {
                        shape.text.push('\n');
                    }
                }
                b"p" if in_text_body => {
                    // Empty paragraph still separates lines.
                    if let Some(ref mut shape) = current_shape {
                        if paragraphs > 0 {
                            shape.text.push('\n');
                        }
                    }
                    paragraphs += 1;
                }
                _ => {}
            },
            Ok(Event::Text(ref e)) => {
                if in_run_text {
                    if let Some(ref mut shape) = current_shape {
                        match e.unescape() {
                            Ok(text) => shape.text.push_str(&text),
                            Err(err) => log::warn!("Bad text escape in slide: {}", err),
                        }
                    }
                }
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"sp" => {
                    if let Some(shape) = current_shape.take() {
                        if !shape.text.trim().is_empty() {
                            shapes.push(shape);
                        }
                    }
                    in_text_body = false;
                    in_run_text = false;
                }
                b"txBody" => in_text_body = false,
                b"t" => in_run_text = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!(
                    "XML parsing error at position {}; keeping text read so far: {}",
                    reader.buffer_position(),
                    e
                );
                break;
            }
            _ => {}
        }
    }

    // A shape left open by a truncated or malformed part.
    if let Some(shape) = current_shape {
        if !shape.text.trim().is_empty() {
            shapes.push(shape);
        }
    }

    shapes
}

/// Record the first `<a:off>` seen in a shape as its position.
fn set_offset(shape: &mut Option<ShapeInfo>, e: &BytesStart) {
    let Some(shape) = shape.as_mut() else {
        return;
    };
    if shape.position.is_some() {
        return;
    }

    let mut x = None;
    let mut y = None;
    for attr in e.attributes().flatten() {
        let value = String::from_utf8_lossy(&attr.value);
        match attr.key.as_ref() {
            b"x" => x = value.parse::<f64>().ok(),
            b"y" => y = value.parse::<f64>().ok(),
            _ => {}
        }
    }
    if let (Some(x), Some(y)) = (x, y) {
        shape.position = Some((x, y));
    }
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Extract a slide number from a string like "slides/slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}
