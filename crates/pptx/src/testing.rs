//! In-memory deck builders for tests.
//!
//! Enabled for this crate's own tests and, through the `testing` feature,
//! for dependents that need real `.pptx` files as fixtures.

use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::ZipWriter;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#;

const SLIDE_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
const MASTER_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";

/// Wrap shape XML in a slide document.
pub fn slide_xml(shapes: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree>{}</p:spTree></p:cSld></p:sld>"#,
        shapes
    )
}

/// A text box at the given offset, one `<a:p>` per paragraph.
pub fn text_shape(x: i64, y: i64, paragraphs: &[&str]) -> String {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<a:p><a:r><a:rPr lang=\"en-US\"/><a:t>{}</a:t></a:r></a:p>", p))
        .collect();
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="TextBox"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="100" cy="100"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/>{}</p:txBody></p:sp>"#,
        x, y, body
    )
}

/// `ppt/_rels/presentation.xml.rels` with one slide relationship per
/// `(id, target)` pair, plus a slide master.
pub fn presentation_rels(slides: &[(&str, &str)]) -> String {
    let mut rels = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    rels.push_str(&format!(
        r#"<Relationship Id="rId100" Type="{}" Target="slideMasters/slideMaster1.xml"/>"#,
        MASTER_REL_TYPE
    ));
    for (id, target) in slides {
        rels.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            id, SLIDE_REL_TYPE, target
        ));
    }
    rels.push_str("</Relationships>");
    rels
}

/// `ppt/presentation.xml` listing the given relationship ids as slides.
/// `None` leaves out the slide id list entirely.
pub fn presentation_xml(slide_rel_ids: Option<&[&str]>) -> String {
    let id_list = slide_rel_ids
        .map(|ids| {
            let entries: String = ids
                .iter()
                .enumerate()
                .map(|(pos, id)| format!(r#"<p:sldId id="{}" r:id="{}"/>"#, 256 + pos, id))
                .collect();
            format!("<p:sldIdLst>{}</p:sldIdLst>", entries)
        })
        .unwrap_or_default();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId100"/></p:sldMasterIdLst>{}</p:presentation>"#,
        id_list
    )
}

/// Zip the given parts, plus `[Content_Types].xml`, into a package.
pub fn build_package(parts: &[(&str, String)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default();

    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(CONTENT_TYPES.as_bytes()).unwrap();

    for (name, content) in parts {
        zip.start_file(*name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }

    zip.finish().unwrap().into_inner()
}

/// Build a .pptx whose slides appear in `order` (indices into `slides`).
///
/// Slide parts are stored as `slide{i+1}.xml` and the relationship ids are
/// assigned in reverse, so ordering must come from the slide id list.
pub fn build_deck_with_order(slides: &[String], order: &[usize]) -> Vec<u8> {
    let rel_id = |idx: usize| format!("rId{}", slides.len() + 1 - idx);

    let ids: Vec<String> = (0..slides.len()).map(rel_id).collect();
    let targets: Vec<String> = (1..=slides.len())
        .map(|n| format!("slides/slide{}.xml", n))
        .collect();
    let rels: Vec<(&str, &str)> = ids
        .iter()
        .zip(&targets)
        .map(|(id, target)| (id.as_str(), target.as_str()))
        .collect();

    let shown: Vec<&str> = order.iter().map(|&idx| ids[idx].as_str()).collect();

    let mut parts = vec![
        ("ppt/_rels/presentation.xml.rels", presentation_rels(&rels)),
        ("ppt/presentation.xml", presentation_xml(Some(shown.as_slice()))),
    ];
    let names: Vec<String> = (1..=slides.len())
        .map(|n| format!("ppt/slides/slide{}.xml", n))
        .collect();
    for (name, slide) in names.iter().zip(slides) {
        parts.push((name.as_str(), slide.clone()));
    }

    build_package(&parts)
}

/// Build a .pptx with slides in their natural order.
pub fn build_deck(slides: &[String]) -> Vec<u8> {
    let order: Vec<usize> = (0..slides.len()).collect();
    build_deck_with_order(slides, &order)
}

/// A deck with one slide per entry; each entry lists the text boxes on that
/// slide, top to bottom.
pub fn deck(slides: &[&[&str]]) -> Vec<u8> {
    let slides: Vec<String> = slides
        .iter()
        .map(|boxes| {
            let shapes: String = boxes
                .iter()
                .enumerate()
                .map(|(i, text)| text_shape(0, i as i64 * 1000, &[*text]))
                .collect();
            slide_xml(&shapes)
        })
        .collect();
    build_deck(&slides)
}

/// Write [`deck`] to `path`.
pub fn write_deck(path: &Path, slides: &[&[&str]]) {
    std::fs::write(path, deck(slides)).unwrap();
}
