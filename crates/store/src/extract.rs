//! Text extraction for binary document formats.
//!
//! - PDF: the text of each page, pages joined by blank lines
//! - DOCX: non-empty paragraphs of `word/document.xml`, joined by blank lines
//! - PPTX: one `--- Slide N ---` block per slide with the text of each shape
//!
//! A file that cannot be opened as its format is a [`StoreError::Decode`].

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::fmt::Display;
use std::io::{Cursor, Read};
use studybuddy_core::error::StoreError;
use tracing::warn;
use zip::ZipArchive;

fn unreadable<E: Display>(format: &'static str) -> impl FnOnce(E) -> StoreError {
    move |e| StoreError::Decode(format!("Could not read {format} file: {e}"))
}

/// Text of every page that has any, in page order.
pub fn pdf_text(bytes: &[u8]) -> Result<String, StoreError> {
    let doc = lopdf::Document::load_mem(bytes).map_err(unreadable("PDF"))?;

    let mut pages = Vec::new();
    for page_number in doc.get_pages().keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(text) if !text.trim().is_empty() => pages.push(text.trim_end().to_string()),
            Ok(_) => {}
            Err(e) => warn!(page = page_number, error = %e, "Skipping unreadable PDF page"),
        }
    }
    Ok(pages.join("\n\n"))
}

/// Non-empty paragraphs of a Word document.
pub fn docx_text(bytes: &[u8]) -> Result<String, StoreError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(unreadable("DOCX"))?;
    let xml = read_part(&mut archive, "word/document.xml", "DOCX")?;
    let paragraphs = docx_paragraphs(&xml).map_err(unreadable("DOCX"))?;

    Ok(paragraphs
        .into_iter()
        .filter(|p| !p.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n\n"))
}

/// One block per slide, in slide order.
pub fn pptx_text(bytes: &[u8]) -> Result<String, StoreError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(unreadable("PPTX"))?;

    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| {
            let number = name
                .strip_prefix("ppt/slides/slide")?
                .strip_suffix(".xml")?
                .parse()
                .ok()?;
            Some((number, name.to_string()))
        })
        .collect();
    slides.sort_by_key(|(number, _)| *number);

    let mut blocks = Vec::with_capacity(slides.len());
    for (index, (_, name)) in slides.iter().enumerate() {
        let xml = read_part(&mut archive, name, "PPTX")?;
        let shapes = slide_shape_texts(&xml).map_err(unreadable("PPTX"))?;

        let mut block = vec![format!("--- Slide {} ---", index + 1)];
        block.extend(shapes.into_iter().filter(|s| !s.trim().is_empty()));
        blocks.push(block.join("\n"));
    }
    Ok(blocks.join("\n\n"))
}

fn read_part(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    name: &str,
    format: &'static str,
) -> Result<String, StoreError> {
    let mut part = archive.by_name(name).map_err(unreadable(format))?;
    let mut xml = String::new();
    part.read_to_string(&mut xml).map_err(unreadable(format))?;
    Ok(xml)
}

/// Every `w:p` paragraph's text. Tabs and breaks inside runs are kept.
fn docx_paragraphs(xml: &str) -> Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => current.clear(),
                b"w:r" => in_run = true,
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" if in_run => current.push('\t'),
                b"w:br" | b"w:cr" if in_run => current.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text => current.push_str(&t.unescape()?),
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:r" => in_run = false,
                b"w:p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(paragraphs)
}

/// Text of each `p:sp` shape on a slide, its paragraphs joined by newlines.
fn slide_shape_texts(xml: &str) -> Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut shapes = Vec::new();
    let mut shape: Option<Vec<String>> = None;
    let mut paragraph = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"p:sp" => shape = Some(Vec::new()),
                b"a:p" => paragraph.clear(),
                b"a:t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"a:br" => paragraph.push('\n'),
                b"a:p" => {
                    if let Some(paragraphs) = shape.as_mut() {
                        paragraphs.push(String::new());
                    }
                }
                _ => {}
            },
            Event::Text(t) if in_text => paragraph.push_str(&t.unescape()?),
            Event::End(e) => match e.name().as_ref() {
                b"a:t" => in_text = false,
                b"a:p" => {
                    if let Some(paragraphs) = shape.as_mut() {
                        paragraphs.push(std::mem::take(&mut paragraph));
                    }
                }
                b"p:sp" => {
                    if let Some(paragraphs) = shape.take() {
                        shapes.push(paragraphs.join("\n"));
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(shapes)
}
