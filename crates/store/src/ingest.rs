//! Turning uploads into [`Material`]s.
//!
//! Text and markdown are decoded as UTF-8; PDF, DOCX and PPTX go through
//! [`crate::extract`]. Files of any other type are rejected with
//! [`StoreError::UnsupportedFormat`].

use chrono::Utc;
use std::path::Path;
use studybuddy_core::error::StoreError;
use studybuddy_core::material::{Material, MaterialType, new_material_id};

use crate::extract::{docx_text, pdf_text, pptx_text};

/// Extract plain text from an uploaded file's bytes.
pub fn extract_text(bytes: &[u8], kind: MaterialType) -> Result<String, StoreError> {
    match kind {
        MaterialType::Txt | MaterialType::Markdown => String::from_utf8(bytes.to_vec())
            .map_err(|e| StoreError::Decode(format!("File is not valid UTF-8: {e}"))),
        MaterialType::Pdf => pdf_text(bytes),
        MaterialType::Docx => docx_text(bytes),
        MaterialType::Pptx => pptx_text(bytes),
        MaterialType::Unknown => Err(StoreError::UnsupportedFormat(
            "Unknown file format".into(),
        )),
    }
}

/// Build a material from an uploaded file.
///
/// The title defaults to the file name without its extension.
pub fn material_from_file(
    filename: &str,
    bytes: &[u8],
    title: Option<&str>,
) -> Result<Material, StoreError> {
    let kind = MaterialType::from_filename(filename);
    let content = extract_text(bytes, kind)?;

    let title = match title.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => Path::new(filename)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| filename.to_string()),
    };

    Ok(Material {
        id: new_material_id(),
        title,
        kind,
        content,
        created_at: Utc::now(),
        metadata: format!("filename:{filename},size:{}", bytes.len()),
    })
}

/// Build a material from pasted text.
pub fn material_from_text(text: impl Into<String>, title: impl Into<String>) -> Material {
    Material {
        id: new_material_id(),
        title: title.into(),
        kind: MaterialType::Txt,
        content: text.into(),
        created_at: Utc::now(),
        metadata: "source:direct_text".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::fixtures;

    #[test]
    fn text_file_uses_stem_as_title() {
        let material = material_from_file("bio_notes.txt", b"Cells divide", None).unwrap();
        assert_eq!(material.title, "bio_notes");
        assert_eq!(material.kind, MaterialType::Txt);
        assert_eq!(material.content, "Cells divide");
        assert_eq!(material.metadata, "filename:bio_notes.txt,size:12");
        assert_eq!(material.id.len(), 8);
    }

    #[test]
    fn custom_title_wins() {
        let material = material_from_file("ch1.md", b"# Heading", Some("Chapter One")).unwrap();
        assert_eq!(material.title, "Chapter One");
        assert_eq!(material.kind, MaterialType::Markdown);

        let blank = material_from_file("ch1.md", b"# Heading", Some("  ")).unwrap();
        assert_eq!(blank.title, "ch1");
    }

    #[test]
    fn invalid_utf8_is_a_decode_error() {
        let err = material_from_file("notes.txt", &[0xff, 0xfe, 0x00], None).unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }

    #[test]
    fn unknown_formats_are_unsupported() {
        for name in ["archive.zip", "README", "photo.png"] {
            let err = material_from_file(name, b"PK\x03\x04", None).unwrap_err();
            assert!(matches!(err, StoreError::UnsupportedFormat(_)), "{name}");
        }
    }

    #[test]
    fn pdf_upload_is_extracted() {
        let bytes = fixtures::pdf(&["Lecture 3: Enzymes"]);
        let material = material_from_file("lecture.pdf", &bytes, None).unwrap();
        assert_eq!(material.kind, MaterialType::Pdf);
        assert_eq!(material.title, "lecture");
        assert!(material.content.contains("Lecture 3: Enzymes"));
        assert_eq!(material.metadata, format!("filename:lecture.pdf,size:{}", bytes.len()));
    }

    #[test]
    fn docx_upload_is_extracted() {
        let bytes = fixtures::docx(
            "<w:p><w:r><w:t>Osmosis</w:t></w:r></w:p><w:p><w:r><w:t>Water moves across membranes</w:t></w:r></w:p>",
        );
        let material = material_from_file("notes.docx", &bytes, Some("Week 2")).unwrap();
        assert_eq!(material.kind, MaterialType::Docx);
        assert_eq!(material.title, "Week 2");
        assert_eq!(material.content, "Osmosis\n\nWater moves across membranes");
    }

    #[test]
    fn pptx_upload_is_extracted() {
        let slide = fixtures::slide(&fixtures::text_shape(&["Krebs cycle"]));
        let bytes = fixtures::zip_with(&[("ppt/slides/slide1.xml", slide.as_str())]);
        let material = material_from_file("slides.pptx", &bytes, None).unwrap();
        assert_eq!(material.kind, MaterialType::Pptx);
        assert_eq!(material.content, "--- Slide 1 ---\nKrebs cycle");
        assert_eq!(material.word_count(), 6);
    }

    #[test]
    fn corrupt_office_file_is_a_decode_error() {
        for name in ["lecture.pdf", "essay.docx", "slides.pptx"] {
            let err = material_from_file(name, b"PK\x03\x04", None).unwrap_err();
            assert!(matches!(err, StoreError::Decode(_)), "{name}");
        }
    }

    #[test]
    fn pasted_text() {
        let material = material_from_text("Photosynthesis converts light", "Biology");
        assert_eq!(material.title, "Biology");
        assert_eq!(material.kind, MaterialType::Txt);
        assert_eq!(material.metadata, "source:direct_text");
    }
}
