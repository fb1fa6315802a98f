//! Study materials and the store trait the tools read from.
//!
//! A material is an uploaded document reduced to plain text. The store is
//! shared between the HTTP layer (writes) and the tools (reads) and must be
//! safe for concurrent access; every backend synchronizes internally.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::error::StoreError;

/// Returned by whole-store retrieval when nothing has been uploaded.
pub const EMPTY_STORE_CONTENT: &str = "[No materials uploaded yet]";

/// Characters of content shown in a [`MaterialSummary`] preview.
pub const PREVIEW_CHARS: usize = 200;

/// Source format of an uploaded material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialType {
    Pdf,
    Docx,
    Pptx,
    Txt,
    #[serde(rename = "md")]
    Markdown,
    Unknown,
}

impl MaterialType {
    /// Detect the format from a file name's extension.
    pub fn from_filename(filename: &str) -> Self {
        let lower = filename.to_lowercase();
        match lower.rsplit_once('.').map(|(_, ext)| ext) {
            Some("pdf") => Self::Pdf,
            Some("docx") => Self::Docx,
            Some("pptx") => Self::Pptx,
            Some("txt") => Self::Txt,
            Some("md") => Self::Markdown,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Pptx => "pptx",
            Self::Txt => "txt",
            Self::Markdown => "md",
            Self::Unknown => "unknown",
        }
    }

    /// Inverse of [`as_str`](Self::as_str); unrecognised values map to `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s {
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            "pptx" => Self::Pptx,
            "txt" => Self::Txt,
            "md" => Self::Markdown,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for MaterialType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An uploaded study material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    /// Short unique ID (8 hex chars)
    pub id: String,

    /// Display title
    pub title: String,

    /// Source format
    #[serde(rename = "type")]
    pub kind: MaterialType,

    /// Extracted plain text
    pub content: String,

    /// When the material was uploaded
    pub created_at: DateTime<Utc>,

    /// Free-form provenance, e.g. `filename:notes.txt,size:120`
    #[serde(default)]
    pub metadata: String,
}

impl Material {
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }

    /// The `=== title ===` block used when feeding content to the model.
    pub fn as_block(&self) -> String {
        format!("=== {} ===\n{}", self.title, self.content)
    }

    pub fn summary(&self) -> MaterialSummary {
        let content_preview = match self.content.char_indices().nth(PREVIEW_CHARS) {
            Some((cut, _)) => format!("{}...", &self.content[..cut]),
            None => self.content.clone(),
        };
        MaterialSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            kind: self.kind,
            created_at: self.created_at,
            content_preview,
            word_count: self.word_count(),
        }
    }
}

/// Listing view of a material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialSummary {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: MaterialType,
    pub created_at: DateTime<Utc>,
    pub content_preview: String,
    pub word_count: usize,
}

/// One search match: the first occurrence of the query in a material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub material_id: String,
    pub title: String,
    pub snippet: String,
}

/// Generate a short material ID.
pub fn new_material_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

/// Case-insensitive literal search. Returns the byte range of the first
/// match in `haystack`.
pub fn find_ignore_case(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    let needle: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();
    if needle.is_empty() {
        return None;
    }

    'start: for (start, _) in haystack.char_indices() {
        let mut matched = 0;
        for (offset, c) in haystack[start..].char_indices() {
            for lc in c.to_lowercase() {
                if needle.get(matched) != Some(&lc) {
                    continue 'start;
                }
                matched += 1;
            }
            if matched == needle.len() {
                return Some((start, start + offset + c.len_utf8()));
            }
        }
    }
    None
}

/// Up to `radius` characters on each side of where `query` first matches
/// in `content`. Both sides are counted from the start of the match, so a
/// match longer than `radius` is cut.
pub fn find_snippet(content: &str, query: &str, radius: usize) -> Option<String> {
    let (start, _) = find_ignore_case(content, query)?;
    let from = match radius {
        0 => start,
        r => content[..start]
            .char_indices()
            .rev()
            .nth(r - 1)
            .map_or(0, |(i, _)| i),
    };
    let to = content[start..]
        .char_indices()
        .nth(radius)
        .map_or(content.len(), |(i, _)| start + i);
    Some(content[from..to].to_string())
}

/// Storage for uploaded materials.
///
/// `list` returns the newest material first.
#[async_trait]
pub trait MaterialStore: Send + Sync {
    /// Backend name (e.g., "in_memory", "sqlite").
    fn name(&self) -> &str;

    /// Insert or replace a material; returns its ID.
    async fn store(&self, material: Material) -> Result<String, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<Material>, StoreError>;

    async fn list(&self) -> Result<Vec<Material>, StoreError>;

    /// Case-insensitive substring search. An empty `material_ids` slice
    /// searches every material.
    async fn search(
        &self,
        query: &str,
        material_ids: &[String],
    ) -> Result<Vec<SearchHit>, StoreError>;

    async fn delete(&self, id: &str) -> Result<bool, StoreError>;

    async fn clear(&self) -> Result<(), StoreError>;

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.list().await?.len())
    }

    async fn summaries(&self) -> Result<Vec<MaterialSummary>, StoreError> {
        Ok(self.list().await?.iter().map(Material::summary).collect())
    }

    /// Content blocks for the given IDs; unknown IDs are skipped.
    async fn content_by_ids(&self, ids: &[String]) -> Result<String, StoreError> {
        let mut blocks = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(material) = self.get(id).await? {
                blocks.push(material.as_block());
            }
        }
        Ok(blocks.join("\n\n"))
    }

    /// Content blocks for every material, or [`EMPTY_STORE_CONTENT`].
    async fn all_content(&self) -> Result<String, StoreError> {
        let materials = self.list().await?;
        if materials.is_empty() {
            return Ok(EMPTY_STORE_CONTENT.to_string());
        }
        Ok(materials
            .iter()
            .map(Material::as_block)
            .collect::<Vec<_>>()
            .join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material(content: &str) -> Material {
        Material {
            id: new_material_id(),
            title: "Biology".into(),
            kind: MaterialType::Txt,
            content: content.into(),
            created_at: Utc::now(),
            metadata: String::new(),
        }
    }

    #[test]
    fn detects_type_from_extension() {
        assert_eq!(MaterialType::from_filename("Lecture.PDF"), MaterialType::Pdf);
        assert_eq!(MaterialType::from_filename("notes.md"), MaterialType::Markdown);
        assert_eq!(MaterialType::from_filename("slides.pptx"), MaterialType::Pptx);
        assert_eq!(MaterialType::from_filename("README"), MaterialType::Unknown);
        assert_eq!(MaterialType::parse(MaterialType::Docx.as_str()), MaterialType::Docx);
    }

    #[test]
    fn material_ids_are_short() {
        let id = new_material_id();
        assert_eq!(id.len(), 8);
        assert_ne!(id, new_material_id());
    }

    #[test]
    fn summary_truncates_preview() {
        let long = "a".repeat(250);
        let summary = material(&long).summary();
        assert_eq!(summary.content_preview.len(), 203);
        assert!(summary.content_preview.ends_with("..."));

        let short = material("Cells divide by mitosis").summary();
        assert_eq!(short.content_preview, "Cells divide by mitosis");
        assert_eq!(short.word_count, 4);
    }

    #[test]
    fn type_serializes_as_short_name() {
        let json = serde_json::to_value(material("x").summary()).unwrap();
        assert_eq!(json["type"], "txt");
    }

    #[test]
    fn find_ignores_case() {
        let text = "The MITOCHONDRIA is the powerhouse";
        let (start, end) = find_ignore_case(text, "mitochondria").unwrap();
        assert_eq!(&text[start..end], "MITOCHONDRIA");
        assert!(find_ignore_case(text, "ribosome").is_none());
        assert!(find_ignore_case(text, "").is_none());
    }

    #[test]
    fn snippet_has_bounded_context() {
        let text = format!("{}needle{}", "x".repeat(100), "y".repeat(100));
        let snippet = find_snippet(&text, "NEEDLE", 10).unwrap();
        assert_eq!(snippet, format!("{}needleyyyy", "x".repeat(10)));
    }

    #[test]
    fn snippet_near_edges_and_multibyte() {
        let text = "ééé café au lait";
        let snippet = find_snippet(text, "café", 2).unwrap();
        assert_eq!(snippet, "é ca");
        assert_eq!(find_snippet("café", "CAFÉ", 80).unwrap(), "café");
    }

    #[test]
    fn snippet_window_is_measured_from_match_start() {
        let text = format!("{}Photosynthesis{}", "a".repeat(100), "b".repeat(100));
        let snippet = find_snippet(&text, "photosynthesis", 80).unwrap();
        assert_eq!(snippet, format!("{}Photosynthesis{}", "a".repeat(80), "b".repeat(66)));
        assert_eq!(snippet.chars().count(), 160);

        assert_eq!(find_snippet("abcdefgh", "CDEFGH", 2).unwrap(), "abcd");
    }
}
