//! Document loading and text extraction.
//!
//! Turns a PDF file into per-page plain text ready for chunking.

mod pdf;

pub use pdf::load_pdf;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Extracted text for a single page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageText {
    /// 1-based page number.
    pub number: u32,
    /// Extracted text content.
    pub text: String,
}

impl PageText {
    /// Create a new page text entry.
    pub fn new(number: u32, text: String) -> Self {
        Self { number, text }
    }

    /// Whether the page has any non-whitespace content.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A complete extracted document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentText {
    /// Document ID (derived from the file name).
    pub doc_id: String,
    /// Document title (PDF metadata or file name).
    pub title: String,
    /// Per-page extracted text.
    pub pages: Vec<PageText>,
    /// Full document text (pages joined with blank lines).
    pub full_text: String,
    /// Number of pages in the source file.
    pub page_count: u32,
}

impl DocumentText {
    /// Create a new document from extracted pages.
    pub fn new(doc_id: String, title: String, pages: Vec<PageText>) -> Self {
        let full_text = pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let page_count = pages.len() as u32;

        Self {
            doc_id,
            title,
            pages,
            full_text,
            page_count,
        }
    }

    /// Total number of characters across all pages.
    pub fn char_count(&self) -> usize {
        self.full_text.chars().count()
    }

    /// Whether the document contains any extractable text.
    pub fn has_text(&self) -> bool {
        self.pages.iter().any(|p| !p.is_empty())
    }
}

/// Derive a document ID from a file path.
///
/// Lowercases the file stem and keeps only alphanumerics, `-` and `_`,
/// mapping everything else to `-`.
pub fn doc_id_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");

    let mut id: String = stem
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();

    // Collapse runs of dashes introduced by the mapping
    while id.contains("--") {
        id = id.replace("--", "-");
    }

    let id = id.trim_matches('-').to_string();
    if id.is_empty() {
        "document".to_string()
    } else {
        id
    }
}

/// Normalizes whitespace in extracted PDF text.
///
/// PDF extraction tends to produce stray control characters, trailing
/// spaces and runs of blank lines. Paragraph breaks (double newlines)
/// are preserved so the chunker can split on them.
pub struct TextNormalizer {
    blanks: Regex,
    blank_lines: Regex,
}

impl TextNormalizer {
    pub fn new() -> Self {
        Self {
            blanks: Regex::new(r"[ \t\r]+").expect("Invalid regex"),
            blank_lines: Regex::new(r"\n{3,}").expect("Invalid regex"),
        }
    }

    /// Normalize a raw extracted text block.
    pub fn normalize(&self, raw: &str) -> String {
        let cleaned: String = raw
            .chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t' || *c == '\r')
            .collect();

        let collapsed = self.blanks.replace_all(&cleaned, " ");

        // Strip trailing blanks per line, then limit consecutive blank lines
        let trimmed_lines: String = collapsed
            .lines()
            .map(|l| l.trim_end())
            .collect::<Vec<_>>()
            .join("\n");

        self.blank_lines
            .replace_all(&trimmed_lines, "\n\n")
            .trim()
            .to_string()
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_doc_id_from_path() {
        assert_eq!(
            doc_id_from_path(&PathBuf::from("/tmp/Annual Report 2023.pdf")),
            "annual-report-2023"
        );
        assert_eq!(
            doc_id_from_path(&PathBuf::from("facility_agreement.pdf")),
            "facility_agreement"
        );
        assert_eq!(doc_id_from_path(&PathBuf::from("???.pdf")), "document");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        let normalizer = TextNormalizer::new();
        let raw = "Clause  1.1\t Definitions \n\n\n\nIn this Agreement:\u{0}";
        let normalized = normalizer.normalize(raw);
        assert_eq!(normalized, "Clause 1.1 Definitions\n\nIn this Agreement:");
    }

    #[test]
    fn test_document_text_aggregates_pages() {
        let doc = DocumentText::new(
            "test".to_string(),
            "Test".to_string(),
            vec![
                PageText::new(1, "First page.".to_string()),
                PageText::new(2, "Second page.".to_string()),
            ],
        );

        assert_eq!(doc.page_count, 2);
        assert_eq!(doc.full_text, "First page.\n\nSecond page.");
        assert!(doc.has_text());
    }

    #[test]
    fn test_empty_document_has_no_text() {
        let doc = DocumentText::new(
            "empty".to_string(),
            "Empty".to_string(),
            vec![PageText::new(1, "   \n".to_string())],
        );
        assert!(!doc.has_text());
    }
}
