//! PDF text extraction.
//!
//! Uses pdf-extract as the primary extractor (better font encoding
//! handling) with a lopdf content-stream walk as fallback. pdf-extract
//! can panic on malformed files, so extraction runs under catch_unwind.

use super::{doc_id_from_path, DocumentText, PageText, TextNormalizer};
use crate::error::{LeseError, Result};
use lopdf::Object;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Load a PDF file and extract per-page text.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_pdf(path: &Path) -> Result<DocumentText> {
    if !path.exists() {
        return Err(LeseError::InvalidInput(format!(
            "File not found: {}",
            path.display()
        )));
    }

    let doc_id = doc_id_from_path(path);
    let title = pdf_title(path).unwrap_or_else(|| {
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Untitled Document")
            .to_string()
    });

    let raw_pages = extract_pages(path)?;

    let normalizer = TextNormalizer::new();
    let pages: Vec<PageText> = raw_pages
        .iter()
        .enumerate()
        .map(|(i, text)| PageText::new(i as u32 + 1, normalizer.normalize(text)))
        .collect();

    let doc = DocumentText::new(doc_id, title, pages);

    if !doc.has_text() {
        return Err(LeseError::Pdf(format!(
            "No extractable text in {}. The file may be scanned images or encrypted.",
            path.display()
        )));
    }

    info!(
        "Extracted {} pages ({} chars) from {}",
        doc.page_count,
        doc.char_count(),
        path.display()
    );

    Ok(doc)
}

/// Extract raw page texts, falling back to lopdf when pdf-extract fails.
fn extract_pages(path: &Path) -> Result<Vec<String>> {
    let extracted = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        pdf_extract::extract_text_by_pages(path)
    }));

    match extracted {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => {
            warn!("pdf-extract failed ({}), trying lopdf fallback", e);
            extract_pages_lopdf(path)
                .map_err(|fb| LeseError::Pdf(format!("{} (lopdf fallback: {})", e, fb)))
        }
        Err(_) => {
            warn!("pdf-extract panicked, trying lopdf fallback");
            extract_pages_lopdf(path)
                .map_err(|fb| LeseError::Pdf(format!("extractor panicked (lopdf fallback: {})", fb)))
        }
    }
}

/// Fallback extraction: walk each page's content stream and collect
/// text-showing operators.
fn extract_pages_lopdf(path: &Path) -> std::result::Result<Vec<String>, String> {
    let doc = lopdf::Document::load(path).map_err(|e| format!("Failed to load PDF: {}", e))?;

    if doc.is_encrypted() {
        return Err("PDF is encrypted".to_string());
    }

    let mut pages = Vec::new();

    for (_page_num, page_id) in doc.get_pages() {
        let mut page_text = String::new();

        let content = match doc.get_page_content(page_id) {
            Ok(c) => c,
            Err(e) => {
                debug!("Skipping unreadable page content: {}", e);
                pages.push(String::new());
                continue;
            }
        };

        let operations = lopdf::content::Content::decode(&content)
            .map(|c| c.operations)
            .unwrap_or_default();

        for op in operations {
            match op.operator.as_str() {
                // Tj, ' and ": show a text string
                "Tj" | "'" | "\"" => {
                    if let Some(Object::String(bytes, _)) = op.operands.first() {
                        if let Some(text) = decode_pdf_string(bytes) {
                            page_text.push_str(&text);
                        }
                    }
                }
                // TJ: show a text array with kerning adjustments
                "TJ" => {
                    if let Some(Object::Array(arr)) = op.operands.first() {
                        for item in arr {
                            if let Object::String(bytes, _) = item {
                                if let Some(text) = decode_pdf_string(bytes) {
                                    page_text.push_str(&text);
                                }
                            }
                        }
                    }
                }
                // Line-advancing positioning operators
                "Td" | "TD" | "T*" => {
                    if !page_text.ends_with('\n') {
                        page_text.push('\n');
                    }
                }
                "ET" => {
                    if !page_text.ends_with('\n') {
                        page_text.push('\n');
                    }
                }
                _ => {}
            }
        }

        pages.push(page_text);
    }

    if pages.is_empty() {
        return Err("PDF has no pages".to_string());
    }

    Ok(pages)
}

/// Read the document title from the PDF Info dictionary, if present.
fn pdf_title(path: &Path) -> Option<String> {
    let doc = lopdf::Document::load(path).ok()?;

    let info = doc.trailer.get(b"Info").ok()?;
    let info_dict = match info {
        Object::Reference(id) => doc.get_object(*id).ok()?.as_dict().ok()?,
        Object::Dictionary(dict) => dict,
        _ => return None,
    };

    let title = match info_dict.get(b"Title").ok()? {
        Object::String(bytes, _) => decode_pdf_string(bytes)?,
        _ => return None,
    };

    let title = title.trim().to_string();
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

/// Decode PDF string bytes to a Rust String.
///
/// PDF strings can be UTF-16BE (with BOM 0xFEFF), UTF-8, or
/// PDFDocEncoding (treated as Latin-1 here).
fn decode_pdf_string(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }

    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16_chars: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
            .collect();
        return String::from_utf16(&utf16_chars).ok();
    }

    // UTF-8
    if let Ok(s) = std::str::from_utf8(bytes) {
        let cleaned: String = s.chars().filter(|c| !c.is_control() || *c == ' ').collect();
        if !cleaned.is_empty() {
            return Some(cleaned);
        }
    }

    // Latin-1 / PDFDocEncoding fallback
    let s: String = bytes
        .iter()
        .filter_map(|&b| {
            let c = b as char;
            if c.is_control() && c != ' ' {
                None
            } else {
                Some(c)
            }
        })
        .collect();

    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8_string() {
        assert_eq!(
            decode_pdf_string(b"Facility Agreement"),
            Some("Facility Agreement".to_string())
        );
    }

    #[test]
    fn test_decode_utf16be_string() {
        // "Hi" as UTF-16BE with BOM
        let bytes = [0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69];
        assert_eq!(decode_pdf_string(&bytes), Some("Hi".to_string()));
    }

    #[test]
    fn test_decode_empty_string() {
        assert_eq!(decode_pdf_string(b""), None);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_pdf(Path::new("/nonexistent/file.pdf")).unwrap_err();
        assert!(matches!(err, LeseError::InvalidInput(_)));
    }
}
