//! Page-based chunking implementation.
//!
//! Emits one chunk per non-empty page.

use super::{Chunker, ChunkingConfig, ContentChunk};
use crate::document::DocumentText;
use crate::error::Result;

/// Page chunker.
///
/// Useful for documents where pages are natural retrieval units
/// (slides, forms, short reports).
pub struct PageChunker;

impl PageChunker {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PageChunker {
    fn default() -> Self {
        Self::new()
    }
}

impl Chunker for PageChunker {
    fn chunk(&self, doc: &DocumentText, config: &ChunkingConfig) -> Result<Vec<ContentChunk>> {
        let mut chunks = Vec::new();
        let mut order = 0i32;

        for page in &doc.pages {
            let content = page.text.trim();
            if content.chars().count() < config.min_chunk_chars {
                continue;
            }

            chunks.push(ContentChunk::new(
                Some(format!("Page {}", page.number)),
                content.to_string(),
                page.number,
                page.number,
                order,
            ));
            order += 1;
        }

        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentText, PageText};

    #[test]
    fn test_page_chunking() {
        let doc = DocumentText::new(
            "test".to_string(),
            "Test".to_string(),
            vec![
                PageText::new(1, "This is the first page of the document.".to_string()),
                PageText::new(2, "  ".to_string()),
                PageText::new(3, "This is the third page of the document.".to_string()),
            ],
        );

        let chunks = PageChunker::new()
            .chunk(&doc, &ChunkingConfig::default())
            .unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].title.as_deref(), Some("Page 1"));
        assert_eq!(chunks[0].page_start, 1);
        assert_eq!(chunks[1].title.as_deref(), Some("Page 3"));
        assert_eq!(chunks[1].order, 1);
    }
}
