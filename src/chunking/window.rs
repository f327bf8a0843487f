//! Character-window chunking implementation.
//!
//! Splits the document into overlapping fixed-size windows, preferring
//! to break at paragraph, line, sentence, then word boundaries.

use super::{Chunker, ChunkingConfig, ContentChunk};
use crate::document::DocumentText;
use crate::error::Result;

/// Character-window chunker with overlap.
pub struct WindowChunker;

/// Span of a page inside the joined document text, in char indices.
struct PageSpan {
    number: u32,
    start: usize,
    end: usize,
}

impl WindowChunker {
    pub fn new() -> Self {
        Self
    }

    /// Join non-empty pages and record where each page lands.
    fn join_pages(doc: &DocumentText) -> (Vec<char>, Vec<PageSpan>) {
        let mut chars: Vec<char> = Vec::new();
        let mut spans: Vec<PageSpan> = Vec::new();

        for page in doc.pages.iter().filter(|p| !p.is_empty()) {
            if !chars.is_empty() {
                chars.push('\n');
                chars.push('\n');
            }
            let start = chars.len();
            chars.extend(page.text.chars());
            spans.push(PageSpan {
                number: page.number,
                start,
                end: chars.len(),
            });
        }

        (chars, spans)
    }

    /// Find the best split position in (start, limit], scanning backwards
    /// through separator preferences. Returns the end of the chunk.
    fn find_split(chars: &[char], start: usize, limit: usize) -> usize {
        // Don't split before half the window; a tiny fragment followed by
        // a full window is worse than an uneven break. Always at least one
        // char past start so the chunk is never empty.
        let min_split = start + ((limit - start) / 2).max(1);

        // Paragraph break
        for i in (min_split..limit.saturating_sub(1)).rev() {
            if chars[i] == '\n' && chars[i + 1] == '\n' {
                return i;
            }
        }
        // Line break
        for i in (min_split..limit).rev() {
            if chars[i] == '\n' {
                return i;
            }
        }
        // Sentence end
        for i in (min_split..limit.saturating_sub(1)).rev() {
            if chars[i] == '.' && chars[i + 1] == ' ' {
                return i + 1;
            }
        }
        // Word boundary
        for i in (min_split..limit).rev() {
            if chars[i] == ' ' {
                return i;
            }
        }
        // Hard cut
        limit
    }

    /// Page range covered by the char span [start, end).
    fn page_range(spans: &[PageSpan], start: usize, end: usize) -> (u32, u32) {
        let mut first = None;
        let mut last = None;

        for span in spans {
            if span.start < end && span.end > start {
                if first.is_none() {
                    first = Some(span.number);
                }
                last = Some(span.number);
            }
        }

        let first = first.unwrap_or(1);
        (first, last.unwrap_or(first))
    }
}

impl Default for WindowChunker {
    fn default() -> Self {
        Self::new()
    }
}

impl Chunker for WindowChunker {
    fn chunk(&self, doc: &DocumentText, config: &ChunkingConfig) -> Result<Vec<ContentChunk>> {
        let (chars, spans) = Self::join_pages(doc);

        let mut chunks = Vec::new();
        if chars.is_empty() || config.chunk_size == 0 {
            return Ok(chunks);
        }

        let mut start = 0usize;
        let mut order = 0i32;

        while start < chars.len() {
            let end = if chars.len() - start <= config.chunk_size {
                chars.len()
            } else {
                Self::find_split(&chars, start, start + config.chunk_size)
            };

            let content: String = chars[start..end].iter().collect();
            let content = content.trim().to_string();

            if content.chars().count() >= config.min_chunk_chars {
                let (page_start, page_end) = Self::page_range(&spans, start, end);
                chunks.push(ContentChunk::new(None, content, page_start, page_end, order));
                order += 1;
            }

            if end == chars.len() {
                break;
            }

            // Carry overlap into the next window, always making progress
            let next = end.saturating_sub(config.chunk_overlap);
            start = if next > start { next } else { end };
        }

        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentText, PageText};

    fn doc_from_pages(pages: Vec<&str>) -> DocumentText {
        let pages = pages
            .into_iter()
            .enumerate()
            .map(|(i, text)| PageText::new(i as u32 + 1, text.to_string()))
            .collect();
        DocumentText::new("test".to_string(), "Test".to_string(), pages)
    }

    #[test]
    fn test_short_document_single_chunk() {
        let doc = doc_from_pages(vec!["A short page of text."]);
        let chunks = WindowChunker::new()
            .chunk(&doc, &ChunkingConfig::default())
            .unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "A short page of text.");
        assert_eq!(chunks[0].page_start, 1);
        assert_eq!(chunks[0].page_end, 1);
        assert_eq!(chunks[0].order, 0);
    }

    #[test]
    fn test_chunks_respect_size_and_order() {
        let sentence = "The quick brown fox jumps over the lazy dog. ";
        let long_text = sentence.repeat(60); // ~2700 chars
        let doc = doc_from_pages(vec![&long_text]);

        let config = ChunkingConfig {
            chunk_size: 800,
            chunk_overlap: 20,
            min_chunk_chars: 20,
        };
        let chunks = WindowChunker::new().chunk(&doc, &config).unwrap();

        assert!(chunks.len() >= 3);
        for (i, chunk) in chunks.iter().enumerate() {
            assert!(chunk.content.chars().count() <= 800);
            assert_eq!(chunk.order, i as i32);
        }
        // Sentence-boundary preference: windows full of ". " separators
        // should never end mid-word.
        for chunk in &chunks[..chunks.len() - 1] {
            assert!(chunk.content.ends_with('.') || chunk.content.ends_with("dog"));
        }
    }

    #[test]
    fn test_prefers_paragraph_breaks() {
        let para = "word ".repeat(90).trim_end().to_string(); // ~450 chars
        let text = format!("{}\n\n{}", para, para);
        let doc = doc_from_pages(vec![&text]);

        let config = ChunkingConfig {
            chunk_size: 600,
            chunk_overlap: 0,
            min_chunk_chars: 20,
        };
        let chunks = WindowChunker::new().chunk(&doc, &config).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content, para);
    }

    #[test]
    fn test_page_ranges_tracked() {
        let page = "alpha ".repeat(100).trim_end().to_string(); // ~600 chars each
        let doc = doc_from_pages(vec![&page, &page, &page]);

        let config = ChunkingConfig {
            chunk_size: 800,
            chunk_overlap: 20,
            min_chunk_chars: 20,
        };
        let chunks = WindowChunker::new().chunk(&doc, &config).unwrap();

        assert_eq!(chunks.first().unwrap().page_start, 1);
        assert_eq!(chunks.last().unwrap().page_end, 3);
        for pair in chunks.windows(2) {
            assert!(pair[1].page_start >= pair[0].page_start);
        }
    }

    #[test]
    fn test_empty_document_yields_no_chunks() {
        let doc = doc_from_pages(vec!["   ", ""]);
        let chunks = WindowChunker::new()
            .chunk(&doc, &ChunkingConfig::default())
            .unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_overlap_never_stalls() {
        let text = "x".repeat(2000);
        let doc = doc_from_pages(vec![&text]);

        // Overlap larger than any split distance must still terminate.
        let config = ChunkingConfig {
            chunk_size: 100,
            chunk_overlap: 100,
            min_chunk_chars: 1,
        };
        let chunks = WindowChunker::new().chunk(&doc, &config).unwrap();
        assert_eq!(chunks.len(), 20);
    }
}
