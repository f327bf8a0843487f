//! Content chunking strategies for breaking documents into searchable segments.
//!
//! Provides different strategies for splitting extracted text into retrieval units.

mod page;
mod window;

pub use page::PageChunker;
pub use window::WindowChunker;

use crate::document::DocumentText;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A chunk of content from a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentChunk {
    /// Section title (for page chunking) or none.
    pub title: Option<String>,
    /// Text content of this chunk.
    pub content: String,
    /// First page this chunk draws from (1-based).
    pub page_start: u32,
    /// Last page this chunk draws from (1-based).
    pub page_end: u32,
    /// Order of this chunk in the document.
    pub order: i32,
}

impl ContentChunk {
    /// Create a new content chunk.
    pub fn new(
        title: Option<String>,
        content: String,
        page_start: u32,
        page_end: u32,
        order: i32,
    ) -> Self {
        Self {
            title,
            content,
            page_start,
            page_end,
            order,
        }
    }

    /// Format the page range for display (e.g., "p. 3" or "pp. 3-5").
    pub fn format_pages(&self) -> String {
        if self.page_start == self.page_end {
            format!("p. {}", self.page_start)
        } else {
            format!("pp. {}-{}", self.page_start, self.page_end)
        }
    }
}

/// Chunking strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkingStrategy {
    /// Character-window chunking with overlap.
    Window,
    /// One chunk per page.
    Page,
}

impl std::str::FromStr for ChunkingStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "window" => Ok(ChunkingStrategy::Window),
            "page" => Ok(ChunkingStrategy::Page),
            _ => Err(format!("Unknown chunking strategy: {}", s)),
        }
    }
}

/// Configuration for chunking.
#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// Target chunk size in characters.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters.
    pub chunk_overlap: usize,
    /// Chunks shorter than this (after trimming) are dropped.
    pub min_chunk_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 20,
            min_chunk_chars: 20,
        }
    }
}

/// Trait for content chunking implementations.
pub trait Chunker: Send + Sync {
    /// Split a document into content chunks.
    fn chunk(&self, doc: &DocumentText, config: &ChunkingConfig) -> Result<Vec<ContentChunk>>;
}

/// Create a chunker based on the strategy.
pub fn create_chunker(strategy: ChunkingStrategy) -> Box<dyn Chunker> {
    match strategy {
        ChunkingStrategy::Window => Box::new(WindowChunker::new()),
        ChunkingStrategy::Page => Box::new(PageChunker::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_from_str() {
        assert_eq!(
            "window".parse::<ChunkingStrategy>().unwrap(),
            ChunkingStrategy::Window
        );
        assert_eq!(
            "Page".parse::<ChunkingStrategy>().unwrap(),
            ChunkingStrategy::Page
        );
        assert!("semantic".parse::<ChunkingStrategy>().is_err());
    }

    #[test]
    fn test_format_pages() {
        let single = ContentChunk::new(None, "text".to_string(), 3, 3, 0);
        assert_eq!(single.format_pages(), "p. 3");

        let range = ContentChunk::new(None, "text".to_string(), 3, 5, 1);
        assert_eq!(range.format_pages(), "pp. 3-5");
    }
}
