//! RAG (Retrieval-Augmented Generation) for question answering with sources.
//!
//! Provides the ability to ask questions and get answers from indexed documents.

pub mod context;
pub mod eval;
mod response;
mod summary;

pub use context::ContextBuilder;
pub use response::{RagEngine, RagResponse};
pub use summary::SummaryEngine;

use crate::vector_store::SearchResult;

/// A search result with formatted context for display.
#[derive(Debug, Clone)]
pub struct ContextChunk {
    /// Document ID.
    pub doc_id: String,
    /// Document title.
    pub doc_title: String,
    /// Formatted page range (e.g., "p. 3" or "pp. 3-5").
    pub pages: String,
    /// First page of the chunk.
    pub page_start: u32,
    /// Text content.
    pub content: String,
    /// Similarity score.
    pub score: f32,
}

impl From<SearchResult> for ContextChunk {
    fn from(result: SearchResult) -> Self {
        Self {
            doc_id: result.document.doc_id.clone(),
            doc_title: result.document.doc_title.clone(),
            pages: result.document.format_pages(),
            page_start: result.document.page_start,
            content: result.document.content.clone(),
            score: result.score,
        }
    }
}
