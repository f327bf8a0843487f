//! Vector store abstraction for Lese.
//!
//! Provides a trait-based interface for different vector database backends.

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A chunk document stored in the vector database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique chunk ID.
    pub id: Uuid,
    /// Document ID this chunk belongs to.
    pub doc_id: String,
    /// Document title.
    pub doc_title: String,
    /// Section title (if chunked by page).
    pub section_title: Option<String>,
    /// Text content of this chunk.
    pub content: String,
    /// First page this chunk draws from (1-based).
    pub page_start: u32,
    /// Last page this chunk draws from (1-based).
    pub page_end: u32,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// Order of this chunk in the document.
    pub chunk_order: i32,
    /// When this chunk was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl Document {
    /// Create a new document chunk.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        doc_id: String,
        doc_title: String,
        section_title: Option<String>,
        content: String,
        page_start: u32,
        page_end: u32,
        embedding: Vec<f32>,
        chunk_order: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            doc_id,
            doc_title,
            section_title,
            content,
            page_start,
            page_end,
            embedding,
            chunk_order,
            indexed_at: Utc::now(),
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

/// A search result with score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matched chunk.
    pub document: Document,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Summary information about an indexed document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedDocument {
    /// Document ID.
    pub doc_id: String,
    /// Document title.
    pub doc_title: String,
    /// Number of indexed chunks.
    pub chunk_count: u32,
    /// Number of pages covered by the index.
    pub page_count: u32,
    /// When the document was indexed.
    pub indexed_at: DateTime<Utc>,
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Store a chunk with its embedding.
    async fn upsert(&self, doc: &Document) -> Result<()>;

    /// Bulk upsert chunks.
    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize>;

    /// Search for similar chunks.
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>>;

    /// Search with a minimum similarity threshold.
    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>>;

    /// Delete chunks by document ID.
    async fn delete_by_doc_id(&self, doc_id: &str) -> Result<usize>;

    /// List all indexed documents.
    async fn list_documents(&self) -> Result<Vec<IndexedDocument>>;

    /// Get a specific document's information.
    async fn get_document(&self, doc_id: &str) -> Result<Option<IndexedDocument>>;

    /// Check if a document is indexed.
    async fn is_document_indexed(&self, doc_id: &str) -> Result<bool>;

    /// Get all chunks for a document.
    async fn get_by_doc_id(&self, doc_id: &str) -> Result<Vec<Document>>;

    /// Get total chunk count.
    async fn chunk_count(&self) -> Result<usize>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_mismatched_lengths() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_document_page_format() {
        let doc = Document::new(
            "report".to_string(),
            "Annual Report".to_string(),
            None,
            "content".to_string(),
            3,
            3,
            vec![],
            0,
        );
        assert_eq!(doc.format_pages(), "p. 3");

        let doc = Document::new(
            "report".to_string(),
            "Annual Report".to_string(),
            None,
            "content".to_string(),
            4,
            6,
            vec![],
            1,
        );
        assert_eq!(doc.format_pages(), "pp. 4-6");
    }
}
