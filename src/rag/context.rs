//! Context building for RAG responses.

use super::ContextChunk;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::vector_store::{SearchResult, VectorStore};
use std::sync::Arc;

/// Builds context from search results for RAG.
pub struct ContextBuilder {
    vector_store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    max_chunks: usize,
    min_score: f32,
}

impl ContextBuilder {
    /// Create a new context builder.
    pub fn new(vector_store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            vector_store,
            embedder,
            max_chunks: 5,
            min_score: 0.5,
        }
    }

    /// Set the maximum number of context chunks.
    pub fn with_max_chunks(mut self, max_chunks: usize) -> Self {
        self.max_chunks = max_chunks;
        self
    }

    /// Set the minimum similarity score threshold.
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    /// Build context for a query.
    pub async fn build(&self, query: &str) -> Result<Vec<ContextChunk>> {
        // Generate query embedding
        let query_embedding = self.embedder.embed(query).await?;

        // Search for relevant chunks
        let results = self
            .vector_store
            .search_with_threshold(&query_embedding, self.max_chunks, self.min_score)
            .await?;

        Ok(Self::from_results(results))
    }

    /// Build context from raw search results.
    pub fn from_results(results: Vec<SearchResult>) -> Vec<ContextChunk> {
        results.into_iter().map(ContextChunk::from).collect()
    }
}

/// Format context chunks for inclusion in a prompt.
pub fn format_context_for_prompt(chunks: &[ContextChunk]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            format!(
                "---\n[{}] {} ({})\n{}\n---",
                i + 1,
                chunk.doc_title,
                chunk.pages,
                chunk.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Format context chunks for display to the user.
pub fn format_context_for_display(chunks: &[ContextChunk]) -> String {
    chunks
        .iter()
        .map(|chunk| {
            format!(
                "{} ({}) (score: {:.2})",
                chunk.doc_title, chunk.pages, chunk.score
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::{Document, SearchResult};

    fn sample_result(content: &str, page: u32, score: f32) -> SearchResult {
        SearchResult {
            document: Document::new(
                "report".to_string(),
                "Annual Report".to_string(),
                None,
                content.to_string(),
                page,
                page,
                vec![],
                page as i32 - 1,
            ),
            score,
        }
    }

    #[test]
    fn test_format_context_for_prompt() {
        let chunks = ContextBuilder::from_results(vec![
            sample_result("Revenue grew 12%.", 3, 0.9),
            sample_result("Costs were flat.", 7, 0.8),
        ]);

        let formatted = format_context_for_prompt(&chunks);
        assert!(formatted.contains("[1] Annual Report (p. 3)"));
        assert!(formatted.contains("[2] Annual Report (p. 7)"));
        assert!(formatted.contains("Revenue grew 12%."));
    }

    #[test]
    fn test_format_context_for_display() {
        let chunks = ContextBuilder::from_results(vec![sample_result("Revenue grew.", 3, 0.87)]);
        let formatted = format_context_for_display(&chunks);
        assert!(formatted.contains("Annual Report (p. 3) (score: 0.87)"));
    }
}
