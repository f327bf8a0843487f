//! In-memory vector store implementation.
//!
//! Useful for testing and small datasets.

use super::{cosine_similarity, Document, IndexedDocument, SearchResult, VectorStore};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory vector store.
pub struct MemoryVectorStore {
    documents: RwLock<HashMap<String, Document>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert(&self, doc: &Document) -> Result<()> {
        let mut docs = self.documents.write().unwrap();
        docs.insert(doc.id.to_string(), doc.clone());
        Ok(())
    }

    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize> {
        let mut store = self.documents.write().unwrap();
        for doc in docs {
            store.insert(doc.id.to_string(), doc.clone());
        }
        Ok(docs.len())
    }

    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        self.search_with_threshold(query_embedding, limit, 0.0).await
    }

    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let docs = self.documents.read().unwrap();

        let mut results: Vec<SearchResult> = docs
            .values()
            .map(|doc| {
                let score = cosine_similarity(query_embedding, &doc.embedding);
                SearchResult {
                    document: doc.clone(),
                    score,
                }
            })
            .filter(|r| r.score >= min_score)
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);

        Ok(results)
    }

    async fn delete_by_doc_id(&self, doc_id: &str) -> Result<usize> {
        let mut docs = self.documents.write().unwrap();
        let initial_len = docs.len();
        docs.retain(|_, doc| doc.doc_id != doc_id);
        Ok(initial_len - docs.len())
    }

    async fn list_documents(&self) -> Result<Vec<IndexedDocument>> {
        let docs = self.documents.read().unwrap();

        let mut doc_map: HashMap<String, IndexedDocument> = HashMap::new();

        for doc in docs.values() {
            let entry = doc_map
                .entry(doc.doc_id.clone())
                .or_insert_with(|| IndexedDocument {
                    doc_id: doc.doc_id.clone(),
                    doc_title: doc.doc_title.clone(),
                    chunk_count: 0,
                    page_count: 0,
                    indexed_at: doc.indexed_at,
                });

            entry.chunk_count += 1;
            if doc.page_end > entry.page_count {
                entry.page_count = doc.page_end;
            }
            if doc.indexed_at > entry.indexed_at {
                entry.indexed_at = doc.indexed_at;
            }
        }

        let mut documents: Vec<IndexedDocument> = doc_map.into_values().collect();
        documents.sort_by(|a, b| b.indexed_at.cmp(&a.indexed_at));

        Ok(documents)
    }

    async fn get_document(&self, doc_id: &str) -> Result<Option<IndexedDocument>> {
        let documents = self.list_documents().await?;
        Ok(documents.into_iter().find(|d| d.doc_id == doc_id))
    }

    async fn is_document_indexed(&self, doc_id: &str) -> Result<bool> {
        let docs = self.documents.read().unwrap();
        Ok(docs.values().any(|d| d.doc_id == doc_id))
    }

    async fn get_by_doc_id(&self, doc_id: &str) -> Result<Vec<Document>> {
        let docs = self.documents.read().unwrap();
        let mut result: Vec<Document> = docs
            .values()
            .filter(|d| d.doc_id == doc_id)
            .cloned()
            .collect();
        result.sort_by_key(|d| d.chunk_order);
        Ok(result)
    }

    async fn chunk_count(&self) -> Result<usize> {
        let docs = self.documents.read().unwrap();
        Ok(docs.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_vector_store() {
        let store = MemoryVectorStore::new();

        let doc1 = Document::new(
            "report".to_string(),
            "Annual Report".to_string(),
            None,
            "Hello world".to_string(),
            1,
            1,
            vec![1.0, 0.0, 0.0],
            0,
        );

        let doc2 = Document::new(
            "report".to_string(),
            "Annual Report".to_string(),
            None,
            "Goodbye world".to_string(),
            2,
            2,
            vec![0.0, 1.0, 0.0],
            1,
        );

        store.upsert_batch(&[doc1, doc2]).await.unwrap();

        assert_eq!(store.chunk_count().await.unwrap(), 2);

        let results = store.search(&[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].score > results[1].score);

        let documents = store.list_documents().await.unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].chunk_count, 2);
        assert_eq!(documents[0].page_count, 2);
    }

    #[tokio::test]
    async fn test_chunks_returned_in_order() {
        let store = MemoryVectorStore::new();

        for order in [2, 0, 1] {
            let doc = Document::new(
                "report".to_string(),
                "Annual Report".to_string(),
                None,
                format!("chunk {}", order),
                1,
                1,
                vec![1.0],
                order,
            );
            store.upsert(&doc).await.unwrap();
        }

        let chunks = store.get_by_doc_id("report").await.unwrap();
        let orders: Vec<i32> = chunks.iter().map(|c| c.chunk_order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }
}
