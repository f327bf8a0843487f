//! SQLite-based vector store implementation.
//!
//! Uses SQLite with cosine similarity computed in Rust for simplicity.
//! For production use cases with large datasets, consider using sqlite-vec extension
//! or a dedicated vector database.

use super::{cosine_similarity, Document, IndexedDocument, SearchResult, VectorStore};
use crate::document::DocumentText;
use crate::error::{LeseError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    id TEXT PRIMARY KEY,
    doc_id TEXT NOT NULL,
    doc_title TEXT NOT NULL,
    section_title TEXT,
    content TEXT NOT NULL,
    page_start INTEGER NOT NULL,
    page_end INTEGER NOT NULL,
    embedding BLOB NOT NULL,
    chunk_order INTEGER NOT NULL,
    indexed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_documents_doc_id ON documents(doc_id);
CREATE INDEX IF NOT EXISTS idx_documents_indexed_at ON documents(indexed_at);

CREATE TABLE IF NOT EXISTS source_texts (
    doc_id TEXT PRIMARY KEY,
    doc_title TEXT NOT NULL,
    text_json TEXT NOT NULL,
    page_count INTEGER NOT NULL,
    extracted_at TEXT NOT NULL
);
"#;

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Create a new SQLite vector store.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    fn row_to_document(row: &rusqlite::Row<'_>) -> rusqlite::Result<Document> {
        let id_str: String = row.get(0)?;
        let page_start: i64 = row.get(5)?;
        let page_end: i64 = row.get(6)?;
        let embedding_bytes: Vec<u8> = row.get(7)?;
        let indexed_at_str: String = row.get(9)?;

        Ok(Document {
            id: uuid::Uuid::parse_str(&id_str).unwrap_or_default(),
            doc_id: row.get(1)?,
            doc_title: row.get(2)?,
            section_title: row.get(3)?,
            content: row.get(4)?,
            page_start: page_start as u32,
            page_end: page_end as u32,
            embedding: Self::bytes_to_embedding(&embedding_bytes),
            chunk_order: row.get(8)?,
            indexed_at: DateTime::parse_from_rfc3339(&indexed_at_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, doc))]
    async fn upsert(&self, doc: &Document) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| LeseError::VectorStore(format!("Failed to acquire lock: {}", e)))?;

        let embedding_bytes = Self::embedding_to_bytes(&doc.embedding);

        conn.execute(
            r#"
            INSERT OR REPLACE INTO documents
            (id, doc_id, doc_title, section_title, content, page_start, page_end,
             embedding, chunk_order, indexed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                doc.id.to_string(),
                doc.doc_id,
                doc.doc_title,
                doc.section_title,
                doc.content,
                doc.page_start,
                doc.page_end,
                embedding_bytes,
                doc.chunk_order,
                doc.indexed_at.to_rfc3339(),
            ],
        )?;

        debug!("Upserted chunk {}", doc.id);
        Ok(())
    }

    #[instrument(skip(self, docs))]
    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| LeseError::VectorStore(format!("Failed to acquire lock: {}", e)))?;

        let tx = conn.unchecked_transaction()?;

        for doc in docs {
            let embedding_bytes = Self::embedding_to_bytes(&doc.embedding);

            tx.execute(
                r#"
                INSERT OR REPLACE INTO documents
                (id, doc_id, doc_title, section_title, content, page_start, page_end,
                 embedding, chunk_order, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
                params![
                    doc.id.to_string(),
                    doc.doc_id,
                    doc.doc_title,
                    doc.section_title,
                    doc.content,
                    doc.page_start,
                    doc.page_end,
                    embedding_bytes,
                    doc.chunk_order,
                    doc.indexed_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        info!("Batch upserted {} chunks", docs.len());
        Ok(docs.len())
    }

    #[instrument(skip(self, query_embedding))]
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        self.search_with_threshold(query_embedding, limit, 0.0).await
    }

    #[instrument(skip(self, query_embedding))]
    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| LeseError::VectorStore(format!("Failed to acquire lock: {}", e)))?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, doc_id, doc_title, section_title, content,
                   page_start, page_end, embedding, chunk_order, indexed_at
            FROM documents
            "#,
        )?;

        let docs = stmt.query_map([], Self::row_to_document)?;

        let mut results: Vec<SearchResult> = docs
            .filter_map(|doc_result| doc_result.ok())
            .map(|doc| {
                let score = cosine_similarity(query_embedding, &doc.embedding);
                SearchResult { document: doc, score }
            })
            .filter(|r| r.score >= min_score)
            .collect();

        // Sort by score descending
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);

        debug!("Found {} matching chunks", results.len());
        Ok(results)
    }

    #[instrument(skip(self))]
    async fn delete_by_doc_id(&self, doc_id: &str) -> Result<usize> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| LeseError::VectorStore(format!("Failed to acquire lock: {}", e)))?;

        let deleted = conn.execute("DELETE FROM documents WHERE doc_id = ?1", params![doc_id])?;

        info!("Deleted {} chunks for document {}", deleted, doc_id);
        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn list_documents(&self) -> Result<Vec<IndexedDocument>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| LeseError::VectorStore(format!("Failed to acquire lock: {}", e)))?;

        let mut stmt = conn.prepare(
            r#"
            SELECT doc_id, doc_title, COUNT(*) as chunk_count,
                   MAX(page_end) as page_count, MAX(indexed_at) as indexed_at
            FROM documents
            GROUP BY doc_id
            ORDER BY indexed_at DESC
            "#,
        )?;

        let documents = stmt.query_map([], |row| {
            let page_count: i64 = row.get(3)?;
            let indexed_at_str: String = row.get(4)?;
            Ok(IndexedDocument {
                doc_id: row.get(0)?,
                doc_title: row.get(1)?,
                chunk_count: row.get(2)?,
                page_count: page_count as u32,
                indexed_at: DateTime::parse_from_rfc3339(&indexed_at_str)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            })
        })?;

        let result: Vec<IndexedDocument> = documents.filter_map(|d| d.ok()).collect();
        Ok(result)
    }

    #[instrument(skip(self))]
    async fn get_document(&self, doc_id: &str) -> Result<Option<IndexedDocument>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| LeseError::VectorStore(format!("Failed to acquire lock: {}", e)))?;

        let mut stmt = conn.prepare(
            r#"
            SELECT doc_id, doc_title, COUNT(*) as chunk_count,
                   MAX(page_end) as page_count, MAX(indexed_at) as indexed_at
            FROM documents
            WHERE doc_id = ?1
            GROUP BY doc_id
            "#,
        )?;

        let document = stmt.query_row(params![doc_id], |row| {
            let page_count: i64 = row.get(3)?;
            let indexed_at_str: String = row.get(4)?;
            Ok(IndexedDocument {
                doc_id: row.get(0)?,
                doc_title: row.get(1)?,
                chunk_count: row.get(2)?,
                page_count: page_count as u32,
                indexed_at: DateTime::parse_from_rfc3339(&indexed_at_str)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            })
        });

        match document {
            Ok(d) => Ok(Some(d)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn is_document_indexed(&self, doc_id: &str) -> Result<bool> {
        let document = self.get_document(doc_id).await?;
        Ok(document.is_some())
    }

    #[instrument(skip(self))]
    async fn get_by_doc_id(&self, doc_id: &str) -> Result<Vec<Document>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| LeseError::VectorStore(format!("Failed to acquire lock: {}", e)))?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, doc_id, doc_title, section_title, content,
                   page_start, page_end, embedding, chunk_order, indexed_at
            FROM documents
            WHERE doc_id = ?1
            ORDER BY chunk_order
            "#,
        )?;

        let docs = stmt.query_map(params![doc_id], Self::row_to_document)?;

        let result: Vec<Document> = docs.filter_map(|d| d.ok()).collect();
        debug!("Found {} chunks for document {}", result.len(), doc_id);
        Ok(result)
    }

    async fn chunk_count(&self) -> Result<usize> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| LeseError::VectorStore(format!("Failed to acquire lock: {}", e)))?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

// Source text storage methods (not part of VectorStore trait)
impl SqliteVectorStore {
    /// Store the raw extracted text for later reindexing and summaries.
    pub fn store_source_text(&self, doc: &DocumentText) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| LeseError::VectorStore(format!("Failed to acquire lock: {}", e)))?;

        let text_json = serde_json::to_string(doc)
            .map_err(|e| LeseError::VectorStore(format!("Failed to serialize document: {}", e)))?;

        conn.execute(
            r#"
            INSERT OR REPLACE INTO source_texts (doc_id, doc_title, text_json, page_count, extracted_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                doc.doc_id,
                doc.title,
                text_json,
                doc.page_count,
                Utc::now().to_rfc3339(),
            ],
        )?;

        info!("Stored source text for document {}", doc.doc_id);
        Ok(())
    }

    /// Retrieve the stored extracted text for a document.
    pub fn get_source_text(&self, doc_id: &str) -> Result<Option<DocumentText>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| LeseError::VectorStore(format!("Failed to acquire lock: {}", e)))?;

        let result = conn.query_row(
            "SELECT text_json FROM source_texts WHERE doc_id = ?1",
            params![doc_id],
            |row| {
                let json: String = row.get(0)?;
                Ok(json)
            },
        );

        match result {
            Ok(json) => {
                let doc: DocumentText = serde_json::from_str(&json).map_err(|e| {
                    LeseError::VectorStore(format!("Failed to deserialize document: {}", e))
                })?;
                Ok(Some(doc))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Check if a source text is stored.
    pub fn has_source_text(&self, doc_id: &str) -> Result<bool> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| LeseError::VectorStore(format!("Failed to acquire lock: {}", e)))?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM source_texts WHERE doc_id = ?1",
            params![doc_id],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    /// List all stored source texts as (doc_id, doc_title, page_count).
    pub fn list_source_texts(&self) -> Result<Vec<(String, String, u32)>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| LeseError::VectorStore(format!("Failed to acquire lock: {}", e)))?;

        let mut stmt = conn.prepare(
            "SELECT doc_id, doc_title, page_count FROM source_texts ORDER BY extracted_at DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            let page_count: i64 = row.get(2)?;
            Ok((row.get(0)?, row.get(1)?, page_count as u32))
        })?;

        let result: Vec<(String, String, u32)> = rows.filter_map(|r| r.ok()).collect();
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentText, PageText};

    #[tokio::test]
    async fn test_sqlite_vector_store() {
        let store = SqliteVectorStore::in_memory().unwrap();

        let doc = Document::new(
            "report".to_string(),
            "Annual Report".to_string(),
            Some("Page 1".to_string()),
            "This is test content".to_string(),
            1,
            1,
            vec![1.0, 0.0, 0.0],
            0,
        );

        store.upsert(&doc).await.unwrap();

        let documents = store.list_documents().await.unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].doc_id, "report");
        assert_eq!(documents[0].page_count, 1);

        let results = store.search(&[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!((results[0].score - 1.0).abs() < 0.001);

        let deleted = store.delete_by_doc_id("report").await.unwrap();
        assert_eq!(deleted, 1);

        let documents = store.list_documents().await.unwrap();
        assert!(documents.is_empty());
    }

    #[tokio::test]
    async fn test_search_threshold_filters_low_scores() {
        let store = SqliteVectorStore::in_memory().unwrap();

        let close = Document::new(
            "a".to_string(),
            "A".to_string(),
            None,
            "close".to_string(),
            1,
            1,
            vec![1.0, 0.1, 0.0],
            0,
        );
        let far = Document::new(
            "b".to_string(),
            "B".to_string(),
            None,
            "far".to_string(),
            1,
            1,
            vec![0.0, 1.0, 0.0],
            0,
        );

        store.upsert_batch(&[close, far]).await.unwrap();

        let results = store
            .search_with_threshold(&[1.0, 0.0, 0.0], 10, 0.5)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document.doc_id, "a");
    }

    #[tokio::test]
    async fn test_source_text_round_trip() {
        let store = SqliteVectorStore::in_memory().unwrap();

        let doc = DocumentText::new(
            "report".to_string(),
            "Annual Report".to_string(),
            vec![
                PageText::new(1, "First page.".to_string()),
                PageText::new(2, "Second page.".to_string()),
            ],
        );

        assert!(!store.has_source_text("report").unwrap());
        store.store_source_text(&doc).unwrap();
        assert!(store.has_source_text("report").unwrap());

        let loaded = store.get_source_text("report").unwrap().unwrap();
        assert_eq!(loaded.title, "Annual Report");
        assert_eq!(loaded.pages.len(), 2);
        assert_eq!(loaded.full_text, doc.full_text);

        let listed = store.list_source_texts().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].2, 2);
    }

    #[tokio::test]
    async fn test_persistent_store_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectors.db");

        {
            let store = SqliteVectorStore::new(&path).unwrap();
            let doc = Document::new(
                "report".to_string(),
                "Annual Report".to_string(),
                None,
                "persisted content".to_string(),
                1,
                2,
                vec![0.5, 0.5],
                0,
            );
            store.upsert(&doc).await.unwrap();
        }

        let store = SqliteVectorStore::new(&path).unwrap();
        assert_eq!(store.chunk_count().await.unwrap(), 1);
        let chunks = store.get_by_doc_id("report").await.unwrap();
        assert_eq!(chunks[0].content, "persisted content");
        assert_eq!(chunks[0].page_end, 2);
    }
}
