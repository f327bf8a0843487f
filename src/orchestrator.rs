//! Pipeline orchestrator for Lese.
//!
//! Coordinates the entire process from PDF extraction to indexing.

use crate::chunking::{create_chunker, ChunkingConfig, ChunkingStrategy, ContentChunk};
use crate::config::{Prompts, Settings};
use crate::document::{load_pdf, DocumentText};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{LeseError, Result};
use crate::rag::SummaryEngine;
use crate::vector_store::{Document, SqliteVectorStore, VectorStore};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

/// The main orchestrator for the Lese pipeline.
pub struct Orchestrator {
    settings: Settings,
    prompts: Prompts,
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<SqliteVectorStore>,
}

impl Orchestrator {
    /// Create a new orchestrator with default configuration.
    pub fn new(settings: Settings) -> Result<Self> {
        // Load prompts (with optional custom directory and variables)
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let embedder = Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
            settings.embedding.batch_size,
            settings.embedding.batch_delay_ms,
        ));

        let vector_store = Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?);

        Ok(Self {
            settings,
            prompts,
            embedder,
            vector_store,
        })
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<SqliteVectorStore>,
    ) -> Self {
        Self {
            settings,
            prompts,
            embedder,
            vector_store,
        }
    }

    /// Get a reference to the vector store (as trait object).
    pub fn vector_store(&self) -> Arc<dyn VectorStore> {
        self.vector_store.clone() as Arc<dyn VectorStore>
    }

    /// Get a reference to the SQLite vector store (for source text storage).
    pub fn sqlite_store(&self) -> Arc<SqliteVectorStore> {
        self.vector_store.clone()
    }

    /// Get a reference to the embedder.
    pub fn embedder(&self) -> Arc<dyn Embedder> {
        self.embedder.clone()
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get the loaded prompts.
    pub fn prompts(&self) -> &Prompts {
        &self.prompts
    }

    /// Ingest a PDF: extract text, chunk, embed, and index.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn ingest_document(&self, path: &Path, force: bool) -> Result<IngestResult> {
        // Extract
        info!("Extracting text from {}", path.display());
        eprintln!("  Extracting text...");
        let doc = load_pdf(path)?;
        eprintln!("  Title: {}", doc.title);
        eprintln!("  Pages: {}", doc.page_count);

        // Check if already indexed
        if !force && self.vector_store.is_document_indexed(&doc.doc_id).await? {
            info!("Document {} is already indexed, skipping", doc.doc_id);
            return Ok(IngestResult {
                doc_id: doc.doc_id,
                title: doc.title,
                page_count: doc.page_count,
                chunks_indexed: 0,
                skipped: true,
            });
        }

        // Store raw text for reindexing, summaries and export
        self.vector_store.store_source_text(&doc)?;

        // Chunk
        info!("Chunking document...");
        eprintln!("  Chunking text...");
        let chunks = self.chunk_document(&doc)?;
        eprintln!("  Created {} chunks", chunks.len());

        if chunks.is_empty() {
            return Err(LeseError::Pdf(format!(
                "Document {} produced no chunks",
                doc.doc_id
            )));
        }

        // Index
        info!("Indexing {} chunks...", chunks.len());
        eprintln!("  Generating embeddings and indexing...");
        let indexed = self.index_chunks(&doc, chunks).await?;
        eprintln!("  Indexed {} chunks", indexed);

        Ok(IngestResult {
            doc_id: doc.doc_id,
            title: doc.title,
            page_count: doc.page_count,
            chunks_indexed: indexed,
            skipped: false,
        })
    }

    /// Chunk an extracted document with the configured strategy.
    fn chunk_document(&self, doc: &DocumentText) -> Result<Vec<ContentChunk>> {
        let strategy: ChunkingStrategy = self
            .settings
            .chunking
            .strategy
            .parse()
            .unwrap_or(ChunkingStrategy::Window);

        let chunker = create_chunker(strategy);

        let config = ChunkingConfig {
            chunk_size: self.settings.chunking.chunk_size,
            chunk_overlap: self.settings.chunking.chunk_overlap,
            min_chunk_chars: self.settings.chunking.min_chunk_chars,
        };

        chunker.chunk(doc, &config)
    }

    /// Generate embeddings and index chunks.
    async fn index_chunks(&self, doc: &DocumentText, chunks: Vec<ContentChunk>) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        // Delete existing chunks for this document
        self.vector_store.delete_by_doc_id(&doc.doc_id).await?;

        // Generate embeddings in batch
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        // Create chunk documents
        let documents: Vec<Document> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| {
                Document::new(
                    doc.doc_id.clone(),
                    doc.title.clone(),
                    chunk.title,
                    chunk.content,
                    chunk.page_start,
                    chunk.page_end,
                    embedding,
                    chunk.order,
                )
            })
            .collect();

        // Batch upsert
        let count = self.vector_store.upsert_batch(&documents).await?;

        Ok(count)
    }

    /// Reindex an existing document (re-chunk and re-embed without re-parsing the PDF).
    /// Requires the extracted text to be stored in the database.
    #[instrument(skip(self))]
    pub async fn reindex_document(&self, doc_id: &str) -> Result<IngestResult> {
        // Get stored source text
        let doc = self.vector_store.get_source_text(doc_id)?.ok_or_else(|| {
            LeseError::InvalidInput(format!(
                "No stored text for '{}'. Text is only stored for documents \
                 ingested after this feature was added. Re-run 'lese ingest --force'.",
                doc_id
            ))
        })?;

        info!("Reindexing '{}' from stored text", doc.title);

        // Chunk with current settings
        let chunks = self.chunk_document(&doc)?;

        // Index (replaces old chunks)
        let count = self.index_chunks(&doc, chunks).await?;

        Ok(IngestResult {
            doc_id: doc.doc_id,
            title: doc.title,
            page_count: doc.page_count,
            chunks_indexed: count,
            skipped: false,
        })
    }

    /// Generate a summary for an ingested document.
    #[instrument(skip(self))]
    pub async fn summarize_document(&self, doc_id: &str, model: Option<&str>) -> Result<String> {
        let doc = self
            .vector_store
            .get_source_text(doc_id)?
            .ok_or_else(|| LeseError::DocumentNotFound(doc_id.to_string()))?;

        let engine = SummaryEngine::new(
            model.unwrap_or(&self.settings.summary.model),
            self.settings.summary.temperature,
            self.settings.summary.max_input_chars,
            self.settings.summary.max_concurrent,
        )
        .with_prompts(self.prompts.clone());

        engine.summarize(&doc.full_text).await
    }

    /// List all documents that have stored source text (available for reindexing).
    pub fn list_reindexable(&self) -> Result<Vec<(String, String, u32)>> {
        self.vector_store.list_source_texts()
    }
}

/// Result of ingesting a document.
#[derive(Debug)]
pub struct IngestResult {
    /// Document ID.
    pub doc_id: String,
    /// Title.
    pub title: String,
    /// Number of pages in the source file.
    pub page_count: u32,
    /// Number of chunks indexed.
    pub chunks_indexed: usize,
    /// Whether processing was skipped (already indexed).
    pub skipped: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PageText;
    use async_trait::async_trait;

    struct StubEmbedder;

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(vec![text.len() as f32, 1.0, 0.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| vec![t.len() as f32, 1.0, 0.0])
                .collect())
        }

        fn dimensions(&self) -> usize {
            3
        }
    }

    fn test_orchestrator(store: Arc<SqliteVectorStore>) -> Orchestrator {
        Orchestrator::with_components(
            Settings::default(),
            Prompts::default(),
            Arc::new(StubEmbedder),
            store,
        )
    }

    #[tokio::test]
    async fn test_reindex_from_stored_text() {
        let store = Arc::new(SqliteVectorStore::in_memory().unwrap());

        let doc = DocumentText::new(
            "report".to_string(),
            "Annual Report".to_string(),
            vec![
                PageText::new(1, "The quarterly revenue increased by twelve percent. ".repeat(5)),
                PageText::new(2, "Operating costs stayed flat across both halves. ".repeat(5)),
            ],
        );
        store.store_source_text(&doc).unwrap();

        let orchestrator = test_orchestrator(store.clone());

        let result = orchestrator.reindex_document("report").await.unwrap();
        assert!(!result.skipped);
        assert!(result.chunks_indexed >= 1);
        assert_eq!(result.title, "Annual Report");
        assert_eq!(result.page_count, 2);

        let chunks = store.get_by_doc_id("report").await.unwrap();
        assert_eq!(chunks.len(), result.chunks_indexed);
        assert_eq!(chunks[0].embedding.len(), 3);
        assert_eq!(chunks[0].doc_title, "Annual Report");
    }

    #[tokio::test]
    async fn test_reindex_replaces_old_chunks() {
        let store = Arc::new(SqliteVectorStore::in_memory().unwrap());

        let doc = DocumentText::new(
            "report".to_string(),
            "Annual Report".to_string(),
            vec![PageText::new(1, "Some content worth indexing twice.".to_string())],
        );
        store.store_source_text(&doc).unwrap();

        let orchestrator = test_orchestrator(store.clone());
        orchestrator.reindex_document("report").await.unwrap();
        let first_count = store.chunk_count().await.unwrap();

        orchestrator.reindex_document("report").await.unwrap();
        assert_eq!(store.chunk_count().await.unwrap(), first_count);
    }

    #[tokio::test]
    async fn test_reindex_missing_document_errors() {
        let store = Arc::new(SqliteVectorStore::in_memory().unwrap());
        let orchestrator = test_orchestrator(store);

        let err = orchestrator.reindex_document("missing").await.unwrap_err();
        assert!(matches!(err, LeseError::InvalidInput(_)));
    }
}
