//! Lese - PDF Question Answering and RAG
//!
//! A local-first CLI tool for indexing PDF documents and asking questions about them.
//!
//! The name "Lese" comes from the Norwegian/Scandinavian word for "read."
//!
//! # Overview
//!
//! Lese allows you to:
//! - Extract and index text from PDF documents
//! - Build a searchable vector database from document content
//! - Ask questions and get AI-powered answers with page citations
//! - Generate structured summaries of indexed documents
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `document` - PDF loading and text extraction
//! - `chunking` - Content chunking strategies
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector database abstraction
//! - `rag` - RAG engine for question answering and summaries
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use lese::config::Settings;
//! use lese::orchestrator::Orchestrator;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     // Ingest a PDF document
//!     let result = orchestrator.ingest_document(Path::new("report.pdf"), false).await?;
//!     println!("Indexed {} chunks", result.chunks_indexed);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod vector_store;

pub use error::{LeseError, Result};
