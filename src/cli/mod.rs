//! CLI module for Lese.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Lese - PDF Question Answering and RAG
///
/// A local-first CLI tool for indexing PDF documents and asking questions about them.
/// The name "Lese" comes from the Norwegian/Scandinavian word for "read."
#[derive(Parser, Debug)]
#[command(name = "lese")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Lese and verify system requirements
    Init,

    /// Check system requirements and configuration
    Doctor,

    /// Extract, chunk, embed and index a PDF document
    Ingest {
        /// Path to the PDF file
        input: String,

        /// Force re-processing even if already indexed
        #[arg(short, long)]
        force: bool,

        /// Generate and print a document summary after indexing
        #[arg(short, long)]
        summary: bool,
    },

    /// Ask a question and get an answer from your documents
    Ask {
        /// The question to ask
        question: String,

        /// LLM model to use for response generation
        #[arg(short, long)]
        model: Option<String>,

        /// Maximum number of context chunks to include
        #[arg(short = 'c', long, default_value = "5")]
        max_chunks: usize,

        /// Minimum similarity score for retrieved chunks (0.0-1.0)
        #[arg(long, default_value = "0.5")]
        min_score: f32,

        /// PDF with expected responses; appends a word-overlap accuracy score
        #[arg(short, long)]
        expected: Option<String>,
    },

    /// Search for relevant document passages
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        limit: usize,

        /// Minimum similarity score (0.0-1.0)
        #[arg(short, long, default_value = "0.5")]
        min_score: f32,
    },

    /// Start an interactive chat session
    Chat {
        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,

        /// PDF with expected responses; appends a word-overlap accuracy score
        #[arg(short, long)]
        expected: Option<String>,
    },

    /// Generate a formatted summary of an indexed document
    Summarize {
        /// Document ID to summarize
        doc_id: String,

        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// List indexed documents
    List,

    /// Re-chunk and re-embed indexed documents without re-parsing the PDF
    Reindex {
        /// Document ID to reindex (use 'all' to reindex everything)
        doc_id: String,
    },

    /// Export extracted text from an indexed document
    Export {
        /// Document ID to export
        doc_id: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,

        /// Output format (json, txt, md)
        #[arg(long, default_value = "json")]
        format: String,
    },

    /// Start HTTP API server for integration with other systems
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "rag.model")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
