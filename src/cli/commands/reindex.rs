//! Reindex command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the reindex command.
pub async fn run_reindex(doc_id: &str, settings: Settings) -> Result<()> {
    // Re-embedding requires API access
    if let Err(e) = preflight::check(Operation::Ingest) {
        Output::error(&format!("{}", e));
        Output::info("Run 'lese doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;

    if doc_id == "all" {
        // Reindex all documents with stored source text
        let documents = orchestrator.list_reindexable()?;

        if documents.is_empty() {
            Output::warning("No documents with stored text found.");
            Output::info("Text is stored for documents ingested after this feature was added.");
            Output::info("Use 'lese ingest <file.pdf> --force' to re-ingest and store the text.");
            return Ok(());
        }

        Output::info(&format!("Found {} documents to reindex", documents.len()));
        println!();

        let mut success_count = 0;
        let mut error_count = 0;

        for (i, (id, title, _pages)) in documents.iter().enumerate() {
            Output::info(&format!("[{}/{}] Reindexing: {}", i + 1, documents.len(), title));

            match orchestrator.reindex_document(id).await {
                Ok(result) => {
                    Output::success(&format!("  Reindexed ({} chunks)", result.chunks_indexed));
                    success_count += 1;
                }
                Err(e) => {
                    Output::error(&format!("  Failed: {}", e));
                    error_count += 1;
                }
            }
        }

        println!();
        Output::info(&format!(
            "Reindexing complete: {} succeeded, {} failed",
            success_count, error_count
        ));
    } else {
        // Reindex single document
        Output::info(&format!("Reindexing document: {}", doc_id));

        let spinner = Output::spinner("Reindexing...");

        match orchestrator.reindex_document(doc_id).await {
            Ok(result) => {
                spinner.finish_and_clear();
                Output::success(&format!(
                    "Successfully reindexed '{}' ({} chunks)",
                    result.title, result.chunks_indexed
                ));
            }
            Err(e) => {
                spinner.finish_and_clear();
                Output::error(&format!("Failed to reindex: {}", e));
                return Err(e.into());
            }
        }
    }

    Ok(())
}
