//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the list command.
pub async fn run_list(settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;

    match orchestrator.vector_store().list_documents().await {
        Ok(documents) => {
            if documents.is_empty() {
                Output::info("No documents indexed yet. Use 'lese ingest <file.pdf>' to add one.");
            } else {
                Output::header(&format!("Indexed Documents ({})", documents.len()));
                println!();

                for item in &documents {
                    Output::document_info(
                        &item.doc_title,
                        &item.doc_id,
                        item.chunk_count,
                        item.page_count,
                    );
                }

                let total_chunks: u32 = documents.iter().map(|d| d.chunk_count).sum();
                println!();
                Output::kv("Total documents", &documents.len().to_string());
                Output::kv("Total chunks", &total_chunks.to_string());
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to list documents: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
