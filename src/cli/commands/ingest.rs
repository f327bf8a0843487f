//! Ingest command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use std::path::Path;

/// Run the ingest command.
pub async fn run_ingest(input: &str, force: bool, summary: bool, settings: Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Ingest) {
        Output::error(&format!("{}", e));
        Output::info("Run 'lese doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;

    Output::info(&format!("Processing {}", input));

    let result = match orchestrator.ingest_document(Path::new(input), force).await {
        Ok(result) => result,
        Err(e) => {
            Output::error(&format!("Failed to ingest document: {}", e));
            return Err(e.into());
        }
    };

    if result.skipped {
        Output::warning(&format!(
            "'{}' is already indexed. Use --force to re-process.",
            result.doc_id
        ));
        return Ok(());
    }

    Output::success(&format!(
        "Indexed '{}' ({} pages, {} chunks)",
        result.title, result.page_count, result.chunks_indexed
    ));
    Output::kv("Document ID", &result.doc_id);

    if summary {
        let spinner = Output::spinner("Generating summary...");
        match orchestrator.summarize_document(&result.doc_id, None).await {
            Ok(text) => {
                spinner.finish_and_clear();
                Output::header("Document Summary");
                println!("\n{}\n", text);
            }
            Err(e) => {
                spinner.finish_and_clear();
                Output::error(&format!("Failed to generate summary: {}", e));
                return Err(e.into());
            }
        }
    }

    Ok(())
}
