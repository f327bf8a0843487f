//! Summarize command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the summarize command.
pub async fn run_summarize(doc_id: &str, model: Option<String>, settings: Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Ask) {
        Output::error(&format!("{}", e));
        Output::info("Run 'lese doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Generating summary...");

    match orchestrator.summarize_document(doc_id, model.as_deref()).await {
        Ok(summary) => {
            spinner.finish_and_clear();
            Output::header("Document Summary");
            println!("\n{}\n", summary);
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate summary: {}", e));
            Output::info("Use 'lese list' to see indexed documents.");
            return Err(e.into());
        }
    }

    Ok(())
}
