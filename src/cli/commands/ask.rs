//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::OpenAIEmbedder;
use crate::orchestrator::Orchestrator;
use crate::rag::{eval, RagEngine};
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

/// Run the ask command.
pub async fn run_ask(
    question: &str,
    model: Option<String>,
    max_chunks: usize,
    min_score: f32,
    expected: Option<String>,
    settings: Settings,
) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Ask) {
        Output::error(&format!("{}", e));
        Output::info("Run 'lese doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings.clone())?;

    let model = model.unwrap_or_else(|| settings.rag.model.clone());

    // Load expected-response text up front so a bad path fails fast
    let expected_text = match &expected {
        Some(path) => Some(eval::load_expected_text(Path::new(path))?),
        None => None,
    };

    let embedder = Arc::new(OpenAIEmbedder::with_config(
        &settings.embedding.model,
        settings.embedding.dimensions as usize,
        settings.embedding.batch_size,
        settings.embedding.batch_delay_ms,
    ));

    let engine = RagEngine::new(
        orchestrator.vector_store(),
        embedder,
        &model,
        max_chunks,
        min_score,
    )
    .with_prompts(orchestrator.prompts().clone())
    .with_temperature(settings.rag.temperature);

    let spinner = Output::spinner("Searching documents...");

    match engine.ask(question).await {
        Ok(response) => {
            spinner.finish_and_clear();

            let answer = match &expected_text {
                Some(text) => eval::append_accuracy(&response.answer, text),
                None => response.answer.clone(),
            };

            println!("\n{}\n", answer);

            if !response.sources.is_empty() {
                Output::header("Sources");
                for source in &response.sources {
                    Output::search_result(
                        &source.doc_title,
                        &source.pages,
                        source.score,
                        &source.content,
                    );
                }
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
