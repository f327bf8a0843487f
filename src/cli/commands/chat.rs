//! Interactive chat command.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::OpenAIEmbedder;
use crate::error::Result;
use crate::orchestrator::Orchestrator;
use crate::rag::{eval, RagEngine};
use console::style;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

/// Run the interactive chat command.
pub async fn run_chat(
    model: Option<String>,
    expected: Option<String>,
    settings: Settings,
) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Ask) {
        Output::error(&format!("{}", e));
        Output::info("Run 'lese doctor' for detailed diagnostics.");
        return Err(e);
    }

    let orchestrator = Orchestrator::new(settings.clone())?;
    let model = model.unwrap_or_else(|| settings.rag.model.clone());

    let expected_text = match &expected {
        Some(path) => {
            let text = eval::load_expected_text(Path::new(path))?;
            Output::info("Expected responses loaded; accuracy will be appended to answers.");
            Some(text)
        }
        None => None,
    };

    let embedder = Arc::new(OpenAIEmbedder::with_config(
        &settings.embedding.model,
        settings.embedding.dimensions as usize,
        settings.embedding.batch_size,
        settings.embedding.batch_delay_ms,
    ));

    let mut engine = RagEngine::new(
        orchestrator.vector_store(),
        embedder,
        &model,
        settings.rag.max_context_chunks as usize,
        settings.rag.min_score,
    )
    .with_prompts(orchestrator.prompts().clone())
    .with_temperature(settings.rag.temperature);

    println!("\n{}", style("Lese Chat").bold().cyan());
    println!(
        "{}\n",
        style("Type your questions, or 'exit' to quit. Use 'clear' to reset conversation.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        stdin.lock().read_line(&mut input)?;

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            engine.clear_history();
            Output::info("Conversation history cleared.");
            continue;
        }

        match engine.chat(input).await {
            Ok(response) => {
                let answer = match &expected_text {
                    Some(text) => eval::append_accuracy(&response.answer, text),
                    None => response.answer.clone(),
                };

                println!("\n{} {}\n", style("Lese:").cyan().bold(), answer);

                if !response.sources.is_empty() {
                    println!("{}", style("Sources:").dim());
                    for source in &response.sources {
                        println!(
                            "  {} {} ({}) (score: {:.2})",
                            style("-").dim(),
                            source.doc_title,
                            source.pages,
                            source.score
                        );
                    }
                    println!();
                }
            }
            Err(e) => {
                Output::error(&format!("Error: {}", e));
            }
        }
    }

    Ok(())
}
