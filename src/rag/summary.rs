//! Document summary generation.
//!
//! Produces a formatted summary with headings and sub-headings. Long
//! documents are summarized section-by-section with bounded concurrency,
//! then the partial summaries are merged in a final pass.

use crate::config::Prompts;
use crate::error::{LeseError, Result};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// Summary engine for indexed documents.
pub struct SummaryEngine {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    max_input_chars: usize,
    max_concurrent: usize,
    prompts: Prompts,
}

impl SummaryEngine {
    /// Create a new summary engine.
    pub fn new(model: &str, temperature: f32, max_input_chars: usize, max_concurrent: usize) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
            temperature,
            max_input_chars: max_input_chars.max(1),
            max_concurrent: max_concurrent.max(1),
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Summarize a document's full text.
    #[instrument(skip(self, full_text))]
    pub async fn summarize(&self, full_text: &str) -> Result<String> {
        let text = full_text.trim();
        if text.is_empty() {
            return Err(LeseError::Summary("Document has no text".to_string()));
        }

        if text.chars().count() <= self.max_input_chars {
            return self.summarize_once(&self.prompts.summary.user, text).await;
        }

        // Too long for one call: summarize sections, then merge
        let sections = split_sections(text, self.max_input_chars);
        info!("Summarizing {} sections", sections.len());

        let mut results: Vec<(usize, String)> = Vec::with_capacity(sections.len());

        let mut stream = stream::iter(sections.into_iter().enumerate())
            .map(|(idx, section)| async move {
                let result = self.summarize_once(&self.prompts.summary.user, &section).await;
                (idx, result)
            })
            .buffer_unordered(self.max_concurrent);

        while let Some((idx, result)) = stream.next().await {
            match result {
                Ok(summary) => results.push((idx, summary)),
                Err(e) => {
                    return Err(LeseError::Summary(format!("Section {} failed: {}", idx + 1, e)));
                }
            }
        }

        // Merge in document order
        results.sort_by_key(|(idx, _)| *idx);
        let combined: String = results
            .into_iter()
            .map(|(_, summary)| summary)
            .collect::<Vec<_>>()
            .join("\n\n");

        self.summarize_once(&self.prompts.summary.combine, &combined)
            .await
    }

    /// One summarization call with the given user template.
    async fn summarize_once(&self, template: &str, content: &str) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("content".to_string(), content.to_string());

        let user_prompt = self.prompts.render_with_custom(template, &vars);

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.prompts.summary.system.clone())
                .build()
                .map_err(|e| LeseError::Summary(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .map_err(|e| LeseError::Summary(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| LeseError::Summary(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| LeseError::OpenAI(format!("Summary API error: {}", e)))?;

        let summary = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| LeseError::Summary("Empty response from LLM".to_string()))?
            .clone();

        debug!("Generated summary ({} chars)", summary.len());
        Ok(summary)
    }
}

/// Split text into sections of at most `max_chars` characters, preferring
/// paragraph boundaries.
fn split_sections(text: &str, max_chars: usize) -> Vec<String> {
    let mut sections = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;

    for paragraph in text.split("\n\n") {
        let para_chars = paragraph.chars().count();

        if current_chars + para_chars + 2 > max_chars && !current.is_empty() {
            sections.push(std::mem::take(&mut current));
            current_chars = 0;
        }

        if para_chars > max_chars {
            // Paragraph alone exceeds the budget: hard split by chars
            let chars: Vec<char> = paragraph.chars().collect();
            for piece in chars.chunks(max_chars) {
                sections.push(piece.iter().collect());
            }
            continue;
        }

        if !current.is_empty() {
            current.push_str("\n\n");
            current_chars += 2;
        }
        current.push_str(paragraph);
        current_chars += para_chars;
    }

    if !current.is_empty() {
        sections.push(current);
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sections_short_text() {
        let sections = split_sections("one paragraph only", 1000);
        assert_eq!(sections, vec!["one paragraph only"]);
    }

    #[test]
    fn test_split_sections_prefers_paragraphs() {
        let para = "word ".repeat(30).trim_end().to_string(); // ~150 chars
        let text = format!("{}\n\n{}\n\n{}", para, para, para);

        let sections = split_sections(&text, 320);
        assert_eq!(sections.len(), 2);
        assert!(sections[0].contains("\n\n"));
        assert_eq!(sections[1], para);
    }

    #[test]
    fn test_split_sections_hard_splits_giant_paragraph() {
        let text = "x".repeat(2500);
        let sections = split_sections(&text, 1000);
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].len(), 1000);
        assert_eq!(sections[2].len(), 500);
    }

    #[test]
    fn test_sections_cover_all_text() {
        let para = "alpha beta gamma delta".to_string();
        let text = vec![para.clone(); 10].join("\n\n");
        let sections = split_sections(&text, 60);
        let rejoined = sections.join("\n\n");
        let words = |s: &str| s.split_whitespace().count();
        assert_eq!(words(&rejoined), words(&text));
    }
}
