//! Export command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::document::DocumentText;
use crate::vector_store::SqliteVectorStore;
use anyhow::Result;
use serde::Serialize;

/// Output format for exported documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Txt,
    Markdown,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "txt" | "text" => Ok(ExportFormat::Txt),
            "md" | "markdown" => Ok(ExportFormat::Markdown),
            _ => Err(format!("Unknown export format: {} (expected json, txt, md)", s)),
        }
    }
}

/// Exportable document with metadata.
#[derive(Debug, Serialize)]
struct ExportedDocument<'a> {
    doc_id: &'a str,
    title: &'a str,
    page_count: u32,
    pages: Vec<ExportedPage<'a>>,
}

#[derive(Debug, Serialize)]
struct ExportedPage<'a> {
    number: u32,
    text: &'a str,
}

/// Run the export command.
pub async fn run_export(
    doc_id: &str,
    output: Option<String>,
    format: &str,
    settings: Settings,
) -> Result<()> {
    let export_format: ExportFormat = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    // Open vector store
    let store = SqliteVectorStore::new(&settings.sqlite_path())?;

    let doc = match store.get_source_text(doc_id)? {
        Some(doc) => doc,
        None => {
            Output::error(&format!("No stored text found for document ID: {}", doc_id));
            Output::info("Use 'lese list' to see indexed documents.");
            return Ok(());
        }
    };

    let output_str = render_export(&doc, export_format)?;

    // Write output
    match output {
        Some(path) if path != "-" => {
            std::fs::write(&path, &output_str)?;
            Output::success(&format!(
                "Exported '{}' to {} ({} pages)",
                doc.title, path, doc.page_count
            ));
        }
        _ => {
            // Output to stdout
            println!("{}", output_str);
        }
    }

    Ok(())
}

/// Render a document in the requested export format.
fn render_export(doc: &DocumentText, format: ExportFormat) -> Result<String> {
    let rendered = match format {
        ExportFormat::Json => {
            let export = ExportedDocument {
                doc_id: &doc.doc_id,
                title: &doc.title,
                page_count: doc.page_count,
                pages: doc
                    .pages
                    .iter()
                    .map(|p| ExportedPage {
                        number: p.number,
                        text: &p.text,
                    })
                    .collect(),
            };
            serde_json::to_string_pretty(&export)?
        }
        ExportFormat::Txt => doc.full_text.clone(),
        ExportFormat::Markdown => {
            let mut out = format!("# {}\n", doc.title);
            for page in &doc.pages {
                if page.is_empty() {
                    continue;
                }
                out.push_str(&format!("\n## Page {}\n\n{}\n", page.number, page.text));
            }
            out
        }
    };

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentText, PageText};

    fn sample_doc() -> DocumentText {
        DocumentText::new(
            "report".to_string(),
            "Annual Report".to_string(),
            vec![
                PageText::new(1, "First page.".to_string()),
                PageText::new(2, "Second page.".to_string()),
            ],
        )
    }

    #[test]
    fn test_export_format_parsing() {
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("TXT".parse::<ExportFormat>().unwrap(), ExportFormat::Txt);
        assert_eq!("md".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert!("srt".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_render_txt() {
        let rendered = render_export(&sample_doc(), ExportFormat::Txt).unwrap();
        assert_eq!(rendered, "First page.\n\nSecond page.");
    }

    #[test]
    fn test_render_markdown() {
        let rendered = render_export(&sample_doc(), ExportFormat::Markdown).unwrap();
        assert!(rendered.starts_with("# Annual Report\n"));
        assert!(rendered.contains("## Page 1"));
        assert!(rendered.contains("## Page 2"));
    }

    #[test]
    fn test_render_json() {
        let rendered = render_export(&sample_doc(), ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["doc_id"], "report");
        assert_eq!(value["pages"].as_array().unwrap().len(), 2);
    }
}
