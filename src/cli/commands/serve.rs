//! HTTP API server for integration with other systems.
//!
//! Provides REST endpoints for ingestion, search, RAG queries and summaries.

use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::orchestrator::Orchestrator;
use crate::rag::{eval, RagEngine};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
    settings: Settings,
}

impl AppState {
    fn embedder(&self) -> Arc<dyn Embedder> {
        Arc::new(OpenAIEmbedder::with_config(
            &self.settings.embedding.model,
            self.settings.embedding.dimensions as usize,
            self.settings.embedding.batch_size,
            self.settings.embedding.batch_delay_ms,
        ))
    }
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(settings.clone())?;

    let state = Arc::new(AppState {
        orchestrator,
        settings,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/ingest", post(ingest))
        .route("/search", post(search))
        .route("/ask", post(ask))
        .route("/summary", post(summary))
        .route("/documents", get(list_documents))
        .route("/documents/{doc_id}", get(get_document))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Lese API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Ingest", "POST /ingest");
    Output::kv("Search", "POST /search");
    Output::kv("Ask (RAG)", "POST /ask");
    Output::kv("Summary", "POST /summary");
    Output::kv("List Documents", "GET  /documents");
    Output::kv("Get Document", "GET  /documents/:doc_id");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct IngestRequest {
    /// Path to a PDF file on the server's filesystem
    path: String,
    /// Force re-processing even if already indexed
    #[serde(default)]
    force: bool,
}

#[derive(Serialize)]
struct IngestResponse {
    success: bool,
    doc_id: String,
    title: String,
    page_count: u32,
    chunks_indexed: usize,
    skipped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Deserialize)]
struct SearchRequest {
    query: String,
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default = "default_min_score")]
    min_score: f32,
}

fn default_limit() -> usize {
    5
}

fn default_min_score() -> f32 {
    0.5
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<SearchResultInfo>,
}

#[derive(Serialize)]
struct SearchResultInfo {
    doc_id: String,
    doc_title: String,
    chunk_title: String,
    content: String,
    page_start: u32,
    page_end: u32,
    pages: String,
    score: f32,
}

#[derive(Deserialize)]
struct AskRequest {
    question: String,
    #[serde(default = "default_max_chunks")]
    max_chunks: usize,
    #[serde(default = "default_min_score")]
    min_score: f32,
    #[serde(default)]
    model: Option<String>,
    /// Optional expected-response text; appends an accuracy score
    #[serde(default)]
    expected_text: Option<String>,
}

fn default_max_chunks() -> usize {
    5
}

#[derive(Serialize)]
struct AskResponse {
    answer: String,
    sources: Vec<SourceInfo>,
}

#[derive(Serialize)]
struct SourceInfo {
    doc_id: String,
    doc_title: String,
    pages: String,
    score: f32,
    content: String,
}

#[derive(Deserialize)]
struct SummaryRequest {
    doc_id: String,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Serialize)]
struct SummaryResponse {
    doc_id: String,
    summary: String,
}

#[derive(Serialize)]
struct DocumentListResponse {
    documents: Vec<DocumentInfo>,
    total: usize,
}

#[derive(Serialize)]
struct DocumentInfo {
    doc_id: String,
    doc_title: String,
    chunk_count: u32,
    page_count: u32,
}

#[derive(Serialize)]
struct DocumentDetailResponse {
    doc_id: String,
    doc_title: String,
    chunk_count: usize,
    page_count: u32,
    chunks: Vec<ChunkInfo>,
}

#[derive(Serialize)]
struct ChunkInfo {
    title: String,
    content: String,
    page_start: u32,
    page_end: u32,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn ingest(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IngestRequest>,
) -> impl IntoResponse {
    match state
        .orchestrator
        .ingest_document(std::path::Path::new(&req.path), req.force)
        .await
    {
        Ok(result) => Json(IngestResponse {
            success: true,
            doc_id: result.doc_id,
            title: result.title,
            page_count: result.page_count,
            chunks_indexed: result.chunks_indexed,
            skipped: result.skipped,
            error: None,
        })
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(IngestResponse {
                success: false,
                doc_id: String::new(),
                title: String::new(),
                page_count: 0,
                chunks_indexed: 0,
                skipped: false,
                error: Some(e.to_string()),
            }),
        )
            .into_response(),
    }
}

async fn search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> impl IntoResponse {
    let embedder = state.embedder();

    // Generate query embedding
    let query_embedding = match embedder.embed(&req.query).await {
        Ok(emb) => emb,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    };

    // Search vector store
    match state
        .orchestrator
        .vector_store()
        .search_with_threshold(&query_embedding, req.limit, req.min_score)
        .await
    {
        Ok(results) => Json(SearchResponse {
            results: results
                .into_iter()
                .map(|r| {
                    let pages = r.document.format_pages();
                    SearchResultInfo {
                        doc_id: r.document.doc_id,
                        doc_title: r.document.doc_title,
                        chunk_title: r.document.section_title.unwrap_or_default(),
                        content: r.document.content,
                        page_start: r.document.page_start,
                        page_end: r.document.page_end,
                        pages,
                        score: r.score,
                    }
                })
                .collect(),
        })
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

async fn ask(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskRequest>,
) -> impl IntoResponse {
    let model = req
        .model
        .unwrap_or_else(|| state.settings.rag.model.clone());

    let engine = RagEngine::new(
        state.orchestrator.vector_store(),
        state.embedder(),
        &model,
        req.max_chunks,
        req.min_score,
    )
    .with_prompts(state.orchestrator.prompts().clone())
    .with_temperature(state.settings.rag.temperature);

    match engine.ask(&req.question).await {
        Ok(response) => {
            let answer = match &req.expected_text {
                Some(expected) => eval::append_accuracy(&response.answer, expected),
                None => response.answer,
            };

            Json(AskResponse {
                answer,
                sources: response
                    .sources
                    .into_iter()
                    .map(|s| SourceInfo {
                        doc_id: s.doc_id,
                        doc_title: s.doc_title,
                        pages: s.pages,
                        score: s.score,
                        content: s.content,
                    })
                    .collect(),
            })
            .into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

async fn summary(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SummaryRequest>,
) -> impl IntoResponse {
    match state
        .orchestrator
        .summarize_document(&req.doc_id, req.model.as_deref())
        .await
    {
        Ok(summary) => Json(SummaryResponse {
            doc_id: req.doc_id,
            summary,
        })
        .into_response(),
        Err(crate::error::LeseError::DocumentNotFound(id)) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Document not found: {}", id),
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

async fn list_documents(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.orchestrator.vector_store().list_documents().await {
        Ok(documents) => Json(DocumentListResponse {
            total: documents.len(),
            documents: documents
                .into_iter()
                .map(|d| DocumentInfo {
                    doc_id: d.doc_id,
                    doc_title: d.doc_title,
                    chunk_count: d.chunk_count,
                    page_count: d.page_count,
                })
                .collect(),
        })
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

async fn get_document(
    State(state): State<Arc<AppState>>,
    axum::extract::Path(doc_id): axum::extract::Path<String>,
) -> impl IntoResponse {
    match state.orchestrator.vector_store().get_by_doc_id(&doc_id).await {
        Ok(chunks) if chunks.is_empty() => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Document not found: {}", doc_id),
            }),
        )
            .into_response(),
        Ok(chunks) => {
            let doc_title = chunks.first().map(|c| c.doc_title.clone()).unwrap_or_default();
            let page_count = chunks.iter().map(|c| c.page_end).max().unwrap_or(0);

            Json(DocumentDetailResponse {
                doc_id,
                doc_title,
                chunk_count: chunks.len(),
                page_count,
                chunks: chunks
                    .into_iter()
                    .map(|c| ChunkInfo {
                        title: c.section_title.unwrap_or_default(),
                        content: c.content,
                        page_start: c.page_start,
                        page_end: c.page_end,
                    })
                    .collect(),
            })
            .into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}
