//! API routes for the doc-chat server

pub mod document;
pub mod query;
pub mod session;
pub mod speech;

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        // Uploads - with larger body limit
        .route(
            "/pdf",
            post(document::upload_pdf).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route(
            "/docx",
            post(document::convert_docx).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        // Questions
        .route("/pdf/query", post(document::query_document))
        .route("/query", post(query::general_query))
        // Speech
        .route("/speech", post(speech::speak))
        // Session
        .route("/session", get(session::session_info))
        // Info
        .route("/info", get(info))
}

/// API info endpoint
async fn info(State(state): State<AppState>) -> Json<serde_json::Value> {
    let orchestrator = state.orchestrator();
    Json(serde_json::json!({
        "name": "doc-chat",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Chat with a PDF, convert DOCX to PDF and listen to the answers",
        "model": orchestrator.dispatcher().provider().model(),
        "collaborators": {
            "extractor": orchestrator.extractor().name(),
            "converter": orchestrator.converter().name(),
            "converter_available": orchestrator.converter().is_available().await,
            "llm": orchestrator.dispatcher().provider().name(),
            "speech": orchestrator.speech().name(),
        },
        "limits": {
            "max_upload_size": state.config().server.max_upload_size,
            "max_prompt_chars": state.config().llm.max_prompt_chars,
            "preview_chars": state.config().session.preview_chars,
        },
        "endpoints": {
            "POST /api/pdf": "Upload a PDF (multipart field 'file') and get a text preview",
            "POST /api/pdf/query": "Ask a question about the uploaded PDF",
            "POST /api/docx": "Convert a DOCX (multipart field 'file') to PDF",
            "POST /api/query": "Chat without the document",
            "POST /api/speech": "Speak the most recent answer",
            "GET /api/session": "Show what the session holds"
        }
    }))
}
