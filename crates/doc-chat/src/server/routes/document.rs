//! PDF upload, document questions and DOCX conversion

use axum::{
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection, Multipart, State,
    },
    http::header,
    response::IntoResponse,
    Json,
};
use std::time::Instant;

use crate::error::Result;
use crate::server::extract::{read_upload, Session};
use crate::server::state::AppState;
use crate::types::response::{AnswerResponse, DocumentQueryRequest};

/// POST /api/pdf - Extract a PDF and make it the session's document
pub async fn upload_pdf(
    State(state): State<AppState>,
    session: Session,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse> {
    let document = read_upload(multipart).await?;

    let mut slots = session.lock().await;
    let preview = state
        .orchestrator()
        .on_pdf_upload(&mut slots, &document)
        .await?;

    Ok((session.persist(), Json(preview)))
}

/// POST /api/pdf/query - Ask about the loaded PDF
pub async fn query_document(
    State(state): State<AppState>,
    session: Session,
    payload: std::result::Result<Json<DocumentQueryRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let start = Instant::now();
    let Json(request) = payload?;

    let mut slots = session.lock().await;
    let response = state
        .orchestrator()
        .on_document_question(&mut slots, &request.question)
        .await?;

    let body = AnswerResponse::new(&response, start.elapsed().as_millis() as u64);
    Ok((session.persist(), Json(body)))
}

/// POST /api/docx - Convert a DOCX upload to PDF and send it back as a download
pub async fn convert_docx(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse> {
    let document = read_upload(multipart).await?;
    let converted = state.orchestrator().on_docx_upload(&document).await?;

    let headers = [
        (header::CONTENT_TYPE, converted.mime().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", converted.filename()),
        ),
    ];
    Ok((headers, converted.data))
}
