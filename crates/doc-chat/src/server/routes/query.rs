//! General chat endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use std::time::Instant;

use crate::error::Result;
use crate::server::extract::Session;
use crate::server::state::AppState;
use crate::types::response::{AnswerResponse, GeneralQueryRequest};

/// POST /api/query - Answer a message without the loaded document
pub async fn general_query(
    State(state): State<AppState>,
    session: Session,
    payload: std::result::Result<Json<GeneralQueryRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let start = Instant::now();
    let Json(request) = payload?;

    let mut slots = session.lock().await;
    let response = state
        .orchestrator()
        .on_general_query(&mut slots, &request.message)
        .await?;

    let body = AnswerResponse::new(&response, start.elapsed().as_millis() as u64);
    Ok((session.persist(), Json(body)))
}
