//! Text-to-speech of the latest answer

use axum::{extract::State, response::IntoResponse, Json};

use crate::error::Result;
use crate::server::extract::Session;
use crate::server::state::AppState;
use crate::types::response::{SpeechRequest, SpeechResponse};

/// POST /api/speech - Speak the session's most recent response
pub async fn speak(
    State(state): State<AppState>,
    session: Session,
    request: Option<Json<SpeechRequest>>,
) -> Result<impl IntoResponse> {
    let request = request.map(|Json(r)| r).unwrap_or_default();

    let slots = session.lock().await;
    let clip = state
        .orchestrator()
        .on_speech_requested(&slots, request.language.as_deref())
        .await?;

    Ok((session.persist(), Json(SpeechResponse::from(&clip))))
}
