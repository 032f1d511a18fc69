//! Session inspection

use axum::{response::IntoResponse, Json};

use crate::server::extract::Session;
use crate::types::response::{DocumentSummary, SessionInfo};

/// GET /api/session - What the caller's session currently holds
pub async fn session_info(session: Session) -> impl IntoResponse {
    let slots = session.lock().await;
    let info = SessionInfo {
        session_id: session.id(),
        created_at: session.handle().created_at,
        has_document: slots.has_document(),
        document: slots.extracted.as_ref().map(DocumentSummary::from),
        has_response: slots.has_response(),
    };
    drop(slots);

    (session.persist(), Json(info))
}
