//! Request extractors: the caller's session and a single uploaded file

use axum::{
    async_trait,
    extract::{multipart::MultipartRejection, FromRequestParts, Multipart},
    http::{header::HeaderName, request::Parts},
};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::MutexGuard;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::session::{SessionHandle, SessionState};
use crate::types::{DocumentKind, UploadedDocument};

/// Header carrying the session id, both ways
pub const SESSION_HEADER: &str = "x-session-id";

/// Multipart field holding the upload
pub const UPLOAD_FIELD: &str = "file";

/// The caller's session, resumed from `x-session-id` or freshly started.
///
/// A fresh session only enters the store through [`Session::persist`], which
/// handlers call once they succeed, so failed requests leave nothing behind.
pub struct Session {
    handle: Arc<SessionHandle>,
    state: AppState,
    fresh: bool,
}

impl Session {
    pub fn id(&self) -> Uuid {
        self.handle.id
    }

    pub fn handle(&self) -> &Arc<SessionHandle> {
        &self.handle
    }

    pub async fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.handle.lock().await
    }

    /// Keep the session and return the response header echoing its id
    pub fn persist(&self) -> [(HeaderName, String); 1] {
        if self.fresh {
            self.state.sessions().register(&self.handle);
        }
        [(HeaderName::from_static(SESSION_HEADER), self.handle.id.to_string())]
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let requested = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value.trim()).ok());

        let sessions = state.sessions();
        let (handle, fresh) = match sessions.resume(requested) {
            Some(handle) => (handle, false),
            None => (sessions.start(), true),
        };

        Ok(Session {
            handle,
            state: state.clone(),
            fresh,
        })
    }
}

/// Read the `file` field of a multipart upload and detect its kind
pub async fn read_upload(
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<UploadedDocument> {
    let mut multipart = multipart?;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::invalid_input(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let kind = DocumentKind::detect(content_type.as_deref(), &filename)?;

        let data = field
            .bytes()
            .await
            .map_err(|e| Error::invalid_input(format!("Failed to read '{}': {}", filename, e)))?;
        if data.is_empty() {
            return Err(Error::invalid_input(format!("'{}' is empty", filename)));
        }

        tracing::info!("Received {} upload '{}' ({} bytes)", kind, filename, data.len());
        return Ok(UploadedDocument::new(filename, kind, data));
    }

    Err(Error::invalid_input(format!(
        "multipart field '{}' is missing",
        UPLOAD_FIELD
    )))
}
