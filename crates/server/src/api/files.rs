//! File selection endpoints.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use audex_core::selector::mime_for_extension;
use audex_core::{FileCandidate, MediaFile};

use super::error::{api_error, workflow_error, ApiError};
use crate::metrics::UPLOAD_BYTES_TOTAL;
use crate::state::AppState;

/// POST /api/v1/files
///
/// Selects the uploaded `file` field as the conversion input. The declared
/// type is the part's content type, or is inferred from its file name.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<MediaFile>, ApiError> {
    let mut candidate: Option<FileCandidate> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return Err(api_error(
                    e.status(),
                    format!("Failed to read upload: {}", e.body_text()),
                ))
            }
        };

        if field.name() != Some("file") {
            debug!("Ignoring multipart field {:?}", field.name());
            continue;
        }

        let name = field.file_name().unwrap_or("upload").to_string();
        let mime_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| mime_for_extension(Path::new(&name)).to_string());

        let bytes = field.bytes().await.map_err(|e| {
            api_error(e.status(), format!("Failed to read file: {}", e.body_text()))
        })?;
        UPLOAD_BYTES_TOTAL.inc_by(bytes.len() as u64);

        candidate = Some(FileCandidate::from_bytes(name, mime_type, bytes.to_vec()));
    }

    let candidate =
        candidate.ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "No file provided"))?;

    let file = state
        .workflow()
        .select_file(candidate)
        .await
        .map_err(|e| workflow_error(&e))?;

    info!(name = %file.name, size_bytes = file.size_bytes, "File selected");
    state
        .ws_broadcaster()
        .file_selected(&file.name, file.size_bytes);

    Ok(Json(file))
}

/// GET /api/v1/files/current
pub async fn current_file(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MediaFile>, ApiError> {
    state
        .workflow()
        .current_file()
        .await
        .map(Json)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "No file selected"))
}
