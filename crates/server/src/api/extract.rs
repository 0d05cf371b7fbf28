//! Audio extraction endpoint.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{info, warn};

use super::error::{workflow_error, ApiError};
use crate::state::AppState;

/// POST /api/v1/extract
///
/// Extracts the audio of the selected file and returns it as an MP3
/// attachment. When a save directory is configured, a copy is saved there
/// too; a failed save is logged and does not fail the request.
pub async fn extract_audio(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let workflow = state.workflow();

    let result = match workflow.extract_audio().await {
        Ok(result) => result,
        Err(e) => {
            warn!(error = %e, "Extraction failed");
            state.ws_broadcaster().extraction_failed(&e.to_string());
            return Err(workflow_error(&e));
        }
    };

    let filename = workflow.delivery_filename();
    if let Some(delivery) = state.save_delivery() {
        match delivery.deliver(&result, filename).await {
            Ok(receipt) => info!(
                destination = ?receipt.destination,
                "Saved extracted audio copy"
            ),
            Err(e) => warn!(error = %e, "Failed to save extracted audio copy"),
        }
    }

    let request_id = result.request_id().to_string();
    state.ws_broadcaster().extraction_complete(
        &request_id,
        result.size_bytes(),
        result.duration_ms(),
    );

    let disposition = format!("attachment; filename=\"{}\"", filename);
    let mut response = Response::new(Body::from(result.into_bytes()));
    *response.status_mut() = StatusCode::OK;

    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(audex_core::pipeline::OUTPUT_MIME_TYPE),
    );
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        headers.insert("x-request-id", value);
    }

    Ok(response.into_response())
}
