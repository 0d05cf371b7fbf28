//! Engine session endpoints.

use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::warn;

use audex_core::SessionState;

use super::error::{workflow_error, ApiError};
use crate::state::AppState;

/// POST /api/v1/engine/load
///
/// Fetches the engine assets and loads the engine. Returns once the engine is
/// ready; calling it again afterwards is a no-op.
pub async fn load_engine(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionState>, ApiError> {
    match state.workflow().load_engine().await {
        Ok(()) => Ok(Json(SessionState::Ready)),
        Err(e) => {
            warn!(error = %e, "Engine load request failed");
            Err(workflow_error(&e))
        }
    }
}

/// GET /api/v1/engine
pub async fn get_engine(State(state): State<Arc<AppState>>) -> Json<SessionState> {
    Json(state.workflow().engine_state().await)
}
