use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use super::middleware::metrics_middleware;
use super::{engine, extract, files, handlers, ws};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // UI static files path (configurable via env)
    let ui_dir = std::env::var("AUDEX_UI_DIR").unwrap_or_else(|_| "crates/server/ui".to_string());
    let max_upload = state.config().server.max_upload_bytes;

    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Engine session
        .route("/engine", get(engine::get_engine))
        .route("/engine/load", post(engine::load_engine))
        // File selection
        .route(
            "/files",
            post(files::upload_file).layer(DefaultBodyLimit::max(max_upload)),
        )
        .route("/files/current", get(files::current_file))
        // Extraction
        .route("/extract", post(extract::extract_audio))
        // Status
        .route("/status", get(handlers::get_status))
        .route("/ws", get(ws::ws_handler))
        .with_state(state.clone());

    // Serve UI with index fallback
    let index_path = format!("{}/index.html", ui_dir);
    let serve_dir = ServeDir::new(&ui_dir).fallback(ServeFile::new(&index_path));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics).with_state(state))
        .fallback_service(serve_dir)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
