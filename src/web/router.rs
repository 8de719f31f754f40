//! Router configuration for the HTTP API.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::files::{delete_files, download_file, list_files, upload_file};
use super::handlers::AppState;
use super::middleware::{create_cors_layer, jwt_auth, JwtState};

/// Headroom added to the body limit for multipart framing.
const UPLOAD_BODY_OVERHEAD: u64 = 64 * 1024;

/// Create the main API router.
pub fn create_router(
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    cors_origins: &[String],
) -> Router {
    // Oversized bodies are rejected while being read, before the upload
    // reaches storage.
    let body_limit = app_state.files.max_file_size() + UPLOAD_BODY_OVERHEAD;

    let files_routes = Router::new()
        .route(
            "/files",
            get(list_files).post(upload_file).delete(delete_files),
        )
        .route("/files/:id", get(download_file));

    // Clone jwt_state for the middleware closure
    let jwt_state_for_middleware = jwt_state.clone();

    Router::new()
        .nest("/api", files_routes)
        .layer(DefaultBodyLimit::max(body_limit as usize))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(move |req, next| {
                    let state = jwt_state_for_middleware.clone();
                    jwt_auth(state, req, next)
                })),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
