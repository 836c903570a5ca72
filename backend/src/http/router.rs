//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        .route("/solve", post(handlers::solve))
        .route(
            "/sessions/{session_id}/generations",
            post(handlers::start_generation).delete(handlers::cancel_generation),
        )
        .route(
            "/sessions/{session_id}/generations/{job_id}",
            get(handlers::get_generation),
        )
        .route(
            "/sessions/{session_id}/generations/{job_id}/schedule",
            get(handlers::get_generated_schedule),
        );

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
