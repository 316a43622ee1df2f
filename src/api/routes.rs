use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::{handlers, request_id, AppState};

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(request_id::http_span))
        .layer(middleware::from_fn(request_id::propagate_request_id))
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/views", get(handlers::list_views))
        .route("/views/:view", get(handlers::get_view))
        .route("/summary", get(handlers::get_summary))
        .route("/pipeline/run", post(handlers::run_pipeline))
}
