//! API module
//!
//! HTTP API endpoints and middleware.

pub mod middleware;
pub mod routes;

use axum::{body::Body, http::Request, Router};
use sqlx::PgPool;
use tower_http::trace::TraceLayer;
use tracing::Span;

pub use routes::create_router;

/// Build the full application: health check plus the `/api` routes
/// wrapped in request logging and HTTP tracing.
pub fn build_app(pool: PgPool) -> Router {
    let api_routes = create_router().layer(axum::middleware::from_fn(middleware::logging_middleware));

    Router::new()
        // Health check (not logged per request)
        .route("/health", axum::routing::get(health_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .with_state(pool)
}

/// Span for the HTTP trace layer; the URI is masked like every other log field
fn make_request_span(request: &Request<Body>) -> Span {
    tracing::debug_span!(
        "request",
        method = %request.method(),
        uri = %middleware::mask_uri_for_logging(request.uri()),
        version = ?request.version(),
    )
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
