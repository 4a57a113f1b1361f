//! HTTP API for the collector.

mod handlers;
mod middleware;
mod types;

pub use handlers::*;
pub use middleware::{logging_middleware, rate_limit_middleware, request_span, RateLimitState};
pub use types::*;

use crate::auth::ExportPassword;
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use contact_store::ContactStore;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Contact storage backend
    pub store: Arc<ContactStore>,
    /// Password required by the export endpoint
    pub export_password: ExportPassword,
}

impl AppState {
    /// Create new application state.
    pub fn new(store: ContactStore, export_password: ExportPassword) -> Self {
        Self {
            store: Arc::new(store),
            export_password,
        }
    }
}

/// Create the API router with the default rate limit.
pub fn create_router(state: AppState) -> Router {
    create_router_with_rate_limit(state, RateLimitState::new(120))
}

/// Create the API router with custom rate limiting.
///
/// `/health` sits outside the rate limit.
pub fn create_router_with_rate_limit(state: AppState, rate_limit: RateLimitState) -> Router {
    Router::new()
        .route("/api/contacts", post(handlers::add_contact))
        .route("/api/contacts/stats", get(handlers::contact_stats))
        .route("/api/contacts/export", get(handlers::export_contacts))
        .layer(axum_middleware::from_fn_with_state(
            rate_limit,
            rate_limit_middleware,
        ))
        .route("/health", get(handlers::health))
        .layer(axum_middleware::from_fn(logging_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .with_state(state)
}

/// Serve files from `static_dir` for every path the API does not handle,
/// falling back to its `index.html`.
pub fn with_static_files(router: Router, static_dir: &Path) -> Router {
    let index = ServeFile::new(static_dir.join("index.html"));
    router.fallback_service(ServeDir::new(static_dir).fallback(index))
}
