//! API module
//!
//! HTTP API endpoints and middleware.

pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::store::DocumentStore;
use crate::updater::{ApplyOptions, UpdateMode};

pub use routes::create_router;

/// Shared state of the HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub mode: UpdateMode,
    pub options: ApplyOptions,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, mode: UpdateMode, options: ApplyOptions) -> Self {
        Self {
            store,
            mode,
            options,
        }
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    // Axum layers are applied in reverse order (last added = first executed)
    // Order: context -> logging -> handler
    let api_routes = create_router()
        .layer(axum::middleware::from_fn(middleware::logging_middleware))
        .layer(axum::middleware::from_fn(middleware::context_middleware));

    Router::new()
        // Health check (no context)
        .route("/health", axum::routing::get(health_check))
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
