//! Router configuration for the API.

use std::time::Duration;

use axum::{Router, middleware};
use tower_http::timeout::TimeoutLayer;

use crate::api::handlers;
use crate::api::middleware::{global_error_handler, logging_middleware, request_id_middleware};
use crate::config::ServerConfig;
use crate::state::AppState;

/// Builds the application router.
///
/// Layers run outermost first: request id, logging, error rendering, then
/// the request timeout.
///
/// # Routes
/// - `GET  /api/health`
/// - `GET  /api/notifiers`
/// - `GET|PUT /api/notifiers/{name}`
/// - `PUT  /api/notifiers/{name}/enabled`
/// - `POST /api/notifiers/{name}/test`
/// - `POST /api/notify`
pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    let api_routes = Router::new()
        .merge(handlers::health::health_routes())
        .merge(handlers::notify::notify_routes())
        .nest("/notifiers", handlers::notifiers::notifier_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(TimeoutLayer::new(Duration::from_secs(server.request_timeout)))
        .layer(middleware::from_fn(global_error_handler))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}
