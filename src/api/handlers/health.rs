//! Health check endpoint.

use std::collections::HashMap;
use std::time::Instant;

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use jiff::Timestamp;

use crate::api::dto::{ComponentHealth, HealthResponse, HealthStatus};
use crate::db::AsyncDbPool;
use crate::state::AppState;

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// `200` when every component is healthy, `503` otherwise. The body is
/// returned in both cases.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let mut checks = HashMap::new();
    if let Some(pool) = &state.db_pool {
        checks.insert("database".to_string(), check_database(pool).await);
    }

    let status = if checks
        .values()
        .all(|c| c.status == HealthStatus::Healthy)
    {
        HealthStatus::Healthy
    } else {
        HealthStatus::Unhealthy
    };

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Timestamp::now().to_string(),
        notifiers: state
            .services
            .notifications
            .registry()
            .names()
            .into_iter()
            .map(String::from)
            .collect(),
        checks,
    };

    let code = match status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (code, Json(response))
}

async fn check_database(pool: &AsyncDbPool) -> ComponentHealth {
    let start = Instant::now();

    let result = match pool.get().await {
        Ok(mut conn) => {
            use diesel_async::RunQueryDsl;
            diesel::sql_query("SELECT 1")
                .execute(&mut conn)
                .await
                .map(|_| ())
                .map_err(|e| format!("Query failed: {}", e))
        }
        Err(e) => Err(format!("Connection failed: {}", e)),
    };

    let response_time_ms = Some(start.elapsed().as_millis() as u64);
    match result {
        Ok(()) => ComponentHealth {
            status: HealthStatus::Healthy,
            message: Some("Connected".to_string()),
            response_time_ms,
        },
        Err(message) => {
            tracing::warn!(error = %message, "Database health check failed");
            ComponentHealth {
                status: HealthStatus::Unhealthy,
                message: Some(message),
                response_time_ms,
            }
        }
    }
}
