//! Error handler for converting AppError to HTTP responses.
//!
//! Handlers return `AppError`; the rendered [`ErrorResponse`] is also kept in
//! the response extensions so [`global_error_handler`] can stamp the request
//! id onto it. Bare error responses produced by axum itself (unknown route,
//! wrong method) are rewritten into the same JSON shape.

use axum::{
    Json,
    extract::Request,
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::RequestId;
use crate::api::dto::ErrorResponse;
use crate::error::{AppError, NotificationError, NotificationErrorKind};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Database { source, .. }
            | AppError::Configuration { source, .. }
            | AppError::ConnectionPool { source }
            | AppError::Internal { source } => {
                tracing::error!(error = %self, cause = %source, "Request failed");
            }
            _ => {}
        }

        let (status, body) = error_parts(&self);
        let mut response = (status, Json(body.clone())).into_response();
        response.extensions_mut().insert(body);
        response
    }
}

/// Status code and sanitized body for an error.
pub fn error_parts(error: &AppError) -> (StatusCode, ErrorResponse) {
    match error {
        AppError::NotFound {
            entity,
            field,
            value,
        } => (
            StatusCode::NOT_FOUND,
            ErrorResponse::not_found_error(entity, field, value),
        ),
        AppError::Duplicate {
            entity,
            field,
            value,
        } => (
            StatusCode::CONFLICT,
            ErrorResponse::duplicate_error(entity, field, value),
        ),
        AppError::Validation { field, reason } => (
            StatusCode::BAD_REQUEST,
            ErrorResponse::validation_error(field, reason),
        ),
        AppError::BadRequest { message } => (
            StatusCode::BAD_REQUEST,
            ErrorResponse::new("BAD_REQUEST", message),
        ),
        AppError::Notification(err) => notification_parts(err),
        AppError::Database { operation, .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::new(
                "DATABASE_ERROR",
                &format!("Database operation failed: {}", operation),
            )
            .with_details(json!({ "operation": operation })),
        ),
        AppError::Configuration { key, .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::new("CONFIGURATION_ERROR", &format!("Configuration error: {}", key))
                .with_details(json!({ "key": key })),
        ),
        AppError::ConnectionPool { .. } => (
            StatusCode::SERVICE_UNAVAILABLE,
            ErrorResponse::new("SERVICE_UNAVAILABLE", "Database connection unavailable"),
        ),
        AppError::Internal { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::new("INTERNAL_ERROR", "An internal error occurred"),
        ),
    }
}

fn notification_parts(err: &NotificationError) -> (StatusCode, ErrorResponse) {
    let status = match err.kind() {
        NotificationErrorKind::MissingCredentials => StatusCode::BAD_REQUEST,
        NotificationErrorKind::DeliveryFailed => StatusCode::BAD_GATEWAY,
    };
    let body = ErrorResponse::new(err.kind().as_str(), err.message()).with_details(json!({
        "code": err.code(),
        "status": err.status(),
    }));
    (status, body)
}

/// Attaches the request id to error bodies and normalizes bare error
/// responses into [`ErrorResponse`] JSON.
pub async fn global_error_handler(request: Request, next: Next) -> Response {
    let request_id = request.extensions().get::<RequestId>().cloned();
    let response = next.run(request).await;

    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let body = match response.extensions().get::<ErrorResponse>() {
        Some(body) => body.clone(),
        None if is_json(&response) => return response,
        None => fallback_body(status),
    };
    let body = match request_id {
        Some(RequestId(id)) => body.with_request_id(&id),
        None => body,
    };

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.remove(header::CONTENT_TYPE);
    let mut rendered = (status, Json(body)).into_response();
    for (name, value) in parts.headers.iter() {
        if !rendered.headers().contains_key(name) {
            rendered.headers_mut().insert(name.clone(), value.clone());
        }
    }
    rendered
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"))
}

fn fallback_body(status: StatusCode) -> ErrorResponse {
    match status {
        StatusCode::NOT_FOUND => {
            ErrorResponse::new("NOT_FOUND", "The requested resource was not found")
        }
        StatusCode::METHOD_NOT_ALLOWED => ErrorResponse::new(
            "METHOD_NOT_ALLOWED",
            "HTTP method not allowed for this endpoint",
        ),
        StatusCode::UNSUPPORTED_MEDIA_TYPE => {
            ErrorResponse::new("UNSUPPORTED_MEDIA_TYPE", "Unsupported media type")
        }
        StatusCode::REQUEST_TIMEOUT => ErrorResponse::new("REQUEST_TIMEOUT", "Request timeout"),
        StatusCode::PAYLOAD_TOO_LARGE => {
            ErrorResponse::new("PAYLOAD_TOO_LARGE", "Request payload too large")
        }
        s if s.is_server_error() => {
            ErrorResponse::new("INTERNAL_ERROR", "An internal server error occurred")
        }
        _ => ErrorResponse::new("BAD_REQUEST", "Bad request"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, middleware, routing::get};
    use tower::ServiceExt;

    fn status_of(error: AppError) -> StatusCode {
        error_parts(&error).0
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(AppError::NotFound {
                entity: "notifier".into(),
                field: "name".into(),
                value: "x".into(),
            }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Duplicate {
                entity: "notifier".into(),
                field: "name".into(),
                value: "x".into(),
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::Validation {
                field: "chat_id".into(),
                reason: "bad".into(),
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::ConnectionPool {
                source: anyhow::anyhow!("down"),
            }),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(AppError::Internal {
                source: anyhow::anyhow!("boom"),
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_notification_errors_expose_code() {
        let (status, body) = error_parts(&NotificationError::missing_credentials().into());
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "MISSING_CREDENTIALS");
        assert_eq!(body.details.unwrap()["code"], 1);

        let (status, body) = error_parts(&NotificationError::rejected("telegram", 403).into());
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.code, "DELIVERY_FAILED");
        let details = body.details.unwrap();
        assert_eq!(details["code"], 2);
        assert_eq!(details["status"], 403);
    }

    #[test]
    fn test_internal_errors_are_sanitized() {
        let (_, body) = error_parts(&AppError::Internal {
            source: anyhow::anyhow!("secret connection string"),
        });
        assert!(!body.message.contains("secret"));
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn app() -> Router {
        async fn failing() -> Result<(), AppError> {
            Err(AppError::BadRequest {
                message: "nope".into(),
            })
        }

        Router::new()
            .route("/fail", get(failing))
            .layer(middleware::from_fn(global_error_handler))
            .layer(middleware::from_fn(
                |mut req: Request, next: Next| async move {
                    req.extensions_mut().insert(RequestId("req-1".into()));
                    next.run(req).await
                },
            ))
    }

    #[tokio::test]
    async fn test_handler_error_gets_request_id() {
        let response = app()
            .oneshot(Request::get("/fail").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["code"], "BAD_REQUEST");
        assert_eq!(json["message"], "nope");
        assert_eq!(json["request_id"], "req-1");
    }

    #[tokio::test]
    async fn test_unknown_route_becomes_json() {
        let response = app()
            .oneshot(Request::get("/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["request_id"], "req-1");
    }
}
