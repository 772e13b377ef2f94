//! Host event entry point.

use axum::{Json, Router, extract::State, routing::post};

use crate::api::dto::{NotifyRequest, NotifyResponse};
use crate::api::extract::ValidatedJson;
use crate::error::AppResult;
use crate::services::notifications::Notification;
use crate::state::AppState;

pub fn notify_routes() -> Router<AppState> {
    Router::new().route("/notify", post(notify))
}

/// Fans the event out to every enabled notifier. Individual delivery
/// failures are reported in the body, never as an error status.
pub async fn notify(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<NotifyRequest>,
) -> AppResult<Json<NotifyResponse>> {
    let notification = Notification::from(request);
    let reports = state
        .services
        .notifications
        .notify_all(&notification)
        .await?;
    Ok(Json(reports.into()))
}
