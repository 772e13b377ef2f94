//! Notifier management endpoints: listing, settings, toggling and test sends.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};

use crate::api::dto::{
    NotifierResponse, SetEnabledRequest, TestNotificationResponse, UpdateSettingsRequest,
};
use crate::api::extract::ValidatedJson;
use crate::error::AppResult;
use crate::models::NotifierSettings;
use crate::state::AppState;

pub fn notifier_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifiers))
        .route("/{name}", get(get_settings).put(update_settings))
        .route("/{name}/enabled", put(set_enabled))
        .route("/{name}/test", post(send_test))
}

pub async fn list_notifiers(State(state): State<AppState>) -> AppResult<Json<Vec<NotifierResponse>>> {
    let descriptors = state.services.notifications.list().await?;
    Ok(Json(descriptors.into_iter().map(Into::into).collect()))
}

pub async fn get_settings(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<NotifierSettings>> {
    let settings = state.services.notifications.get_settings(&name).await?;
    Ok(Json(settings))
}

pub async fn update_settings(
    State(state): State<AppState>,
    Path(name): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateSettingsRequest>,
) -> AppResult<Json<NotifierSettings>> {
    let notifications = &state.services.notifications;
    let kind = notifications.registry().require(&name)?.settings_kind();
    let saved = notifications
        .update_settings(&name, request.into_settings(kind))
        .await?;
    Ok(Json(saved))
}

pub async fn set_enabled(
    State(state): State<AppState>,
    Path(name): Path<String>,
    ValidatedJson(request): ValidatedJson<SetEnabledRequest>,
) -> AppResult<StatusCode> {
    state
        .services
        .notifications
        .set_enabled(&name, request.enabled)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn send_test(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<TestNotificationResponse>> {
    let delivered = state.services.notifications.send_test(&name).await?;
    Ok(Json(TestNotificationResponse { name, delivered }))
}
