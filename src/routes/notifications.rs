use crate::{auth::CurrentUser, error::AppError, response, state::AppState};
use actix_web::{get, http::StatusCode, patch, web, Responder};
use serde_json::json;
use uuid::Uuid;

/// The caller's notifications, newest first.
#[get("")]
pub async fn get_notifications(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let notifications = state.store.list_notifications(user.id).await?;

    response::with_payload(
        StatusCode::OK,
        "Notifications fetched",
        "data",
        &notifications,
    )
}

#[patch("/read-all")]
pub async fn mark_all_read(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let updated = state.store.mark_all_notifications_read(user.id).await?;

    response::with_payload(
        StatusCode::OK,
        "All notifications marked as read",
        "data",
        &json!({ "updated": updated }),
    )
}

/// Marks one of the caller's notifications read; other users' ids answer 404.
#[patch("/{id}/read")]
pub async fn mark_read(
    state: web::Data<AppState>,
    user: CurrentUser,
    notification_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let notification = state
        .store
        .mark_notification_read(notification_id.into_inner(), user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Notification not found".into()))?;

    response::with_payload(
        StatusCode::OK,
        "Notification marked as read",
        "data",
        &notification,
    )
}
