use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::info;

use crate::auth::middleware::CurrentUser;
use crate::notification::model::{NotificationCount, NotificationResponse};
use crate::notification::service::NotificationService;
use crate::state::AppState;

/// Unread notification count
#[utoipa::path(
    get,
    path = "/notifications/count",
    responses(
        (status = 200, description = "Unread count", body = crate::notification::model::NotificationCount),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "notifications"
)]
pub async fn get_notification_count(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Response {
    let service = NotificationService::new(state.pool);

    match service.unread_count(user.id).await {
        Ok(count) => (StatusCode::OK, Json(NotificationCount { count })).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Recent notifications
///
/// Returns the ten most recent notifications and marks them read.
#[utoipa::path(
    get,
    path = "/notifications",
    responses(
        (status = 200, description = "Recent notifications", body = [crate::notification::model::NotificationResponse]),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "notifications"
)]
pub async fn get_notifications(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Response {
    let service = NotificationService::new(state.pool);

    match service.list_notifications(user.id).await {
        Ok(notifications) => {
            info!("Returning {} notifications to user {}", notifications.len(), user.id);
            let body: Vec<NotificationResponse> =
                notifications.into_iter().map(NotificationResponse::from).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => e.into_response(),
    }
}
