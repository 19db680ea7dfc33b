use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::info;

use crate::auth::middleware::CurrentUser;
use crate::error::MessageResponse;
use crate::social::service::FollowService;
use crate::state::AppState;

/// List other users
///
/// Every user except the caller, with whether the caller follows them.
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "Other users", body = [crate::social::model::UserListEntry]),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "social"
)]
pub async fn list_users(CurrentUser(user): CurrentUser, State(state): State<AppState>) -> Response {
    let service = FollowService::new(state.pool);

    match service.list_other_users(user.id).await {
        Ok(users) => (StatusCode::OK, Json(users)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Follow a user
#[utoipa::path(
    post,
    path = "/follow/{user_id}",
    params(
        ("user_id" = i64, Path, description = "User to follow")
    ),
    responses(
        (status = 200, description = "Followed", body = crate::error::MessageResponse),
        (status = 400, description = "Self-follow or already following", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "social"
)]
pub async fn follow_user(
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<i64>,
    State(state): State<AppState>,
) -> Response {
    info!("User {} requested to follow {}", user.id, user_id);

    let service = FollowService::new(state.pool);

    match service.follow(user.id, user_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse::new("User followed successfully")),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Unfollow a user
#[utoipa::path(
    delete,
    path = "/unfollow/{user_id}",
    params(
        ("user_id" = i64, Path, description = "User to unfollow")
    ),
    responses(
        (status = 200, description = "Unfollowed", body = crate::error::MessageResponse),
        (status = 400, description = "Not following this user", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "social"
)]
pub async fn unfollow_user(
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<i64>,
    State(state): State<AppState>,
) -> Response {
    info!("User {} requested to unfollow {}", user.id, user_id);

    let service = FollowService::new(state.pool);

    match service.unfollow(user.id, user_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse::new("User unfollowed successfully")),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
