use crate::auth::middleware::CurrentUser;
use crate::post::model::CreatePostRequest;
use crate::post::service::PostService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::info;

/// Publish a post
///
/// Creates a post owned by the authenticated user and notifies their followers.
#[utoipa::path(
    post,
    path = "/posts",
    request_body = crate::post::model::CreatePostRequest,
    responses(
        (status = 200, description = "Post created successfully", body = crate::post::model::Post),
        (status = 400, description = "Empty content", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::error::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "posts"
)]
pub async fn create_post(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(post_data): Json<CreatePostRequest>,
) -> Response {
    info!("Creating post for user: {}", user.id);

    let service = PostService::new(state.pool);

    match service.create_post(&user, post_data).await {
        Ok(post) => (StatusCode::OK, Json(post)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Recent posts
///
/// The twenty most recent posts from all users, newest first.
#[utoipa::path(
    get,
    path = "/posts",
    responses(
        (status = 200, description = "Recent posts", body = [crate::post::model::PostResponse]),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "posts"
)]
pub async fn get_posts(_user: CurrentUser, State(state): State<AppState>) -> Response {
    let service = PostService::new(state.pool);

    match service.get_recent_posts().await {
        Ok(posts) => {
            info!("Retrieved {} recent posts", posts.len());
            (StatusCode::OK, Json(posts)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Get post by slug
#[utoipa::path(
    get,
    path = "/post/{slug}",
    params(
        ("slug" = String, Path, description = "Post slug")
    ),
    responses(
        (status = 200, description = "Post retrieved successfully", body = crate::post::model::PostResponse),
        (status = 404, description = "Post not found", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "posts"
)]
pub async fn get_post(
    _user: CurrentUser,
    Path(slug): Path<String>,
    State(state): State<AppState>,
) -> Response {
    info!("Getting post with slug: {}", slug);

    let service = PostService::new(state.pool);

    match service.get_post_by_slug(&slug).await {
        Ok(post) => (StatusCode::OK, Json(post)).into_response(),
        Err(e) => e.into_response(),
    }
}
