use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    headers::{authorization::Bearer, Authorization},
    http::{request::Parts, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
    RequestPartsExt, TypedHeader,
};
use tracing::{error, info};

use super::model::User;
use super::service::authenticate;
use crate::error::ErrorResponse;
use crate::state::AppState;

/// The authenticated caller, inserted into request extensions by
/// [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: message.to_string(),
            code: "UNAUTHORIZED".to_string(),
        }),
    )
        .into_response()
}

/// Authentication middleware to protect routes
pub async fn auth_middleware<B>(
    State(state): State<AppState>,
    req: Request<B>,
    next: Next<B>,
) -> Result<Response, Response> {
    let (mut parts, body) = req.into_parts();

    let TypedHeader(Authorization(bearer)) = parts
        .extract::<TypedHeader<Authorization<Bearer>>>()
        .await
        .map_err(|e| {
            info!("Authorization header extraction failed: {}", e);
            unauthorized("Missing or invalid Authorization header")
        })?;

    let user = authenticate(&state.pool, &state.tokens, bearer.token())
        .await
        .map_err(|e| {
            if e.status_code() == StatusCode::UNAUTHORIZED {
                info!("Authentication rejected: {}", e);
                unauthorized("Invalid token")
            } else {
                e.into_response()
            }
        })?;

    info!("User authenticated: {}", user.id);
    parts.extensions.insert(CurrentUser(user));

    let req = Request::from_parts(parts, body);
    Ok(next.run(req).await)
}

/// Extractor for authenticated user
#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<CurrentUser>().cloned().ok_or_else(|| {
            error!("CurrentUser not found in request extensions");
            unauthorized("Authentication required")
        })
    }
}
