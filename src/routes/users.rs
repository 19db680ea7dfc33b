use crate::auth::middleware::auth_middleware;
use crate::social::controller;
use crate::state::AppState;
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

/// User listing and follow graph routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/users", get(controller::list_users))
        .route("/follow/:user_id", post(controller::follow_user))
        .route("/unfollow/:user_id", delete(controller::unfollow_user))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
