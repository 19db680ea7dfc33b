use crate::auth::middleware::auth_middleware;
use crate::post::controller;
use crate::state::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/posts",
            post(controller::create_post).get(controller::get_posts),
        )
        .route("/post/:slug", get(controller::get_post))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
