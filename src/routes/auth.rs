use axum::{routing::post, Router};

use crate::auth::controller::{login, register};
use crate::state::AppState;

/// Public registration and login routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .with_state(state)
}
