use axum::{middleware, routing::get, Router};

use crate::auth::middleware::auth_middleware;
use crate::notification::controller::{get_notification_count, get_notifications};
use crate::state::AppState;

/// Create a router for notifications
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/notifications", get(get_notifications))
        .route("/notifications/count", get(get_notification_count))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
