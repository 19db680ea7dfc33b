pub mod api_doc;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod notification;
pub mod post;
pub mod routes;
pub mod schema_ext;
pub mod social;
pub mod state;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api_doc::ApiDoc;
use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        // API documentation
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(routes::home::routes())
        .merge(routes::health::routes(state.clone()))
        .merge(routes::auth::routes(state.clone()))
        .merge(routes::posts::routes(state.clone()))
        .merge(routes::users::routes(state.clone()))
        .merge(routes::notifications::routes(state))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
