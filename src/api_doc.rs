use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Security scheme configuration for OpenAPI
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);

        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

/// API documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Social Feed API",
        version = "0.1.0",
        description = "Accounts, short posts, follows and follower notifications"
    ),
    paths(
        crate::routes::health::health_check,
        crate::auth::controller::register,
        crate::auth::controller::login,
        crate::post::controller::create_post,
        crate::post::controller::get_posts,
        crate::post::controller::get_post,
        crate::social::controller::list_users,
        crate::social::controller::follow_user,
        crate::social::controller::unfollow_user,
        crate::notification::controller::get_notification_count,
        crate::notification::controller::get_notifications
    ),
    components(
        schemas(
            crate::schema_ext::DateTimeWrapper,
            crate::error::ErrorResponse,
            crate::error::MessageResponse,
            crate::routes::health::HealthResponse,
            crate::auth::controller::RegisterRequest,
            crate::auth::controller::LoginRequest,
            crate::auth::controller::AuthResponse,
            crate::post::model::Post,
            crate::post::model::CreatePostRequest,
            crate::post::model::PostResponse,
            crate::social::model::UserListEntry,
            crate::notification::model::NotificationResponse,
            crate::notification::model::NotificationCount
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Service health"),
        (name = "authentication", description = "Registration and login"),
        (name = "posts", description = "Publishing and reading posts"),
        (name = "social", description = "Users and the follow graph"),
        (name = "notifications", description = "Follower notifications")
    )
)]
pub struct ApiDoc;
