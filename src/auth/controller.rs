use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use super::service::{self, AuthResult, LoginData, RegisterData};
use crate::state::AppState;

// Request DTOs
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// Response DTOs
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub email: String,
}

impl From<AuthResult> for AuthResponse {
    fn from(result: AuthResult) -> Self {
        Self {
            access_token: result.token,
            token_type: "bearer".to_string(),
            email: result.email,
        }
    }
}

// Controller for user registration
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered successfully", body = AuthResponse),
        (status = 400, description = "Email already registered or invalid input", body = crate::error::ErrorResponse)
    ),
    tag = "authentication"
)]
pub async fn register(State(state): State<AppState>, Json(req): Json<RegisterRequest>) -> Response {
    info!("Registration request received for email: {}", req.email);

    let data = RegisterData {
        email: req.email,
        password: req.password,
    };

    match service::register(&state.pool, &state.tokens, data).await {
        Ok(result) => {
            info!("User registered successfully: {}", result.user_id);
            (StatusCode::OK, Json(AuthResponse::from(result))).into_response()
        }
        Err(error) => error.into_response(),
    }
}

// Controller for user login
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    ),
    tag = "authentication"
)]
pub async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> Response {
    info!("Login request received for email: {}", req.email);

    let data = LoginData {
        email: req.email,
        password: req.password,
    };

    match service::login(&state.pool, &state.tokens, data).await {
        Ok(result) => {
            info!("User login successful: {}", result.user_id);
            (StatusCode::OK, Json(AuthResponse::from(result))).into_response()
        }
        Err(error) => error.into_response(),
    }
}
