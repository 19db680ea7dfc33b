use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use email_address::EmailAddress;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{error, info};

use super::jwt::TokenService;
use super::model::User;
use super::password::{hash_password, verify_password, DUMMY_HASH};
use crate::error::{error_response, ErrorKind};

// Input data structures
pub struct RegisterData {
    pub email: String,
    pub password: String,
}

pub struct LoginData {
    pub email: String,
    pub password: String,
}

// Result data structure
#[derive(Debug)]
pub struct AuthResult {
    pub user_id: i64,
    pub email: String,
    pub token: String,
}

// Service errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Email already registered")]
    AlreadyExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("User not found")]
    UnknownSubject,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Password hashing failed: {0}")]
    HashingError(String),

    #[error("Failed to generate auth token")]
    TokenError,
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::Validation,
            Self::AlreadyExists => ErrorKind::Conflict,
            Self::InvalidCredentials | Self::InvalidToken | Self::UnknownSubject => ErrorKind::Auth,
            Self::DatabaseError(_) | Self::HashingError(_) | Self::TokenError => {
                ErrorKind::Internal
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.kind().status_code()
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        error_response(self.status_code(), kind, kind.code(), self.message())
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EmailAddress::is_valid(email)
}

pub async fn find_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, email, hashed_password, created_at FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

async fn hash_blocking(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::HashingError(e.to_string()))?
        .map_err(|e| AuthError::HashingError(e.to_string()))
}

async fn verify_blocking(password: String, hashed: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hashed))
        .await
        .map_err(|e| AuthError::HashingError(e.to_string()))
}

// User registration service
pub async fn register(
    pool: &SqlitePool,
    tokens: &TokenService,
    data: RegisterData,
) -> Result<AuthResult, AuthError> {
    let email = data.email.trim().to_string();

    if !is_valid_email(&email) {
        return Err(AuthError::InvalidInput("Invalid email address".to_string()));
    }
    if data.password.is_empty() {
        return Err(AuthError::InvalidInput("Password is required".to_string()));
    }

    if find_user_by_email(pool, &email).await?.is_some() {
        info!("User with email {} already exists", email);
        return Err(AuthError::AlreadyExists);
    }

    let hashed_password = hash_blocking(data.password).await?;

    // The UNIQUE index catches a registration racing past the check above
    let user_id = sqlx::query(
        "INSERT INTO users (email, hashed_password, created_at) VALUES (?, ?, ?)",
    )
    .bind(&email)
    .bind(&hashed_password)
    .bind(Utc::now())
    .execute(pool)
    .await
    .map_err(|e| {
        if e.as_database_error().map_or(false, |db| db.is_unique_violation()) {
            AuthError::AlreadyExists
        } else {
            error!("Failed to insert new user: {}", e);
            AuthError::DatabaseError(e)
        }
    })?
    .last_insert_rowid();

    info!("User created successfully with ID: {}", user_id);

    let token = tokens.issue(&email).map_err(|e| {
        error!("Token generation failed: {}", e);
        AuthError::TokenError
    })?;

    Ok(AuthResult {
        user_id,
        email,
        token,
    })
}

// User login service
pub async fn login(
    pool: &SqlitePool,
    tokens: &TokenService,
    data: LoginData,
) -> Result<AuthResult, AuthError> {
    let email = data.email.trim();

    // Unknown email and wrong password are the same error, and both pay for
    // one Argon2 verification
    let user = match find_user_by_email(pool, email).await? {
        Some(user) => user,
        None => {
            verify_blocking(data.password, DUMMY_HASH.to_string()).await?;
            info!("No user found with email: {}", email);
            return Err(AuthError::InvalidCredentials);
        }
    };

    if !verify_blocking(data.password, user.hashed_password.clone()).await? {
        info!("Password verification failed for user ID: {}", user.id);
        return Err(AuthError::InvalidCredentials);
    }

    let token = tokens.issue(&user.email).map_err(|e| {
        error!("Token generation failed: {}", e);
        AuthError::TokenError
    })?;

    info!("Login successful for user ID: {}", user.id);

    Ok(AuthResult {
        user_id: user.id,
        email: user.email,
        token,
    })
}

/// Resolve a bearer token to its user.
pub async fn authenticate(
    pool: &SqlitePool,
    tokens: &TokenService,
    token: &str,
) -> Result<User, AuthError> {
    let claims = tokens.validate(token).map_err(|e| {
        info!("Token validation failed: {}", e);
        AuthError::InvalidToken
    })?;

    find_user_by_email(pool, &claims.sub)
        .await?
        .ok_or(AuthError::UnknownSubject)
}
