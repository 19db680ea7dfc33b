use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Serialize, FromRow, Clone, ToSchema)]
pub struct Post {
    pub id: i64,
    pub content: String,
    pub slug: String,
    #[serde(skip_serializing)]
    pub user_id: i64,
    #[schema(value_type = crate::schema_ext::DateTimeWrapper)]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatePostRequest {
    pub content: String,
}

/// A post together with its author's email.
#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PostResponse {
    pub id: i64,
    pub content: String,
    pub slug: String,
    pub author: String,
    #[schema(value_type = crate::schema_ext::DateTimeWrapper)]
    pub created_at: DateTime<Utc>,
}
