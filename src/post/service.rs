use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::auth::model::User;
use crate::error::{error_response, ErrorKind};
use crate::notification::model::NotificationError;
use crate::notification::service::NotificationService;
use crate::post::model::{CreatePostRequest, Post, PostResponse};
use crate::post::slug::create_slug;

/// Slug candidates tried before giving up on a post.
pub const MAX_SLUG_ATTEMPTS: usize = 10;
/// Size of the recent-posts feed.
pub const FEED_LIMIT: i64 = 20;

#[derive(Error, Debug)]
pub enum PostError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Notification fan-out failed: {0}")]
    NotificationError(#[from] NotificationError),

    #[error("Post not found")]
    NotFound,

    #[error("Could not find a free slug after {0} attempts")]
    SlugSpaceExhausted(usize),

    #[error("{0}")]
    InvalidInput(String),
}

impl PostError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::Validation,
            Self::NotFound => ErrorKind::NotFound,
            Self::DatabaseError(_) | Self::NotificationError(_) | Self::SlugSpaceExhausted(_) => {
                ErrorKind::Internal
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.kind().status_code()
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::SlugSpaceExhausted(_) => "SLUG_SPACE_EXHAUSTED",
            _ => self.kind().code(),
        }
    }
}

impl IntoResponse for PostError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), self.kind(), self.code(), self.to_string())
    }
}

pub struct PostService {
    pool: SqlitePool,
    notifications: NotificationService,
}

impl PostService {
    pub fn new(pool: SqlitePool) -> Self {
        let notifications = NotificationService::new(pool.clone());
        Self {
            pool,
            notifications,
        }
    }

    // Helper to check if slug exists
    async fn check_slug_exists(&self, slug: &str) -> Result<bool, PostError> {
        let exists: bool = sqlx::query("SELECT EXISTS(SELECT 1 FROM posts WHERE slug = ?)")
            .bind(slug)
            .fetch_one(&self.pool)
            .await?
            .get(0);

        Ok(exists)
    }

    /// Draw slugs from `generate` until one is free in storage, giving up
    /// after [`MAX_SLUG_ATTEMPTS`].
    pub async fn unique_slug_with<F>(&self, content: &str, mut generate: F) -> Result<String, PostError>
    where
        F: FnMut(&str) -> String,
    {
        for attempt in 1..=MAX_SLUG_ATTEMPTS {
            let slug = generate(content);
            if !self.check_slug_exists(&slug).await? {
                return Ok(slug);
            }
            warn!("Slug collision on attempt {}: {}", attempt, slug);
        }

        error!("Slug space exhausted after {} attempts", MAX_SLUG_ATTEMPTS);
        Err(PostError::SlugSpaceExhausted(MAX_SLUG_ATTEMPTS))
    }

    pub async fn unique_slug(&self, content: &str) -> Result<String, PostError> {
        self.unique_slug_with(content, create_slug).await
    }

    /// Publish a post and notify the author's followers.
    ///
    /// The post is committed before fan-out starts; a fan-out error is
    /// returned even though the post already exists.
    pub async fn create_post(&self, author: &User, post: CreatePostRequest) -> Result<Post, PostError> {
        if post.content.trim().is_empty() {
            return Err(PostError::InvalidInput(
                "Post content cannot be empty".to_string(),
            ));
        }

        let slug = self.unique_slug(&post.content).await?;
        let created_at = Utc::now();

        let id = sqlx::query("INSERT INTO posts (content, slug, user_id, created_at) VALUES (?, ?, ?, ?)")
            .bind(&post.content)
            .bind(&slug)
            .bind(author.id)
            .bind(created_at)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        let created = Post {
            id,
            content: post.content,
            slug,
            user_id: author.id,
            created_at,
        };
        info!("Created post with ID: {} ({})", created.id, created.slug);

        self.notifications.fan_out(&created, author).await?;

        Ok(created)
    }

    /// The most recent posts across all users, newest first.
    pub async fn get_recent_posts(&self) -> Result<Vec<PostResponse>, PostError> {
        let posts = sqlx::query_as::<_, PostResponse>(
            r#"
            SELECT p.id, p.content, p.slug, u.email AS author, p.created_at
            FROM posts p
            JOIN users u ON u.id = p.user_id
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT ?
            "#,
        )
        .bind(FEED_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    pub async fn get_post_by_slug(&self, slug: &str) -> Result<PostResponse, PostError> {
        sqlx::query_as::<_, PostResponse>(
            r#"
            SELECT p.id, p.content, p.slug, u.email AS author, p.created_at
            FROM posts p
            JOIN users u ON u.id = p.user_id
            WHERE p.slug = ?
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(PostError::NotFound)
    }
}
