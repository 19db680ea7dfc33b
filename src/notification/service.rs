use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::info;

use crate::auth::model::User;
use crate::error::{error_response, ErrorKind};
use crate::notification::model::{Notification, NotificationError};
use crate::post::model::Post;

/// Characters of post content copied into a notification preview.
pub const PREVIEW_CHARS: usize = 50;
/// Notifications returned (and marked read) per listing.
pub const NOTIFICATIONS_PER_PAGE: i64 = 10;

impl IntoResponse for NotificationError {
    fn into_response(self) -> Response {
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Internal,
            ErrorKind::Internal.code(),
            self.to_string(),
        )
    }
}

/// First [`PREVIEW_CHARS`] characters, with `...` appended only when
/// something was cut.
pub fn make_preview(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

#[derive(Debug, Clone)]
pub struct NotificationService {
    pool: SqlitePool,
}

impl NotificationService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Write one notification per follower of `author` for a freshly
    /// committed `post`. Returns the number written.
    ///
    /// All rows go in one transaction, separate from the post's own commit:
    /// a failure here leaves the post in place with no notifications.
    pub async fn fan_out(&self, post: &Post, author: &User) -> Result<usize, NotificationError> {
        let followers: Vec<i64> =
            sqlx::query_scalar("SELECT follower_id FROM follows WHERE following_id = ?")
                .bind(author.id)
                .fetch_all(&self.pool)
                .await?;

        if followers.is_empty() {
            return Ok(0);
        }

        let preview = make_preview(&post.content);
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;
        for follower_id in &followers {
            sqlx::query(
                r#"
                INSERT INTO notifications (
                    user_id, post_id, post_slug, author_email, post_preview, is_read, created_at
                )
                VALUES (?, ?, ?, ?, ?, 0, ?)
                "#,
            )
            .bind(follower_id)
            .bind(post.id)
            .bind(&post.slug)
            .bind(&author.email)
            .bind(&preview)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        info!(
            "Notified {} followers of user {} about post {}",
            followers.len(),
            author.id,
            post.id
        );
        Ok(followers.len())
    }

    pub async fn unread_count(&self, user_id: i64) -> Result<i64, NotificationError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = ? AND is_read = 0",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// The most recent notifications for `user_id`, newest first. Exactly the
    /// returned rows are marked read.
    pub async fn list_notifications(&self, user_id: i64) -> Result<Vec<Notification>, NotificationError> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, user_id, post_id, post_slug, author_email, post_preview, is_read, created_at
            FROM notifications
            WHERE user_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(NOTIFICATIONS_PER_PAGE)
        .fetch_all(&self.pool)
        .await?;

        let unread: Vec<i64> = notifications
            .iter()
            .filter(|n| !n.is_read)
            .map(|n| n.id)
            .collect();

        if !unread.is_empty() {
            let mut query = QueryBuilder::<Sqlite>::new("UPDATE notifications SET is_read = 1 WHERE id IN (");
            let mut ids = query.separated(", ");
            for id in &unread {
                ids.push_bind(*id);
            }
            ids.push_unseparated(")");
            query.build().execute(&self.pool).await?;

            info!("Marked {} notifications read for user {}", unread.len(), user_id);
        }

        Ok(notifications)
    }
}
