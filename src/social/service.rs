use std::collections::HashSet;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use thiserror::Error;
use tracing::info;

use crate::error::{error_response, ErrorKind};
use crate::social::model::{Follow, UserListEntry};

#[derive(Error, Debug)]
pub enum FollowError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Cannot follow yourself")]
    SelfFollow,

    #[error("Already following this user")]
    AlreadyFollowing,

    #[error("Not following this user")]
    NotFollowing,

    #[error("User not found")]
    UserNotFound,
}

impl FollowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SelfFollow => ErrorKind::Validation,
            Self::AlreadyFollowing => ErrorKind::Conflict,
            Self::NotFollowing | Self::UserNotFound => ErrorKind::NotFound,
            Self::DatabaseError(_) => ErrorKind::Internal,
        }
    }

    /// Edge errors all answer 400; only an unknown target user is a 404.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::SelfFollow | Self::AlreadyFollowing | Self::NotFollowing => StatusCode::BAD_REQUEST,
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for FollowError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        error_response(self.status_code(), kind, kind.code(), self.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct FollowService {
    pool: SqlitePool,
}

impl FollowService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn find_edge(&self, follower_id: i64, following_id: i64) -> Result<Option<Follow>, FollowError> {
        let edge = sqlx::query_as::<_, Follow>(
            r#"
            SELECT id, follower_id, following_id, created_at
            FROM follows
            WHERE follower_id = ? AND following_id = ?
            LIMIT 1
            "#,
        )
        .bind(follower_id)
        .bind(following_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(edge)
    }

    async fn user_exists(&self, user_id: i64) -> Result<bool, FollowError> {
        let exists: bool = sqlx::query("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?
            .get(0);

        Ok(exists)
    }

    /// Add the edge `actor -> target`.
    ///
    /// The duplicate check and the insert are separate statements, so two
    /// concurrent calls for the same pair can both succeed.
    pub async fn follow(&self, actor_id: i64, target_id: i64) -> Result<(), FollowError> {
        if actor_id == target_id {
            return Err(FollowError::SelfFollow);
        }
        if !self.user_exists(target_id).await? {
            return Err(FollowError::UserNotFound);
        }
        if self.find_edge(actor_id, target_id).await?.is_some() {
            return Err(FollowError::AlreadyFollowing);
        }

        sqlx::query("INSERT INTO follows (follower_id, following_id, created_at) VALUES (?, ?, ?)")
            .bind(actor_id)
            .bind(target_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        info!("User {} now follows user {}", actor_id, target_id);
        Ok(())
    }

    pub async fn unfollow(&self, actor_id: i64, target_id: i64) -> Result<(), FollowError> {
        let edge = self
            .find_edge(actor_id, target_id)
            .await?
            .ok_or(FollowError::NotFollowing)?;

        sqlx::query("DELETE FROM follows WHERE id = ?")
            .bind(edge.id)
            .execute(&self.pool)
            .await?;

        info!("User {} unfollowed user {}", actor_id, target_id);
        Ok(())
    }

    /// Ids the actor currently follows.
    pub async fn following_ids(&self, actor_id: i64) -> Result<HashSet<i64>, FollowError> {
        let ids: Vec<i64> = sqlx::query_scalar("SELECT following_id FROM follows WHERE follower_id = ?")
            .bind(actor_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(ids.into_iter().collect())
    }

    /// Every user except the actor, flagged with whether the actor follows them.
    pub async fn list_other_users(&self, actor_id: i64) -> Result<Vec<UserListEntry>, FollowError> {
        let users: Vec<(i64, String)> =
            sqlx::query_as("SELECT id, email FROM users WHERE id != ? ORDER BY id")
                .bind(actor_id)
                .fetch_all(&self.pool)
                .await?;

        let following = self.following_ids(actor_id).await?;

        Ok(users
            .into_iter()
            .map(|(id, email)| UserListEntry {
                id,
                email,
                is_following: following.contains(&id),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    async fn insert_user(pool: &SqlitePool, email: &str) -> i64 {
        sqlx::query("INSERT INTO users (email, hashed_password, created_at) VALUES (?, 'x', ?)")
            .bind(email)
            .bind(Utc::now())
            .execute(pool)
            .await
            .unwrap()
            .last_insert_rowid()
    }

    async fn edge_count(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM follows")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_follow_then_duplicate_conflicts() {
        let pool = test_pool().await;
        let service = FollowService::new(pool.clone());
        let a = insert_user(&pool, "a@example.com").await;
        let b = insert_user(&pool, "b@example.com").await;

        service.follow(a, b).await.unwrap();
        let err = service.follow(a, b).await.unwrap_err();

        assert!(matches!(err, FollowError::AlreadyFollowing));
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(edge_count(&pool).await, 1);

        // The reverse direction is a different edge
        service.follow(b, a).await.unwrap();
        assert_eq!(edge_count(&pool).await, 2);
    }

    #[tokio::test]
    async fn test_self_follow_rejected() {
        let pool = test_pool().await;
        let service = FollowService::new(pool.clone());
        let a = insert_user(&pool, "a@example.com").await;

        let err = service.follow(a, a).await.unwrap_err();
        assert!(matches!(err, FollowError::SelfFollow));
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(edge_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_follow_unknown_user() {
        let pool = test_pool().await;
        let service = FollowService::new(pool.clone());
        let a = insert_user(&pool, "a@example.com").await;

        let err = service.follow(a, a + 100).await.unwrap_err();
        assert!(matches!(err, FollowError::UserNotFound));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unfollow() {
        let pool = test_pool().await;
        let service = FollowService::new(pool.clone());
        let a = insert_user(&pool, "a@example.com").await;
        let b = insert_user(&pool, "b@example.com").await;

        let err = service.unfollow(a, b).await.unwrap_err();
        assert!(matches!(err, FollowError::NotFollowing));
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        service.follow(a, b).await.unwrap();
        service.unfollow(a, b).await.unwrap();
        assert_eq!(edge_count(&pool).await, 0);

        // Following again after an unfollow is allowed
        service.follow(a, b).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_other_users_flags_follows() {
        let pool = test_pool().await;
        let service = FollowService::new(pool.clone());
        let a = insert_user(&pool, "a@example.com").await;
        let b = insert_user(&pool, "b@example.com").await;
        let c = insert_user(&pool, "c@example.com").await;

        service.follow(a, c).await.unwrap();
        // Being followed does not set the flag
        service.follow(b, a).await.unwrap();

        let listed = service.list_other_users(a).await.unwrap();
        let summary: Vec<(i64, bool)> = listed.iter().map(|u| (u.id, u.is_following)).collect();
        assert_eq!(summary, vec![(b, false), (c, true)]);
        assert!(listed.iter().all(|u| u.id != a));
    }
}
