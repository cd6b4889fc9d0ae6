/// Comment store - persistence for flat comment rows
///
/// Pages are returned flat and newest-first so pagination runs over a stable
/// total ordering; thread shaping happens in the service layer. The
/// parent/post relationship is validated by the caller before `create`.
use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::Result;
use crate::models::Comment;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn create(
        &self,
        post_id: i64,
        user_id: Uuid,
        content: &str,
        parent_id: Option<i64>,
    ) -> Result<Comment>;

    async fn find_by_id(&self, comment_id: i64) -> Result<Option<Comment>>;

    /// Flat newest-first page of a post's comments, roots and replies mixed.
    async fn list_by_post(&self, post_id: i64, limit: i64, offset: i64) -> Result<Vec<Comment>>;

    /// Direct replies to a comment, oldest first.
    async fn list_replies(&self, comment_id: i64) -> Result<Vec<Comment>>;

    /// Returns false when no row matches both id and owner.
    async fn update(&self, comment_id: i64, user_id: Uuid, content: &str) -> Result<bool>;

    /// Removes the single comment; replies are left in place.
    async fn delete(&self, comment_id: i64) -> Result<bool>;

    async fn count_by_post(&self, post_id: i64) -> Result<i64>;

    async fn count_by_post_batch(&self, post_ids: &[i64]) -> Result<HashMap<i64, i64>>;

    /// Direct-reply count per comment; comments without replies are absent.
    async fn count_replies_batch(&self, comment_ids: &[i64]) -> Result<HashMap<i64, i64>>;
}

/// Postgres-backed comment store
#[derive(Clone)]
pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentStore for CommentRepository {
    async fn create(
        &self,
        post_id: i64,
        user_id: Uuid,
        content: &str,
        parent_id: Option<i64>,
    ) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (post_id, user_id, content, parent_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, post_id, user_id, content, parent_id, created_at, updated_at
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .bind(content)
        .bind(parent_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn find_by_id(&self, comment_id: i64) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, user_id, content, parent_id, created_at, updated_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn list_by_post(&self, post_id: i64, limit: i64, offset: i64) -> Result<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, user_id, content, parent_id, created_at, updated_at
            FROM comments
            WHERE post_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(post_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    async fn list_replies(&self, comment_id: i64) -> Result<Vec<Comment>> {
        let replies = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, user_id, content, parent_id, created_at, updated_at
            FROM comments
            WHERE parent_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(comment_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(replies)
    }

    async fn update(&self, comment_id: i64, user_id: Uuid, content: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE comments
            SET content = $1, updated_at = NOW()
            WHERE id = $2 AND user_id = $3
            "#,
        )
        .bind(content)
        .bind(comment_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, comment_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_by_post(&self, post_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn count_by_post_batch(&self, post_ids: &[i64]) -> Result<HashMap<i64, i64>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT post_id, COUNT(*) AS count
            FROM comments
            WHERE post_id = ANY($1)
            GROUP BY post_id
            "#,
        )
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await?;

        let counts = rows
            .into_iter()
            .map(|row| {
                let post_id: i64 = row.get("post_id");
                let count: i64 = row.get("count");
                (post_id, count)
            })
            .collect();

        Ok(counts)
    }

    async fn count_replies_batch(&self, comment_ids: &[i64]) -> Result<HashMap<i64, i64>> {
        if comment_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT parent_id, COUNT(*) AS count
            FROM comments
            WHERE parent_id = ANY($1)
            GROUP BY parent_id
            "#,
        )
        .bind(comment_ids)
        .fetch_all(&self.pool)
        .await?;

        let counts = rows
            .into_iter()
            .map(|row| {
                let parent_id: i64 = row.get("parent_id");
                let count: i64 = row.get("count");
                (parent_id, count)
            })
            .collect();

        Ok(counts)
    }
}
