/// Post store - persistence for post rows and their tag sets
use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{NewPost, Post, PostEngagement, PostRecord};

/// Storage contract for posts. Update is owner-scoped at this layer as well
/// as in the service, so a mismatched owner shows up as zero rows affected.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn create(&self, new_post: &NewPost) -> Result<Post>;

    async fn find_by_id(&self, post_id: i64) -> Result<Option<Post>>;

    /// Newest-first page of posts with aggregate counts. When a viewer is
    /// given the implementation may fill the engagement flags in the same
    /// round trip; callers back-fill from the ledger when it does not.
    async fn list(
        &self,
        limit: i64,
        offset: i64,
        viewer: Option<Uuid>,
    ) -> Result<Vec<PostRecord>>;

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Post>>;

    /// Posts the user has saved, most recently saved first.
    async fn find_saved_by_user(&self, user_id: Uuid) -> Result<Vec<Post>>;

    /// Returns false when no row matches both id and owner.
    async fn update(&self, post: &Post) -> Result<bool>;

    async fn delete(&self, post_id: i64) -> Result<bool>;

    /// Fully replace the tag set; not additive.
    async fn replace_tags(&self, post_id: i64, tags: &[String]) -> Result<()>;

    async fn tags(&self, post_id: i64) -> Result<Vec<String>>;

    async fn tags_batch(&self, post_ids: &[i64]) -> Result<HashMap<i64, Vec<String>>>;
}

/// Postgres-backed post store
#[derive(Clone)]
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PostRepository {
    async fn create(&self, new_post: &NewPost) -> Result<Post> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (user_id, title, content, image_url, link_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, title, content, image_url, link_url, created_at, updated_at
            "#,
        )
        .bind(new_post.user_id)
        .bind(&new_post.title)
        .bind(&new_post.content)
        .bind(&new_post.image_url)
        .bind(&new_post.link_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    async fn find_by_id(&self, post_id: i64) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, user_id, title, content, image_url, link_url, created_at, updated_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn list(
        &self,
        limit: i64,
        offset: i64,
        viewer: Option<Uuid>,
    ) -> Result<Vec<PostRecord>> {
        match viewer {
            Some(user_id) => {
                let rows = sqlx::query(
                    r#"
                    SELECT p.id, p.user_id, p.title, p.content, p.image_url, p.link_url,
                           p.created_at, p.updated_at,
                           (SELECT COUNT(*) FROM post_likes WHERE post_id = p.id) AS like_count,
                           (SELECT COUNT(*) FROM comments WHERE post_id = p.id) AS comment_count,
                           (pl.user_id IS NOT NULL) AS is_liked,
                           (sp.user_id IS NOT NULL) AS is_saved,
                           (pr.user_id IS NOT NULL) AS is_reported
                    FROM posts p
                    LEFT JOIN post_likes pl ON pl.post_id = p.id AND pl.user_id = $3
                    LEFT JOIN saved_posts sp ON sp.post_id = p.id AND sp.user_id = $3
                    LEFT JOIN post_reports pr ON pr.post_id = p.id AND pr.user_id = $3
                    ORDER BY p.created_at DESC
                    LIMIT $1 OFFSET $2
                    "#,
                )
                .bind(limit)
                .bind(offset)
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

                let records = rows
                    .into_iter()
                    .map(|row| PostRecord {
                        post: Post {
                            id: row.get("id"),
                            user_id: row.get("user_id"),
                            title: row.get("title"),
                            content: row.get("content"),
                            image_url: row.get("image_url"),
                            link_url: row.get("link_url"),
                            created_at: row.get("created_at"),
                            updated_at: row.get("updated_at"),
                        },
                        like_count: row.get("like_count"),
                        comment_count: row.get("comment_count"),
                        engagement: Some(PostEngagement {
                            is_liked: row.get("is_liked"),
                            is_saved: row.get("is_saved"),
                            is_reported: row.get("is_reported"),
                        }),
                    })
                    .collect();

                Ok(records)
            }
            None => {
                let rows = sqlx::query(
                    r#"
                    SELECT p.id, p.user_id, p.title, p.content, p.image_url, p.link_url,
                           p.created_at, p.updated_at,
                           (SELECT COUNT(*) FROM post_likes WHERE post_id = p.id) AS like_count,
                           (SELECT COUNT(*) FROM comments WHERE post_id = p.id) AS comment_count
                    FROM posts p
                    ORDER BY p.created_at DESC
                    LIMIT $1 OFFSET $2
                    "#,
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?;

                let records = rows
                    .into_iter()
                    .map(|row| PostRecord {
                        post: Post {
                            id: row.get("id"),
                            user_id: row.get("user_id"),
                            title: row.get("title"),
                            content: row.get("content"),
                            image_url: row.get("image_url"),
                            link_url: row.get("link_url"),
                            created_at: row.get("created_at"),
                            updated_at: row.get("updated_at"),
                        },
                        like_count: row.get("like_count"),
                        comment_count: row.get("comment_count"),
                        engagement: None,
                    })
                    .collect();

                Ok(records)
            }
        }
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, user_id, title, content, image_url, link_url, created_at, updated_at
            FROM posts
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn find_saved_by_user(&self, user_id: Uuid) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT p.id, p.user_id, p.title, p.content, p.image_url, p.link_url,
                   p.created_at, p.updated_at
            FROM posts p
            JOIN saved_posts sp ON sp.post_id = p.id
            WHERE sp.user_id = $1
            ORDER BY sp.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn update(&self, post: &Post) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = $1, content = $2, image_url = $3, link_url = $4, updated_at = NOW()
            WHERE id = $5 AND user_id = $6
            "#,
        )
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.image_url)
        .bind(&post.link_url)
        .bind(post.id)
        .bind(post.user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, post_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn replace_tags(&self, post_id: i64, tags: &[String]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM post_tags WHERE post_id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        if !tags.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO post_tags (post_id, tag)
                SELECT $1, unnest($2::text[])
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(post_id)
            .bind(tags)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn tags(&self, post_id: i64) -> Result<Vec<String>> {
        let tags: Vec<String> =
            sqlx::query_scalar("SELECT tag FROM post_tags WHERE post_id = $1")
                .bind(post_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(tags)
    }

    async fn tags_batch(&self, post_ids: &[i64]) -> Result<HashMap<i64, Vec<String>>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query("SELECT post_id, tag FROM post_tags WHERE post_id = ANY($1)")
            .bind(post_ids)
            .fetch_all(&self.pool)
            .await?;

        let mut tags: HashMap<i64, Vec<String>> = HashMap::new();
        for row in rows {
            let post_id: i64 = row.get("post_id");
            let tag: String = row.get("tag");
            tags.entry(post_id).or_default().push(tag);
        }

        Ok(tags)
    }
}
