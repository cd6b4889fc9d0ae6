use tracing::info;

use crate::error::Result;
use sqlx::PgPool;

/// Ensure the content tables exist.
///
/// Lazily created at service startup to unblock environments where
/// migrations have not been applied yet (fresh developer machines, CI).
///
/// `comments.parent_id` deliberately carries no foreign key: deleting a
/// comment leaves its replies in place with a dangling parent reference,
/// and thread views drop them page-locally. The engagement tables cascade
/// with their subject so a deleted post or comment takes its ledger rows
/// with it.
pub async fn ensure_content_tables(pool: &PgPool) -> Result<()> {
    info!("Ensuring content tables exist");

    sqlx::query(POSTS_TABLE).execute(pool).await?;
    sqlx::query(POST_TAGS_TABLE).execute(pool).await?;
    sqlx::query(COMMENTS_TABLE).execute(pool).await?;
    for ddl in ENGAGEMENT_TABLES {
        sqlx::query(ddl).execute(pool).await?;
    }

    Ok(())
}

const POSTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS posts (
    id BIGSERIAL PRIMARY KEY,
    user_id UUID NOT NULL,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    image_url TEXT,
    link_url TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const POST_TAGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS post_tags (
    post_id BIGINT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
    tag TEXT NOT NULL,
    PRIMARY KEY (post_id, tag)
)
"#;

const COMMENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS comments (
    id BIGSERIAL PRIMARY KEY,
    post_id BIGINT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
    user_id UUID NOT NULL,
    content TEXT NOT NULL,
    parent_id BIGINT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const ENGAGEMENT_TABLES: [&str; 5] = [
    r#"
CREATE TABLE IF NOT EXISTS post_likes (
    post_id BIGINT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
    user_id UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (post_id, user_id)
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS saved_posts (
    post_id BIGINT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
    user_id UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (post_id, user_id)
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS post_reports (
    post_id BIGINT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
    user_id UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (post_id, user_id)
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS comment_likes (
    comment_id BIGINT NOT NULL REFERENCES comments(id) ON DELETE CASCADE,
    user_id UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (comment_id, user_id)
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS comment_reports (
    comment_id BIGINT NOT NULL REFERENCES comments(id) ON DELETE CASCADE,
    user_id UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (comment_id, user_id)
)
"#,
];
