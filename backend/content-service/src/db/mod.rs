/// Database access layer
///
/// Connection pooling plus the three stores: posts (with tags), comments,
/// and the engagement ledger. Each store is a trait with a Postgres
/// implementation so the service layer can be exercised against in-memory
/// doubles.
pub mod comment_repo;
pub mod engagement_repo;
pub mod post_repo;
pub mod schema;

pub use comment_repo::{CommentRepository, CommentStore};
pub use engagement_repo::{EngagementRepository, EngagementStore, Relation};
pub use post_repo::{PostRepository, PostStore};

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;

/// Create the shared Postgres pool
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect(&config.url)
        .await
}
