/// Generic engagement ledger over (subject, relation) pairs
///
/// Likes, saves, and reports are all plain membership sets keyed by
/// (subject id, user id); each relation lives in its own table. Insert maps
/// to `ON CONFLICT DO NOTHING` and remove to a plain `DELETE`; both are
/// idempotent. Counts are always derived from the rows.
use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::Result;

/// One engagement relation, mapped to its membership table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    PostLike,
    PostSave,
    PostReport,
    CommentLike,
    CommentReport,
}

impl Relation {
    pub fn table(&self) -> &'static str {
        match self {
            Relation::PostLike => "post_likes",
            Relation::PostSave => "saved_posts",
            Relation::PostReport => "post_reports",
            Relation::CommentLike => "comment_likes",
            Relation::CommentReport => "comment_reports",
        }
    }

    pub fn subject_column(&self) -> &'static str {
        match self {
            Relation::PostLike | Relation::PostSave | Relation::PostReport => "post_id",
            Relation::CommentLike | Relation::CommentReport => "comment_id",
        }
    }
}

/// Membership store for one engagement relation at a time.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EngagementStore: Send + Sync {
    /// Record membership; adding an existing row is a no-op.
    async fn add(&self, relation: Relation, subject_id: i64, user_id: Uuid) -> Result<()>;

    /// Remove membership; removing an absent row is a no-op.
    async fn remove(&self, relation: Relation, subject_id: i64, user_id: Uuid) -> Result<()>;

    /// Whether (subject, user) is a member of the relation.
    async fn contains(&self, relation: Relation, subject_id: i64, user_id: Uuid) -> Result<bool>;

    /// Membership cardinality for one subject.
    async fn count(&self, relation: Relation, subject_id: i64) -> Result<i64>;

    /// Subjects among `subject_ids` the user is a member of.
    async fn contains_batch(
        &self,
        relation: Relation,
        user_id: Uuid,
        subject_ids: &[i64],
    ) -> Result<HashSet<i64>>;

    /// Membership cardinality per subject; subjects with no rows are absent
    /// from the map.
    async fn count_batch(
        &self,
        relation: Relation,
        subject_ids: &[i64],
    ) -> Result<HashMap<i64, i64>>;
}

/// Postgres-backed engagement ledger
#[derive(Clone)]
pub struct EngagementRepository {
    pool: PgPool,
}

impl EngagementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EngagementStore for EngagementRepository {
    async fn add(&self, relation: Relation, subject_id: i64, user_id: Uuid) -> Result<()> {
        let sql = format!(
            "INSERT INTO {} ({}, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            relation.table(),
            relation.subject_column(),
        );

        sqlx::query(&sql)
            .bind(subject_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn remove(&self, relation: Relation, subject_id: i64, user_id: Uuid) -> Result<()> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = $1 AND user_id = $2",
            relation.table(),
            relation.subject_column(),
        );

        sqlx::query(&sql)
            .bind(subject_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn contains(&self, relation: Relation, subject_id: i64, user_id: Uuid) -> Result<bool> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = $1 AND user_id = $2)",
            relation.table(),
            relation.subject_column(),
        );

        let exists: bool = sqlx::query_scalar(&sql)
            .bind(subject_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn count(&self, relation: Relation, subject_id: i64) -> Result<i64> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} = $1",
            relation.table(),
            relation.subject_column(),
        );

        let count: i64 = sqlx::query_scalar(&sql)
            .bind(subject_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn contains_batch(
        &self,
        relation: Relation,
        user_id: Uuid,
        subject_ids: &[i64],
    ) -> Result<HashSet<i64>> {
        if subject_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let sql = format!(
            "SELECT {col} FROM {table} WHERE user_id = $1 AND {col} = ANY($2)",
            col = relation.subject_column(),
            table = relation.table(),
        );

        let ids: Vec<i64> = sqlx::query_scalar(&sql)
            .bind(user_id)
            .bind(subject_ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(ids.into_iter().collect())
    }

    async fn count_batch(
        &self,
        relation: Relation,
        subject_ids: &[i64],
    ) -> Result<HashMap<i64, i64>> {
        if subject_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let sql = format!(
            "SELECT {col} AS subject_id, COUNT(*) AS count FROM {table} \
             WHERE {col} = ANY($1) GROUP BY {col}",
            col = relation.subject_column(),
            table = relation.table(),
        );

        let rows = sqlx::query(&sql)
            .bind(subject_ids)
            .fetch_all(&self.pool)
            .await?;

        let counts = rows
            .into_iter()
            .map(|row| {
                let subject_id: i64 = row.get("subject_id");
                let count: i64 = row.get("count");
                (subject_id, count)
            })
            .collect();

        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relations_map_to_distinct_tables() {
        let relations = [
            Relation::PostLike,
            Relation::PostSave,
            Relation::PostReport,
            Relation::CommentLike,
            Relation::CommentReport,
        ];

        let tables: HashSet<&str> = relations.iter().map(|r| r.table()).collect();
        assert_eq!(tables.len(), relations.len());
    }

    #[test]
    fn subject_column_follows_subject_kind() {
        assert_eq!(Relation::PostSave.subject_column(), "post_id");
        assert_eq!(Relation::CommentReport.subject_column(), "comment_id");
    }
}
