//! Reporting queries

use std::collections::BTreeMap;

use sqlx::SqlitePool;

use crate::Result;

/// Read-only aggregate queries over assignments
#[derive(Clone, Debug)]
pub struct StatsRepository {
    pool: SqlitePool,
}

impl StatsRepository {
    /// Create a new repository instance
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Reviewer slots held per user across all pull requests
    ///
    /// Users with no assignments are absent from the map.
    pub async fn assignments_by_user(&self) -> Result<BTreeMap<String, u64>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT user_id, COUNT(*) FROM pr_reviewers GROUP BY user_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(user_id, count)| (user_id, count.max(0) as u64))
            .collect())
    }
}
