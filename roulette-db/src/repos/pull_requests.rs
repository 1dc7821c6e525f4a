//! Repository for pull requests and their reviewer assignments
//!
//! Reviewers live in `pr_reviewers` with an explicit `position`, so the
//! order a pull request was given its reviewers in survives a round trip and
//! a reassignment keeps the replaced reviewer's slot.

use chrono::{DateTime, Utc};
use roulette_core::{PrStatus, PrSummary, PullRequest};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};

use crate::{Error, Result};

#[derive(Debug, sqlx::FromRow)]
struct PullRequestRow {
    id: String,
    title: String,
    author_id: String,
    status: String,
    created_at: DateTime<Utc>,
    merged_at: Option<DateTime<Utc>>,
}

impl PullRequestRow {
    fn into_pull_request(self, reviewers: Vec<String>) -> Result<PullRequest> {
        Ok(PullRequest {
            status: parse_status(&self.status)?,
            id: self.id,
            title: self.title,
            author_id: self.author_id,
            created_at: self.created_at,
            merged_at: self.merged_at,
            reviewers,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    id: String,
    title: String,
    author_id: String,
    status: String,
}

fn parse_status(status: &str) -> Result<PrStatus> {
    status
        .parse()
        .map_err(|_| Error::InvalidData(format!("unknown pull request status {:?}", status)))
}

/// Repository for managing pull requests
#[derive(Clone, Debug)]
pub struct PullRequestRepository {
    pool: SqlitePool,
}

impl PullRequestRepository {
    /// Create a new repository instance
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Start a write transaction
    ///
    /// `BEGIN IMMEDIATE` takes the database write lock up front, so two
    /// transactions can never both read a pull request and then race to
    /// write it.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin_with("BEGIN IMMEDIATE").await?)
    }

    /// Find a pull request and its reviewers
    pub async fn get(&self, id: &str) -> Result<Option<PullRequest>> {
        // One read transaction so the row and its reviewers agree
        let mut tx = self.pool.begin().await?;
        let pr = fetch(&mut tx, id).await?;
        tx.commit().await?;
        Ok(pr)
    }

    /// Pull requests where `user_id` currently holds a reviewer slot
    pub async fn list_by_reviewer(&self, user_id: &str) -> Result<Vec<PrSummary>> {
        let rows: Vec<SummaryRow> = sqlx::query_as(
            "SELECT p.id, p.title, p.author_id, p.status
             FROM pull_requests p
             JOIN pr_reviewers r ON r.pr_id = p.id
             WHERE r.user_id = ?
             ORDER BY p.created_at ASC, p.id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(PrSummary {
                    status: parse_status(&row.status)?,
                    id: row.id,
                    title: row.title,
                    author_id: row.author_id,
                })
            })
            .collect()
    }
}

/// Load a pull request with its reviewers in assignment order
pub(crate) async fn fetch(conn: &mut SqliteConnection, id: &str) -> Result<Option<PullRequest>> {
    let row: Option<PullRequestRow> = sqlx::query_as(
        "SELECT id, title, author_id, status, created_at, merged_at
         FROM pull_requests
         WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let reviewers: Vec<String> = sqlx::query_scalar(
        "SELECT user_id FROM pr_reviewers WHERE pr_id = ? ORDER BY position ASC",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    row.into_pull_request(reviewers).map(Some)
}

/// Insert a new pull request and its reviewers
pub(crate) async fn insert(conn: &mut SqliteConnection, pr: &PullRequest) -> Result<()> {
    sqlx::query(
        "INSERT INTO pull_requests (id, title, author_id, status, created_at, merged_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&pr.id)
    .bind(&pr.title)
    .bind(&pr.author_id)
    .bind(pr.status.as_str())
    .bind(pr.created_at)
    .bind(pr.merged_at)
    .execute(&mut *conn)
    .await?;

    write_reviewers(conn, &pr.id, &pr.reviewers).await
}

/// Overwrite status, merge time and the reviewer list of an existing pull request
pub(crate) async fn replace(conn: &mut SqliteConnection, pr: &PullRequest) -> Result<()> {
    let updated = sqlx::query("UPDATE pull_requests SET status = ?, merged_at = ? WHERE id = ?")
        .bind(pr.status.as_str())
        .bind(pr.merged_at)
        .bind(&pr.id)
        .execute(&mut *conn)
        .await?;

    if updated.rows_affected() == 0 {
        return Err(Error::NotFound(format!("pull request {}", pr.id)));
    }

    sqlx::query("DELETE FROM pr_reviewers WHERE pr_id = ?")
        .bind(&pr.id)
        .execute(&mut *conn)
        .await?;

    write_reviewers(conn, &pr.id, &pr.reviewers).await
}

async fn write_reviewers(
    conn: &mut SqliteConnection,
    pr_id: &str,
    reviewers: &[String],
) -> Result<()> {
    for (position, user_id) in reviewers.iter().enumerate() {
        sqlx::query("INSERT INTO pr_reviewers (pr_id, user_id, position) VALUES (?, ?, ?)")
            .bind(pr_id)
            .bind(user_id)
            .bind(position as i64)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}
