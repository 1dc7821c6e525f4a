//! Repository for user records

use roulette_core::User;
use sqlx::{SqliteConnection, SqlitePool};

use crate::{Error, Result};

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: String,
    display_name: String,
    team_id: String,
    is_active: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            display_name: row.display_name,
            team_id: row.team_id,
            is_active: row.is_active,
        }
    }
}

/// Repository for managing user records
#[derive(Clone, Debug)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new repository instance
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a user by id
    pub async fn get(&self, id: &str) -> Result<User> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, display_name, team_id, is_active FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::from)
            .ok_or_else(|| Error::NotFound(format!("user {}", id)))
    }

    /// All users on a team, ordered by id
    pub async fn list_by_team(&self, team_id: &str) -> Result<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as(
            "SELECT id, display_name, team_id, is_active
             FROM users
             WHERE team_id = ?
             ORDER BY id ASC",
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Set the active flag and return the updated user
    pub async fn set_active(&self, id: &str, active: bool) -> Result<User> {
        let row: Option<UserRow> = sqlx::query_as(
            "UPDATE users SET is_active = ?
             WHERE id = ?
             RETURNING id, display_name, team_id, is_active",
        )
        .bind(active)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::from)
            .ok_or_else(|| Error::NotFound(format!("user {}", id)))
    }
}

/// Insert a user or overwrite name, team and active flag of an existing one
pub(crate) async fn upsert(conn: &mut SqliteConnection, user: &User) -> Result<()> {
    sqlx::query(
        "INSERT INTO users (id, display_name, team_id, is_active)
         VALUES (?, ?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET
             display_name = excluded.display_name,
             team_id = excluded.team_id,
             is_active = excluded.is_active",
    )
    .bind(&user.id)
    .bind(&user.display_name)
    .bind(&user.team_id)
    .bind(user.is_active)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
