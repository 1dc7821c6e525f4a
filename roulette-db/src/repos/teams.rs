//! Repository for teams

use roulette_core::{Team, User};
use sqlx::SqlitePool;

use super::users;
use crate::{Error, Result};

/// Repository for managing teams and their membership
#[derive(Clone, Debug)]
pub struct TeamRepository {
    pool: SqlitePool,
}

impl TeamRepository {
    /// Create a new repository instance
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a team and upsert its members in one transaction
    ///
    /// A duplicate team name surfaces as a unique violation and nothing is
    /// written.
    pub async fn create(&self, team: &Team, members: &[User]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO teams (name) VALUES (?)")
            .bind(&team.name)
            .execute(&mut *tx)
            .await?;

        for member in members {
            users::upsert(&mut tx, member).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Find a team by name
    pub async fn get(&self, name: &str) -> Result<Team> {
        let row: Option<(String,)> = sqlx::query_as("SELECT name FROM teams WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|(name,)| Team { name })
            .ok_or_else(|| Error::NotFound(format!("team {}", name)))
    }
}
