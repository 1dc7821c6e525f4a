//! SQLite implementation of the engine's storage traits

use std::collections::BTreeMap;

use async_trait::async_trait;
use roulette_core::{
    PrStore, PrSummary, PrUnitOfWork, PullRequest, StatsStore, Team, TeamStore, User,
    UserDirectory,
};
use sqlx::{Sqlite, Transaction};

use crate::repos::pull_requests;
use crate::{Database, Error};

type CoreResult<T> = roulette_core::Result<T>;

/// Storage backed by a [`Database`]
///
/// Every pull request unit of work is a `BEGIN IMMEDIATE` transaction. SQLite
/// allows a single writer per database file, so units of work are serialized
/// across all pull requests, not only per id.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Create a store over an open database
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserDirectory for SqliteStore {
    async fn get_user(&self, id: &str) -> CoreResult<User> {
        Ok(self.db.users().get(id).await?)
    }

    async fn get_team_members(&self, team_id: &str) -> CoreResult<Vec<User>> {
        Ok(self.db.users().list_by_team(team_id).await?)
    }

    async fn set_active(&self, id: &str, active: bool) -> CoreResult<User> {
        Ok(self.db.users().set_active(id, active).await?)
    }
}

#[async_trait]
impl TeamStore for SqliteStore {
    async fn create_team(&self, team: &Team, members: &[User]) -> CoreResult<()> {
        match self.db.teams().create(team, members).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_unique_violation() => {
                Err(roulette_core::Error::TeamExists(team.name.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_team(&self, name: &str) -> CoreResult<Team> {
        Ok(self.db.teams().get(name).await?)
    }
}

/// A write transaction scoped to one pull request
///
/// Dropping it without calling `commit` rolls the transaction back.
pub struct SqliteUnitOfWork {
    tx: Transaction<'static, Sqlite>,
    pr_id: String,
}

impl SqliteUnitOfWork {
    fn check_id(&self, pr: &PullRequest) -> CoreResult<()> {
        if pr.id != self.pr_id {
            return Err(roulette_core::Error::Storage(format!(
                "unit of work for {} cannot write {}",
                self.pr_id, pr.id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl PrUnitOfWork for SqliteUnitOfWork {
    async fn get_by_id(&mut self) -> CoreResult<Option<PullRequest>> {
        Ok(pull_requests::fetch(&mut self.tx, &self.pr_id).await?)
    }

    async fn create(&mut self, pr: &PullRequest) -> CoreResult<()> {
        self.check_id(pr)?;
        match pull_requests::insert(&mut self.tx, pr).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_unique_violation() => {
                Err(roulette_core::Error::PrExists(pr.id.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn replace(&mut self, pr: &PullRequest) -> CoreResult<()> {
        self.check_id(pr)?;
        Ok(pull_requests::replace(&mut self.tx, pr).await?)
    }

    async fn commit(self) -> CoreResult<()> {
        self.tx.commit().await.map_err(Error::from)?;
        Ok(())
    }
}

#[async_trait]
impl PrStore for SqliteStore {
    type UnitOfWork = SqliteUnitOfWork;

    async fn begin(&self, pr_id: &str) -> CoreResult<SqliteUnitOfWork> {
        let tx = self.db.pull_requests().begin().await?;
        Ok(SqliteUnitOfWork {
            tx,
            pr_id: pr_id.to_string(),
        })
    }

    async fn get_by_id(&self, id: &str) -> CoreResult<Option<PullRequest>> {
        Ok(self.db.pull_requests().get(id).await?)
    }

    async fn list_by_reviewer(&self, user_id: &str) -> CoreResult<Vec<PrSummary>> {
        Ok(self.db.pull_requests().list_by_reviewer(user_id).await?)
    }
}

#[async_trait]
impl StatsStore for SqliteStore {
    async fn count_assignments_by_user(&self) -> CoreResult<BTreeMap<String, u64>> {
        Ok(self.db.stats().assignments_by_user().await?)
    }
}
