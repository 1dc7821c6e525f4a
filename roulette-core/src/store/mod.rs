//! Storage interfaces consumed by the engine
//!
//! The engine never talks to a database directly. It sees users and teams
//! through [`UserDirectory`] and [`TeamStore`], and pull requests through
//! [`PrStore`], whose writes always happen inside a [`PrUnitOfWork`].

pub mod memory;

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::models::{PrSummary, PullRequest, Team, User};
use crate::Result;

pub use memory::MemoryStore;

/// Read/write access to user records
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Look up a user, failing with `NotFound` if absent
    async fn get_user(&self, id: &str) -> Result<User>;

    /// All users currently on `team_id`, active or not
    async fn get_team_members(&self, team_id: &str) -> Result<Vec<User>>;

    /// Set the active flag, failing with `NotFound` if the user is absent
    async fn set_active(&self, id: &str, active: bool) -> Result<User>;
}

/// Team registration
#[async_trait]
pub trait TeamStore: Send + Sync {
    /// Create `team` and upsert `members` onto it in one atomic step
    ///
    /// Fails with `TeamExists` if the team is already registered. Existing
    /// users listed in `members` are moved to the new team.
    async fn create_team(&self, team: &Team, members: &[User]) -> Result<()>;

    /// Look up a team, failing with `NotFound` if absent
    async fn get_team(&self, name: &str) -> Result<Team>;
}

/// A scoped transaction over one pull request
///
/// Obtained from [`PrStore::begin`]. Nothing written through it is visible to
/// other callers until [`commit`](PrUnitOfWork::commit) succeeds. Dropping it
/// uncommitted (early return, error, cancelled future) rolls everything back.
/// While it is alive, no other unit of work for the same pull request id can
/// make progress.
#[async_trait]
pub trait PrUnitOfWork: Send {
    /// The pull request and its reviewers, if it exists
    async fn get_by_id(&mut self) -> Result<Option<PullRequest>>;

    /// Insert a new pull request with its reviewers
    ///
    /// Fails with `PrExists` if the id is already present.
    async fn create(&mut self, pr: &PullRequest) -> Result<()>;

    /// Overwrite status, merge time and the full reviewer list
    async fn replace(&mut self, pr: &PullRequest) -> Result<()>;

    /// Make all writes durable and release the pull request
    async fn commit(self) -> Result<()>;
}

/// Pull request persistence
#[async_trait]
pub trait PrStore: Send + Sync {
    type UnitOfWork: PrUnitOfWork;

    /// Open a unit of work for `pr_id`, waiting for any other one to finish
    async fn begin(&self, pr_id: &str) -> Result<Self::UnitOfWork>;

    /// Non-transactional read of a pull request
    async fn get_by_id(&self, id: &str) -> Result<Option<PullRequest>>;

    /// Pull requests where `user_id` is currently a reviewer
    async fn list_by_reviewer(&self, user_id: &str) -> Result<Vec<PrSummary>>;
}

/// Aggregate reporting queries
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Number of reviewer slots each user currently occupies across all PRs
    async fn count_assignments_by_user(&self) -> Result<BTreeMap<String, u64>>;
}
