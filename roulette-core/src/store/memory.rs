//! In-process store
//!
//! Keeps everything in maps behind a short-lived mutex. Pull request units of
//! work additionally hold a per-id async lock, so two operations on the same
//! pull request run one after the other while different pull requests never
//! wait on each other.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::{PrStore, PrUnitOfWork, StatsStore, TeamStore, UserDirectory};
use crate::models::{PrSummary, PullRequest, Team, User};
use crate::{Error, Result};

#[derive(Debug, Default)]
struct State {
    teams: BTreeSet<String>,
    users: BTreeMap<String, User>,
    prs: BTreeMap<String, PullRequest>,
}

/// Store backed by process memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    pr_locks: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a user record
    ///
    /// The user's team is registered implicitly.
    pub fn upsert_user(&self, user: User) {
        let mut state = self.state();
        state.teams.insert(user.team_id.clone());
        state.users.insert(user.id.clone(), user);
    }

    /// Move a user to another team
    pub fn move_user(&self, id: &str, team_id: &str) -> Result<User> {
        let mut state = self.state();
        state.teams.insert(team_id.to_string());
        let user = state
            .users
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(format!("user {}", id)))?;
        user.team_id = team_id.to_string();
        Ok(user.clone())
    }

    // Never held across an await
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn pr_lock(&self, pr_id: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.pr_locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(pr_id.to_string()).or_default().clone()
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn get_user(&self, id: &str) -> Result<User> {
        self.state()
            .users
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("user {}", id)))
    }

    async fn get_team_members(&self, team_id: &str) -> Result<Vec<User>> {
        Ok(self
            .state()
            .users
            .values()
            .filter(|u| u.team_id == team_id)
            .cloned()
            .collect())
    }

    async fn set_active(&self, id: &str, active: bool) -> Result<User> {
        let mut state = self.state();
        let user = state
            .users
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(format!("user {}", id)))?;
        user.is_active = active;
        Ok(user.clone())
    }
}

#[async_trait]
impl TeamStore for MemoryStore {
    async fn create_team(&self, team: &Team, members: &[User]) -> Result<()> {
        let mut state = self.state();
        if state.teams.contains(&team.name) {
            return Err(Error::TeamExists(team.name.clone()));
        }
        state.teams.insert(team.name.clone());
        for member in members {
            state.users.insert(member.id.clone(), member.clone());
        }
        Ok(())
    }

    async fn get_team(&self, name: &str) -> Result<Team> {
        if self.state().teams.contains(name) {
            Ok(Team::new(name))
        } else {
            Err(Error::NotFound(format!("team {}", name)))
        }
    }
}

#[derive(Debug)]
enum Staged {
    Create(PullRequest),
    Replace(PullRequest),
}

/// Unit of work over one pull request in a [`MemoryStore`]
///
/// Writes are staged locally and applied to the shared maps on commit. The
/// per-id lock entry is removed once no other caller is waiting on it.
#[derive(Debug)]
pub struct MemoryUnitOfWork {
    pr_id: String,
    state: Arc<Mutex<State>>,
    staged: Option<Staged>,
    pr_locks: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
    lock: Arc<AsyncMutex<()>>,
    _guard: OwnedMutexGuard<()>,
}

impl Drop for MemoryUnitOfWork {
    fn drop(&mut self) {
        let mut locks = self.pr_locks.lock().unwrap_or_else(|e| e.into_inner());
        // Map entry, `self.lock` and the guard; any more are waiters in `begin`
        if Arc::strong_count(&self.lock) == 3 {
            locks.remove(&self.pr_id);
        }
    }
}

impl MemoryUnitOfWork {
    fn current(&self) -> Option<PullRequest> {
        match &self.staged {
            Some(Staged::Create(pr)) | Some(Staged::Replace(pr)) => Some(pr.clone()),
            None => self
                .state
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .prs
                .get(&self.pr_id)
                .cloned(),
        }
    }

    fn check_bound(&self, pr: &PullRequest) -> Result<()> {
        if pr.id != self.pr_id {
            return Err(Error::Storage(format!(
                "Unit of work for {} cannot write pull request {}",
                self.pr_id, pr.id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl PrUnitOfWork for MemoryUnitOfWork {
    async fn get_by_id(&mut self) -> Result<Option<PullRequest>> {
        Ok(self.current())
    }

    async fn create(&mut self, pr: &PullRequest) -> Result<()> {
        self.check_bound(pr)?;
        if self.current().is_some() {
            return Err(Error::PrExists(pr.id.clone()));
        }
        self.staged = Some(Staged::Create(pr.clone()));
        Ok(())
    }

    async fn replace(&mut self, pr: &PullRequest) -> Result<()> {
        self.check_bound(pr)?;
        let staged = match self.staged.take() {
            Some(Staged::Create(_)) => Staged::Create(pr.clone()),
            Some(Staged::Replace(_)) => Staged::Replace(pr.clone()),
            None if self.current().is_some() => Staged::Replace(pr.clone()),
            None => return Err(Error::NotFound(format!("pull request {}", pr.id))),
        };
        self.staged = Some(staged);
        Ok(())
    }

    async fn commit(mut self) -> Result<()> {
        if let Some(Staged::Create(pr) | Staged::Replace(pr)) = self.staged.take() {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.prs.insert(pr.id.clone(), pr);
        }
        Ok(())
    }
}

#[async_trait]
impl PrStore for MemoryStore {
    type UnitOfWork = MemoryUnitOfWork;

    async fn begin(&self, pr_id: &str) -> Result<MemoryUnitOfWork> {
        let lock = self.pr_lock(pr_id);
        let guard = Arc::clone(&lock).lock_owned().await;
        Ok(MemoryUnitOfWork {
            pr_id: pr_id.to_string(),
            state: Arc::clone(&self.state),
            staged: None,
            pr_locks: Arc::clone(&self.pr_locks),
            lock,
            _guard: guard,
        })
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<PullRequest>> {
        Ok(self.state().prs.get(id).cloned())
    }

    async fn list_by_reviewer(&self, user_id: &str) -> Result<Vec<PrSummary>> {
        Ok(self
            .state()
            .prs
            .values()
            .filter(|pr| pr.has_reviewer(user_id))
            .map(PullRequest::summary)
            .collect())
    }
}

#[async_trait]
impl StatsStore for MemoryStore {
    async fn count_assignments_by_user(&self) -> Result<BTreeMap<String, u64>> {
        let mut counts = BTreeMap::new();
        for pr in self.state().prs.values() {
            for reviewer in &pr.reviewers {
                *counts.entry(reviewer.clone()).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }
}
