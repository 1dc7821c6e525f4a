//! Pull request lifecycle
//!
//! [`PrLifecycle`] runs create, merge and reassign as one read-decide-write
//! sequence inside a [`PrUnitOfWork`]. The state machine is a single edge:
//!
//! ```text
//! OPEN --merge--> MERGED
//! ```
//!
//! Rosters are read before the unit of work is opened, so a pull request is
//! only locked for the read-decide-write of its own record. A slightly stale
//! roster only affects who gets picked, never the reviewer-set invariants.
//! Roster lookup errors are only reported once the pull request checks pass.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info, warn};

use crate::assignment::{select_initial_reviewers, select_replacement};
use crate::models::{PrSummary, PrView, PullRequest, ReassignOutcome, User};
use crate::store::{PrStore, PrUnitOfWork, UserDirectory};
use crate::{Error, Result};

/// Orchestrates reviewer assignment around pull request state changes
pub struct PrLifecycle<P, U> {
    prs: Arc<P>,
    users: Arc<U>,
    rng: Mutex<StdRng>,
}

impl<P, U> PrLifecycle<P, U>
where
    P: PrStore,
    U: UserDirectory,
{
    /// Create a lifecycle controller with an entropy-seeded random source
    pub fn new(prs: Arc<P>, users: Arc<U>) -> Self {
        Self::with_rng(prs, users, StdRng::from_entropy())
    }

    /// Create a lifecycle controller with a caller-supplied random source
    pub fn with_rng(prs: Arc<P>, users: Arc<U>, rng: StdRng) -> Self {
        Self {
            prs,
            users,
            rng: Mutex::new(rng),
        }
    }

    /// Create a pull request and assign its initial reviewers
    ///
    /// Fails with `PrExists` if the id is taken and `NotFound` if the author
    /// is unknown. Up to two active teammates of the author are assigned.
    pub async fn create_pr(&self, id: &str, title: &str, author_id: &str) -> Result<PrView> {
        let result = self.create_pr_inner(id, title, author_id).await;
        trace_outcome("create_pr", id, &result);
        result
    }

    async fn create_pr_inner(&self, id: &str, title: &str, author_id: &str) -> Result<PrView> {
        let candidates = self.roster_of(author_id).await;

        let mut uow = self.prs.begin(id).await?;
        if uow.get_by_id().await?.is_some() {
            return Err(Error::PrExists(id.to_string()));
        }

        let (author, roster) = candidates?;
        let reviewers = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            select_initial_reviewers(&author, &roster, &mut *rng)
        };

        let pr = PullRequest::open(id, title, author_id, reviewers, Utc::now());
        uow.create(&pr).await?;
        uow.commit().await?;

        info!(
            pr_id = %pr.id,
            author = %pr.author_id,
            reviewers = ?pr.reviewers,
            "Pull request created"
        );
        Ok(pr.view())
    }

    /// Merge a pull request
    ///
    /// Merging an already merged pull request returns it unchanged.
    pub async fn merge_pr(&self, id: &str) -> Result<PrView> {
        let result = self.merge_pr_inner(id).await;
        trace_outcome("merge_pr", id, &result);
        result
    }

    async fn merge_pr_inner(&self, id: &str) -> Result<PrView> {
        let mut uow = self.prs.begin(id).await?;
        let mut pr = uow
            .get_by_id()
            .await?
            .ok_or_else(|| Error::NotFound(format!("pull request {}", id)))?;

        if !pr.merge(Utc::now()) {
            tracing::debug!(pr_id = %id, "Pull request already merged");
            return Ok(pr.view());
        }

        uow.replace(&pr).await?;
        uow.commit().await?;

        info!(pr_id = %id, "Pull request merged");
        Ok(pr.view())
    }

    /// Replace one reviewer with another eligible teammate
    ///
    /// The replacement is drawn from the departing reviewer's current team,
    /// which may differ from the author's. The new reviewer takes the old
    /// one's position in the list.
    pub async fn reassign_reviewer(
        &self,
        pr_id: &str,
        old_user_id: &str,
    ) -> Result<ReassignOutcome> {
        let result = self.reassign_reviewer_inner(pr_id, old_user_id).await;
        trace_outcome("reassign_reviewer", pr_id, &result);
        result
    }

    async fn reassign_reviewer_inner(
        &self,
        pr_id: &str,
        old_user_id: &str,
    ) -> Result<ReassignOutcome> {
        let candidates = self.roster_of(old_user_id).await;

        let mut uow = self.prs.begin(pr_id).await?;
        let mut pr = uow
            .get_by_id()
            .await?
            .ok_or_else(|| Error::NotFound(format!("pull request {}", pr_id)))?;

        if pr.is_merged() {
            return Err(Error::PrMerged(pr_id.to_string()));
        }

        let (_, roster) = candidates?;
        let slot = pr
            .reviewers
            .iter()
            .position(|r| r == old_user_id)
            .ok_or_else(|| Error::NotAssigned {
                pr: pr_id.to_string(),
                user: old_user_id.to_string(),
            })?;

        let replacement = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            select_replacement(&pr.reviewers, &pr.author_id, &roster, &mut *rng)
        }
        .map_err(|_| Error::NoCandidate(pr_id.to_string()))?;

        pr.reviewers[slot] = replacement.clone();
        uow.replace(&pr).await?;
        uow.commit().await?;

        info!(
            pr_id = %pr_id,
            old = %old_user_id,
            new = %replacement,
            "Reviewer reassigned"
        );
        Ok(ReassignOutcome {
            pr: pr.view(),
            replaced_by: replacement,
        })
    }

    /// A user and everyone currently on their team
    async fn roster_of(&self, user_id: &str) -> Result<(User, Vec<User>)> {
        let user = self.users.get_user(user_id).await?;
        let roster = self.users.get_team_members(&user.team_id).await?;
        Ok((user, roster))
    }

    /// Look up a pull request
    pub async fn get_pr(&self, id: &str) -> Result<PrView> {
        let result = self
            .prs
            .get_by_id(id)
            .await
            .and_then(|pr| pr.ok_or_else(|| Error::NotFound(format!("pull request {}", id))))
            .map(|pr| pr.view());
        trace_outcome("get_pr", id, &result);
        result
    }

    /// Pull requests `user_id` is currently reviewing
    ///
    /// Unknown users simply have an empty queue.
    pub async fn review_queue(&self, user_id: &str) -> Result<Vec<PrSummary>> {
        self.prs.list_by_reviewer(user_id).await.inspect_err(|e| {
            error!(op = "review_queue", user_id = %user_id, error = %e, "Storage failure");
        })
    }
}

/// Log the result of a lifecycle operation
///
/// Rejections are expected outcomes and only warrant a warning. Internal
/// failures carry the operation and pull request id for diagnosis.
fn trace_outcome<T>(op: &'static str, pr_id: &str, result: &Result<T>) {
    match result {
        Ok(_) => {}
        Err(e) if e.is_rejection() => {
            warn!(op, pr_id = %pr_id, code = e.code(), "{}", e);
        }
        Err(e) => {
            error!(op, pr_id = %pr_id, error = %e, "Pull request operation failed");
        }
    }
}
