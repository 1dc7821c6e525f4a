//! Domain models: users, teams, pull requests and the views handed to callers

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Maximum number of reviewers a pull request can hold
pub const MAX_REVIEWERS: usize = 2;

/// A user who can author pull requests and review them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "user_id")]
    pub id: String,

    #[serde(rename = "username")]
    pub display_name: String,

    /// Name of the team the user currently belongs to
    #[serde(rename = "team_name")]
    pub team_id: String,

    pub is_active: bool,
}

impl User {
    /// Create an active user on the given team
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        team_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            team_id: team_id.into(),
            is_active: true,
        }
    }

    /// Set the active flag
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }
}

/// A team. The name is its identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Team {
    #[serde(rename = "team_name")]
    pub name: String,
}

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Member entry used when registering a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub user_id: String,
    pub username: String,
    pub is_active: bool,
}

impl TeamMember {
    /// Turn this entry into a user record on `team`
    pub fn into_user(self, team: &Team) -> User {
        User {
            id: self.user_id,
            display_name: self.username,
            team_id: team.name.clone(),
            is_active: self.is_active,
        }
    }
}

impl From<&User> for TeamMember {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            username: user.display_name.clone(),
            is_active: user.is_active,
        }
    }
}

/// Pull request status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrStatus {
    Open,
    Merged,
}

impl PrStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrStatus::Open => "OPEN",
            PrStatus::Merged => "MERGED",
        }
    }

    /// Check if this status is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, PrStatus::Merged)
    }
}

impl fmt::Display for PrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "OPEN" => Ok(PrStatus::Open),
            "MERGED" => Ok(PrStatus::Merged),
            other => Err(Error::Storage(format!("Unknown pull request status: {}", other))),
        }
    }
}

/// A pull request together with its current reviewer list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub id: String,
    pub title: String,
    pub author_id: String,
    pub status: PrStatus,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
    /// Assigned reviewer ids, in assignment order
    pub reviewers: Vec<String>,
}

impl PullRequest {
    /// Create a new open pull request
    pub fn open(
        id: impl Into<String>,
        title: impl Into<String>,
        author_id: impl Into<String>,
        reviewers: Vec<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author_id: author_id.into(),
            status: PrStatus::Open,
            created_at,
            merged_at: None,
            reviewers,
        }
    }

    pub fn is_merged(&self) -> bool {
        self.status.is_terminal()
    }

    /// Transition OPEN -> MERGED
    ///
    /// Returns `false` and leaves the record untouched if already merged.
    pub fn merge(&mut self, at: DateTime<Utc>) -> bool {
        if self.is_merged() {
            return false;
        }
        self.status = PrStatus::Merged;
        self.merged_at = Some(at);
        true
    }

    /// Check whether `user_id` is currently a reviewer
    pub fn has_reviewer(&self, user_id: &str) -> bool {
        self.reviewers.iter().any(|r| r == user_id)
    }

    /// Summary row for reviewer queues
    pub fn summary(&self) -> PrSummary {
        PrSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            author_id: self.author_id.clone(),
            status: self.status,
        }
    }

    /// Full view handed to callers
    pub fn view(&self) -> PrView {
        PrView {
            id: self.id.clone(),
            title: self.title.clone(),
            author_id: self.author_id.clone(),
            status: self.status,
            reviewers: self.reviewers.clone(),
            created_at: self.created_at,
            merged_at: self.merged_at,
        }
    }
}

/// Short pull request description used in reviewer queues
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrSummary {
    #[serde(rename = "pull_request_id")]
    pub id: String,
    #[serde(rename = "pull_request_name")]
    pub title: String,
    pub author_id: String,
    pub status: PrStatus,
}

/// Full pull request view returned by lifecycle operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrView {
    #[serde(rename = "pull_request_id")]
    pub id: String,
    #[serde(rename = "pull_request_name")]
    pub title: String,
    pub author_id: String,
    pub status: PrStatus,
    #[serde(rename = "assigned_reviewers")]
    pub reviewers: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "mergedAt", skip_serializing_if = "Option::is_none", default)]
    pub merged_at: Option<DateTime<Utc>>,
}

/// Result of a successful reviewer reassignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReassignOutcome {
    pub pr: PrView,
    /// The newly assigned reviewer
    pub replaced_by: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pr() -> PullRequest {
        PullRequest::open(
            "pr-1",
            "Add search",
            "u1",
            vec!["u2".into(), "u3".into()],
            Utc::now(),
        )
    }

    #[test]
    fn test_merge_transition_once() {
        let mut pr = sample_pr();
        assert!(!pr.is_merged());
        let first = Utc::now();
        assert!(pr.merge(first));
        assert!(pr.is_merged());
        assert_eq!(pr.status, PrStatus::Merged);
        assert_eq!(pr.merged_at, Some(first));

        let later = first + chrono::Duration::seconds(30);
        assert!(!pr.merge(later));
        assert_eq!(pr.merged_at, Some(first));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("OPEN".parse::<PrStatus>().unwrap(), PrStatus::Open);
        assert_eq!("MERGED".parse::<PrStatus>().unwrap(), PrStatus::Merged);
        assert!("closed".parse::<PrStatus>().is_err());
        assert!(PrStatus::Merged.is_terminal());
    }

    #[test]
    fn test_view_json_shape() {
        let view = sample_pr().view();
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["pull_request_id"], "pr-1");
        assert_eq!(json["pull_request_name"], "Add search");
        assert_eq!(json["status"], "OPEN");
        assert_eq!(json["assigned_reviewers"][1], "u3");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("mergedAt").is_none());
    }

    #[test]
    fn test_user_json_shape() {
        let user = User::new("u1", "Alice", "backend").with_active(false);
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["user_id"], "u1");
        assert_eq!(json["username"], "Alice");
        assert_eq!(json["team_name"], "backend");
        assert_eq!(json["is_active"], false);
    }

    #[test]
    fn test_team_member_into_user() {
        let team = Team::new("payments");
        let member = TeamMember {
            user_id: "u5".into(),
            username: "Eve".into(),
            is_active: true,
        };
        let user = member.into_user(&team);
        assert_eq!(user.team_id, "payments");
        assert_eq!(TeamMember::from(&user).user_id, "u5");
    }
}
