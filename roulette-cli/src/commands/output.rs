//! JSON documents printed by the CLI

use std::collections::BTreeMap;

use roulette_core::{PrSummary, PrView, ReassignOutcome, Team, TeamMember, User};
use serde::Serialize;

/// Team with its members
#[derive(Debug, Serialize)]
pub struct TeamView {
    pub team_name: String,
    pub members: Vec<TeamMember>,
}

impl TeamView {
    pub fn new(team: Team, users: &[User]) -> Self {
        Self {
            team_name: team.name,
            members: users.iter().map(TeamMember::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TeamResponse {
    pub team: TeamView,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct ReviewsResponse {
    pub user_id: String,
    pub pull_requests: Vec<PrSummary>,
}

#[derive(Debug, Serialize)]
pub struct PrResponse {
    pub pr: PrView,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub assignments: BTreeMap<String, u64>,
}

/// Anything a command can print on success
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Response {
    Team(TeamResponse),
    TeamView(TeamView),
    User(UserResponse),
    Reviews(ReviewsResponse),
    Pr(PrResponse),
    Reassign(ReassignOutcome),
    Stats(StatsResponse),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

/// `{"error": {"code", "message"}}`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

impl From<&roulette_core::Error> for ErrorResponse {
    fn from(err: &roulette_core::Error) -> Self {
        Self {
            error: ErrorBody {
                code: err.code(),
                message: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use roulette_core::PullRequest;

    #[test]
    fn test_error_envelope() {
        let err = roulette_core::Error::NoCandidate("pr-1".into());
        let json = serde_json::to_value(ErrorResponse::from(&err)).unwrap();
        assert_eq!(json["error"]["code"], "NO_CANDIDATE");
        assert!(json["error"]["message"].as_str().unwrap().contains("pr-1"));
    }

    #[test]
    fn test_reassign_shape() {
        let pr = PullRequest::open("pr-1", "T", "u1", vec!["u3".into()], Utc::now());
        let response = Response::Reassign(ReassignOutcome {
            pr: pr.view(),
            replaced_by: "u3".into(),
        });

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["replaced_by"], "u3");
        assert_eq!(json["pr"]["assigned_reviewers"][0], "u3");
    }

    #[test]
    fn test_team_shape() {
        let users = vec![User::new("u1", "Alice", "backend").with_active(false)];
        let response = Response::Team(TeamResponse {
            team: TeamView::new(Team::new("backend"), &users),
        });

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["team"]["team_name"], "backend");
        assert_eq!(json["team"]["members"][0]["user_id"], "u1");
        assert_eq!(json["team"]["members"][0]["is_active"], false);
    }
}
