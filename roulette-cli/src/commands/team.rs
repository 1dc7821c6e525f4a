//! Team management commands

use clap::{Args, Subcommand};
use roulette_core::{Result, TeamMember};

use super::output::{Response, TeamResponse, TeamView};
use super::App;

/// Team management commands
#[derive(Args, Debug)]
pub struct TeamArgs {
    #[command(subcommand)]
    pub command: TeamCommand,
}

#[derive(Subcommand, Debug)]
pub enum TeamCommand {
    /// Register a team and its members
    Add {
        /// Team name
        name: String,

        /// Team member, repeatable (e.g. u1:alice or u2:bob:inactive)
        #[arg(
            short,
            long = "member",
            value_name = "ID:USERNAME[:inactive]",
            value_parser = parse_member
        )]
        members: Vec<TeamMember>,
    },

    /// Show a team and its members
    Get {
        /// Team name
        name: String,
    },
}

impl TeamArgs {
    /// Execute the team command
    pub async fn execute(&self, app: &App) -> Result<Response> {
        match &self.command {
            TeamCommand::Add { name, members } => {
                let (team, users) = app.teams.add_team(name, members.clone()).await?;
                Ok(Response::Team(TeamResponse {
                    team: TeamView::new(team, &users),
                }))
            }
            TeamCommand::Get { name } => {
                let (team, users) = app.teams.get_team(name).await?;
                Ok(Response::TeamView(TeamView::new(team, &users)))
            }
        }
    }
}

/// Parse `ID:USERNAME[:active|inactive]`
fn parse_member(s: &str) -> std::result::Result<TeamMember, String> {
    let mut parts = s.splitn(3, ':');
    let user_id = parts.next().unwrap_or_default().trim();
    let username = parts.next().unwrap_or_default().trim();

    if user_id.is_empty() || username.is_empty() {
        return Err(format!("expected ID:USERNAME[:inactive], got {:?}", s));
    }

    let is_active = match parts.next().map(str::trim) {
        None | Some("active") => true,
        Some("inactive") => false,
        Some(other) => return Err(format!("unknown member state {:?}", other)),
    };

    Ok(TeamMember {
        user_id: user_id.to_string(),
        username: username.to_string(),
        is_active,
    })
}
