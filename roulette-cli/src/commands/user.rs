//! User commands

use clap::{ArgAction, Args, Subcommand};
use roulette_core::Result;

use super::output::{Response, ReviewsResponse, UserResponse};
use super::App;

/// User commands
#[derive(Args, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Show a user
    Get {
        /// User id
        id: String,
    },

    /// Mark a user active or inactive for future assignments
    SetActive {
        /// User id
        id: String,

        /// New state
        #[arg(action = ArgAction::Set)]
        active: bool,
    },

    /// List the pull requests a user is reviewing
    Reviews {
        /// User id
        id: String,
    },
}

impl UserArgs {
    /// Execute the user command
    pub async fn execute(&self, app: &App) -> Result<Response> {
        match &self.command {
            UserCommand::Get { id } => Ok(Response::User(UserResponse {
                user: app.teams.get_user(id).await?,
            })),
            UserCommand::SetActive { id, active } => Ok(Response::User(UserResponse {
                user: app.teams.set_is_active(id, *active).await?,
            })),
            UserCommand::Reviews { id } => Ok(Response::Reviews(ReviewsResponse {
                user_id: id.clone(),
                pull_requests: app.lifecycle.review_queue(id).await?,
            })),
        }
    }
}
