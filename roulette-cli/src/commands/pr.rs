//! Pull request commands

use clap::{Args, Subcommand};
use roulette_core::Result;

use super::output::{PrResponse, Response};
use super::App;

/// Pull request commands
#[derive(Args, Debug)]
pub struct PrArgs {
    #[command(subcommand)]
    pub command: PrCommand,
}

#[derive(Subcommand, Debug)]
pub enum PrCommand {
    /// Open a pull request and assign reviewers
    Create {
        /// Pull request id
        id: String,

        /// Pull request title
        title: String,

        /// Author user id
        #[arg(short, long)]
        author: String,
    },

    /// Merge a pull request
    Merge {
        /// Pull request id
        id: String,
    },

    /// Replace one reviewer with another teammate
    Reassign {
        /// Pull request id
        id: String,

        /// Reviewer to replace
        #[arg(short, long)]
        old: String,
    },

    /// Show a pull request
    Get {
        /// Pull request id
        id: String,
    },
}

impl PrArgs {
    /// Execute the pull request command
    pub async fn execute(&self, app: &App) -> Result<Response> {
        let lifecycle = &app.lifecycle;
        match &self.command {
            PrCommand::Create { id, title, author } => Ok(Response::Pr(PrResponse {
                pr: lifecycle.create_pr(id, title, author).await?,
            })),
            PrCommand::Merge { id } => Ok(Response::Pr(PrResponse {
                pr: lifecycle.merge_pr(id).await?,
            })),
            PrCommand::Reassign { id, old } => Ok(Response::Reassign(
                lifecycle.reassign_reviewer(id, old).await?,
            )),
            PrCommand::Get { id } => Ok(Response::Pr(PrResponse {
                pr: lifecycle.get_pr(id).await?,
            })),
        }
    }
}
