//! CLI command implementations

pub mod output;
pub mod pr;
pub mod team;
pub mod user;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use roulette_core::{Config, PrLifecycle, TeamService};
use roulette_db::{Database, SqliteStore};

pub use output::Response;
pub use pr::PrArgs;
pub use team::TeamArgs;
pub use user::UserArgs;

use output::{ErrorResponse, StatsResponse};

/// Services wired to the configured database
pub struct App {
    pub teams: TeamService<SqliteStore>,
    pub lifecycle: PrLifecycle<SqliteStore, SqliteStore>,
    db: Database,
}

impl App {
    /// Open the database and build the services on top of it
    pub async fn open(config: &Config) -> anyhow::Result<Self> {
        let db = Database::connect(&config.database)
            .await
            .with_context(|| {
                format!(
                    "Failed to open database at {}",
                    config.database.path.display()
                )
            })?;

        let store = Arc::new(SqliteStore::new(db.clone()));
        Ok(Self {
            teams: TeamService::new(store.clone()),
            lifecycle: PrLifecycle::new(store.clone(), store),
            db,
        })
    }

    /// Current assignments per user
    pub async fn stats(&self) -> roulette_core::Result<Response> {
        Ok(Response::Stats(StatsResponse {
            assignments: self.teams.assignment_stats().await?,
        }))
    }

    pub async fn close(self) {
        self.db.close().await;
    }
}

/// Print a command result as JSON and pick the exit status
///
/// Business-rule rejections exit with 1 and internal failures with 2. Both
/// print the `{"error": ...}` document on stdout.
pub fn render(result: roulette_core::Result<Response>) -> anyhow::Result<ExitCode> {
    match result {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            println!("{}", serde_json::to_string_pretty(&ErrorResponse::from(&e))?);
            if e.is_rejection() {
                Ok(ExitCode::from(1))
            } else {
                Ok(ExitCode::from(2))
            }
        }
    }
}
