//! Roulette Core - reviewer assignment and pull request lifecycle engine
//!
//! Pull requests are authored by users organized into teams. When a pull
//! request is opened, up to two active teammates of the author are drawn at
//! random as reviewers; a reviewer can later be swapped for another eligible
//! teammate until the pull request is merged.
//!
//! Persistence sits behind the traits in [`store`]. [`store::MemoryStore`]
//! implements them in process; the `roulette-db` crate provides SQLite.

pub mod assignment;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod store;
pub mod teams;

pub use assignment::{select_initial_reviewers, select_replacement, NoCandidate};
pub use config::{Config, DatabaseConfig, LoggingConfig};
pub use error::{Error, ErrorKind, Result};
pub use lifecycle::PrLifecycle;
pub use models::{
    PrStatus, PrSummary, PrView, PullRequest, ReassignOutcome, Team, TeamMember, User,
    MAX_REVIEWERS,
};
pub use store::{MemoryStore, PrStore, PrUnitOfWork, StatsStore, TeamStore, UserDirectory};
pub use teams::TeamService;
