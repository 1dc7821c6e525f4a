//! Roulette CLI - reviewer assignment for pull requests
//!
//! Every command prints a JSON document on stdout. Logs go to stderr.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use roulette_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{App, PrArgs, TeamArgs, UserArgs};

/// Reviewer roulette: random reviewer assignment for pull requests
#[derive(Parser, Debug)]
#[command(name = "roulette")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the SQLite database (overrides config and env)
    #[arg(long, global = true, env = "ROULETTE_DB_PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Show current configuration
    Config,

    #[command(flatten)]
    Data(DataCommand),
}

/// Commands that need the database
#[derive(Subcommand, Debug)]
enum DataCommand {
    /// Manage teams
    Team(TeamArgs),

    /// Inspect and update users
    User(UserArgs),

    /// Create, merge and reassign pull requests
    Pr(PrArgs),

    /// Show reviewer assignments per user
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Load configuration with overrides
    let config = Config::load_with_overrides(cli.db.clone())?;

    // RUST_LOG wins over the configured filter
    let fallback = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.filter.clone()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if cli.verbose {
        tracing::info!(
            db = %config.database.path.display(),
            max_connections = config.database.max_connections,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("roulette {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Config) => print_config(&config),
        Some(Commands::Data(command)) => return run(command, &config).await,
        None => {
            println!("Reviewer roulette - random reviewer assignment for pull requests");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn run(command: DataCommand, config: &Config) -> anyhow::Result<ExitCode> {
    let app = App::open(config).await?;
    let result = match command {
        DataCommand::Team(args) => args.execute(&app).await,
        DataCommand::User(args) => args.execute(&app).await,
        DataCommand::Pr(args) => args.execute(&app).await,
        DataCommand::Stats => app.stats().await,
    };
    app.close().await;

    commands::render(result)
}

fn print_config(config: &Config) {
    println!("Roulette Configuration");
    println!("======================");
    println!();
    println!("Database:");
    println!("  path: {}", config.database.path.display());
    println!("  max_connections: {}", config.database.max_connections);
    println!("  busy_timeout: {:?}", config.database.busy_timeout);
    println!();
    println!("Logging:");
    println!("  filter: {}", config.logging.filter);
    println!();
    if let Some(path) = Config::default_config_path() {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }
}
