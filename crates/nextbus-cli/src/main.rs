//! CLI application for next-departure lookups over PDF bus timetables.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{cache, config, routes, schedule};

/// nextbus - Find the next scheduled bus from published PDF timetables
#[derive(Parser)]
#[command(name = "nextbus")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List known routes
    Routes,

    /// Show the full schedule for a route
    Schedule(schedule::ScheduleArgs),

    /// Find the next departures for a route
    Next(schedule::NextArgs),

    /// Register a custom route
    Register(routes::RegisterArgs),

    /// Manage the timetable cache
    Cache(cache::CacheArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Routes => routes::list(config_path),
        Commands::Schedule(args) => schedule::run_schedule(args, config_path).await,
        Commands::Next(args) => schedule::run_next(args, config_path).await,
        Commands::Register(args) => routes::register(args, config_path),
        Commands::Cache(args) => cache::run(args, config_path),
        Commands::Config(args) => config::run(args, config_path),
    }
}
