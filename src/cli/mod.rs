//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod hotspots;
pub mod info;
pub mod rank;
pub mod serve;

use clap::{Parser, Subcommand};

/// Wild edible plant finder
#[derive(Parser)]
#[command(name = "wilder")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank nearby species for a location
    Rank(rank::RankArgs),

    /// Aggregate occurrence hotspot cells
    Hotspots(hotspots::HotspotsArgs),

    /// Show dataset summary
    Info(info::InfoArgs),

    /// Start web server (foreground)
    Serve(serve::ServeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

/// Run the CLI
pub async fn run() -> crate::error::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Rank(args) => rank::run(args),
        Commands::Hotspots(args) => hotspots::run(args),
        Commands::Info(args) => info::run(args),
        Commands::Serve(args) => serve::run(args).await,
        Commands::Config(args) => config::run(args),
    }
}
