//! sorteio - raffle drawing CLI
//!
//! Operates directly on the `SQLite` store: load fixtures, run a draw,
//! inspect prize state, and reset a raffle.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sorteio_core::SorteioConfig;
use tracing_subscriber::EnvFilter;

mod commands;

/// sorteio - raffle drawing engine CLI
#[derive(Parser, Debug)]
#[command(name = "sorteio")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "sorteio.toml")]
    config: PathBuf,

    /// Override the database path
    #[arg(long)]
    db: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a raffle's drawing ceremony, printing each winner as drawn
    Draw {
        /// Raffle id
        raffle_id: String,

        /// Fixed selector seed for a reproducible draw
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Clear all of a raffle's winners
    Reset {
        /// Raffle id
        raffle_id: String,
    },

    /// Show a raffle's prizes and committed winners
    Status {
        /// Raffle id
        raffle_id: String,
    },

    /// Load raffles, leads, and prizes from a JSON fixture file
    Load {
        /// Path to the fixture file
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.clone())),
        )
        .init();

    let mut config = if cli.config.exists() {
        SorteioConfig::from_file(&cli.config)
            .with_context(|| format!("failed to load config from {}", cli.config.display()))?
    } else {
        SorteioConfig::default()
    };
    if let Some(db) = cli.db {
        config.database.path = db;
    }

    match cli.command {
        Commands::Draw { raffle_id, seed } => commands::draw(&config, &raffle_id, seed),
        Commands::Reset { raffle_id } => commands::reset(&config, &raffle_id),
        Commands::Status { raffle_id } => commands::status(&config, &raffle_id),
        Commands::Load { file } => commands::load(&config, &file),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::Cli;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }
}
