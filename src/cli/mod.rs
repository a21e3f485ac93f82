//! CLI module for the repository cache proxy
//!
//! Provides operational subcommands:
//! - `key`: derive the cache key a call would use
//! - `check`: round-trip a sample entry through the configured store
//! - `inspect`: show presence and remaining TTL of a key

pub mod check;
pub mod inspect;
pub mod key;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Repository cache proxy - cache-aside tooling for wrapped repositories
#[derive(Parser)]
#[command(name = "repo-cache-proxy")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Extra configuration file layered over config/default and config/local
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the cache key for an operation call
    Key(key::KeyArgs),

    /// Verify the configured store accepts writes and serves reads
    Check,

    /// Show what the store holds for a key
    Inspect(inspect::InspectArgs),
}

/// Loads `.env` and configuration, then installs logging
pub fn bootstrap(config_path: Option<&str>) -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = match config_path {
        Some(path) => AppConfig::load_from(Some(path))?,
        None => AppConfig::load().unwrap_or_default(),
    };

    logging::init_logging(&config.logging);

    Ok(config)
}
