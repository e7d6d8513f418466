//! tvlink CLI - Host for the playback session controller
//!
//! Features:
//! - Inspect the media source a play request would load
//! - Resolve DRM key material into its engine configuration
//! - Probe a stream URL with the player's HTTP transport settings
//! - Run a scripted session against a simulated engine

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tvlink_core::PlayerConfig;

mod commands;
mod engine;
mod output;

/// tvlink CLI - Playback session toolkit
#[derive(Parser)]
#[command(name = "tvlink-cli")]
#[command(version)]
#[command(about = "Playback session controller host and stream toolkit", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Player configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the media source a play request would load
    Inspect {
        /// Stream URL
        url: String,

        #[command(flatten)]
        request: commands::RequestArgs,

        /// DRM key material (license URL or keyId:key)
        #[arg(long)]
        drm: Option<String>,

        /// Preferred quality (Auto, 720p, ...)
        #[arg(short, long)]
        quality: Option<String>,
    },

    /// Resolve DRM key material
    Drm {
        /// License URL, keyId:key or bare key
        key: String,
    },

    /// Fetch the start of a stream with the player's transport settings
    Probe {
        /// Stream URL
        url: String,

        #[command(flatten)]
        request: commands::RequestArgs,
    },

    /// Run a session reading JSON method calls from stdin
    Session {
        /// Start playing this URL, as if passed at view creation
        #[arg(long)]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let config = match &cli.config {
        Some(path) => PlayerConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => PlayerConfig::default(),
    };

    match cli.command {
        Commands::Inspect { url, request, drm, quality } => {
            commands::inspect(&config, &url, &request, drm, quality, &cli.format)?;
        }
        Commands::Drm { key } => {
            commands::drm(&key, &cli.format)?;
        }
        Commands::Probe { url, request } => {
            commands::probe(&config, &url, &request, &cli.format).await?;
        }
        Commands::Session { url } => {
            commands::session(config, url).await?;
        }
    }

    Ok(())
}
