//! sedhub - CLI front end for the school-records aggregation pipeline.
//!
//! A thin wrapper over the `sedhub` library: it loads configuration, logs in
//! with the given credentials and prints the aggregated result as JSON on
//! stdout. Logs go to stderr.

mod cli;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    let config = cli.config.load()?;
    tracing::debug!(?config, "Loaded configuration");

    match cli.command {
        Commands::Aggregate(args) => commands::aggregate::run(args, config).await,
        Commands::Login(args) => commands::login::run(args, config).await,
        Commands::Classes(args) => commands::classes::run(args, config).await,
    }
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
