//! Subcommand implementations.

pub mod aggregate;
pub mod classes;
pub mod login;

use anyhow::{Context, Result};

use sedhub::{Aggregator, Config};

/// Build an aggregator, failing early on unusable configuration.
fn aggregator(config: Config) -> Result<Aggregator> {
    Aggregator::from_config(config).context("Invalid configuration")
}
