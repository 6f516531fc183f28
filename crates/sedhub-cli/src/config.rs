//! Configuration loading.
//!
//! Values come from an optional JSON file, then flags or their environment
//! variables override individual fields.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use sedhub::{Config, ServiceUrl, SubscriptionKey};

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// JSON configuration file
    #[arg(long, env = "SEDHUB_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Subscription key for the identity endpoint
    #[arg(long, env = "SEDHUB_IDENTITY_KEY", hide_env_values = true, global = true)]
    pub identity_key: Option<String>,

    /// Subscription key for the class and term-period endpoints
    #[arg(long, env = "SEDHUB_RECORDS_KEY", hide_env_values = true, global = true)]
    pub records_key: Option<String>,

    /// Identity endpoint URL
    #[arg(long, env = "SEDHUB_IDENTITY_URL", global = true)]
    pub identity_url: Option<String>,

    /// Class-listing endpoint URL
    #[arg(long, env = "SEDHUB_CLASSES_URL", global = true)]
    pub classes_url: Option<String>,

    /// Term-periods endpoint URL
    #[arg(long, env = "SEDHUB_TERM_PERIODS_URL", global = true)]
    pub term_periods_url: Option<String>,

    /// Secondary token endpoint URL
    #[arg(long, env = "SEDHUB_SECONDARY_TOKEN_URL", global = true)]
    pub secondary_token_url: Option<String>,

    /// Per-request timeout in seconds (transport default if unset)
    #[arg(long, env = "SEDHUB_TIMEOUT_SECS", global = true)]
    pub timeout_secs: Option<u64>,

    /// Fetch the secondary token concurrently with the class list
    #[arg(long, global = true)]
    pub concurrent: bool,
}

impl ConfigArgs {
    /// Build the effective configuration.
    pub fn load(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path).context("Failed to load config file")?,
            None => Config::default(),
        };

        if let Some(key) = &self.identity_key {
            config.identity_subscription_key = SubscriptionKey::new(key);
        }
        if let Some(key) = &self.records_key {
            config.records_subscription_key = SubscriptionKey::new(key);
        }

        override_url(&mut config.identity_url, &self.identity_url)?;
        override_url(&mut config.classes_url, &self.classes_url)?;
        override_url(&mut config.term_periods_url, &self.term_periods_url)?;
        override_url(&mut config.secondary_token_url, &self.secondary_token_url)?;

        if self.timeout_secs.is_some() {
            config.timeout_secs = self.timeout_secs;
        }
        if self.concurrent {
            config.concurrent_secondary_token = true;
        }

        Ok(config)
    }
}

fn override_url(target: &mut ServiceUrl, value: &Option<String>) -> Result<()> {
    if let Some(value) = value {
        *target = ServiceUrl::new(value).with_context(|| format!("Invalid URL: {}", value))?;
    }
    Ok(())
}
