//! CLI argument definitions.

use clap::{Args, Parser, Subcommand};

use sedhub::Credentials;

use crate::commands::{aggregate::AggregateArgs, classes::ClassesArgs, login::LoginArgs};
use crate::config::ConfigArgs;

/// Aggregate a student's school records into one JSON document.
#[derive(Parser, Debug)]
#[command(name = "sedhub")]
#[command(author, version = env!("SEDHUB_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full pipeline and print the composite result
    Aggregate(AggregateArgs),

    /// Log in only and print the identity payload
    Login(LoginArgs),

    /// Log in and list classes, without the best-effort steps
    Classes(ClassesArgs),
}

/// Login credentials shared by every command.
#[derive(Args, Debug)]
pub struct CredentialArgs {
    /// Student login
    #[arg(long, env = "SEDHUB_USER")]
    pub user: String,

    /// Account password
    #[arg(long, env = "SEDHUB_PASSWORD", hide_env_values = true)]
    pub password: String,
}

impl CredentialArgs {
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.user, &self.password)
    }
}
