//! Aggregate command implementation.

use anyhow::Result;
use clap::Args;

use sedhub::Config;

use crate::cli::CredentialArgs;
use crate::output;

#[derive(Args, Debug)]
pub struct AggregateArgs {
    #[command(flatten)]
    pub credentials: CredentialArgs,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(args: AggregateArgs, config: Config) -> Result<()> {
    let aggregator = super::aggregator(config)?;

    output::notice("Aggregating records...");

    match aggregator.aggregate(&args.credentials.credentials()).await {
        Ok(composite) => output::emit(&composite, args.pretty),
        Err(err) => Err(output::fatal(&err)),
    }
}
