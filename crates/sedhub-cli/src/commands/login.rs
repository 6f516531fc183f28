//! Login command implementation.

use anyhow::Result;
use clap::Args;

use sedhub::Config;

use crate::cli::CredentialArgs;
use crate::output;

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[command(flatten)]
    pub credentials: CredentialArgs,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(args: LoginArgs, config: Config) -> Result<()> {
    let aggregator = super::aggregator(config)?;

    output::notice("Logging in...");

    match aggregator.authenticate(&args.credentials.credentials()).await {
        Ok(auth) => output::emit(auth.raw(), args.pretty),
        Err(err) => Err(output::fatal(&err)),
    }
}
