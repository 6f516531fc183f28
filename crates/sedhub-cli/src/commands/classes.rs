//! Classes command implementation.
//!
//! Runs only the two required steps: the identity login and the class list.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use serde_json::Value;

use sedhub::{ClassList, Config};

use crate::cli::CredentialArgs;
use crate::output;

#[derive(Args, Debug)]
pub struct ClassesArgs {
    #[command(flatten)]
    pub credentials: CredentialArgs,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClassesOutput<'a> {
    auth_result: &'a Value,
    class_list: &'a ClassList,
}

pub async fn run(args: ClassesArgs, config: Config) -> Result<()> {
    let aggregator = super::aggregator(config)?;

    output::notice("Fetching classes...");

    let result = async {
        let auth = aggregator
            .authenticate(&args.credentials.credentials())
            .await?;
        let class_list = aggregator.fetch_classes(&auth).await?;
        Ok::<_, sedhub::Error>((auth, class_list))
    }
    .await;

    match result {
        Ok((auth, class_list)) => output::emit(
            &ClassesOutput {
                auth_result: auth.raw(),
                class_list: &class_list,
            },
            args.pretty,
        ),
        Err(err) => Err(output::fatal(&err)),
    }
}
