//! Output formatting helpers.
//!
//! Results go to stdout as JSON; everything meant for a human goes to stderr.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use sedhub::{Error, ErrorBody};

/// Print a progress notice.
pub fn notice(msg: &str) {
    eprintln!("{}", msg.dimmed());
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a value as compact JSON.
pub fn json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    println!("{}", json);
    Ok(())
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print a value as JSON, pretty or compact.
pub fn emit<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    if pretty { json_pretty(value) } else { json(value) }
}

/// Print a fatal pipeline error as an error body and turn it into a failure.
pub fn fatal(err: &Error) -> anyhow::Error {
    error(&err.client_message());
    if let Err(e) = json(&ErrorBody::from(err)) {
        return e;
    }
    anyhow::anyhow!("request failed with status {}", err.status_code())
}
