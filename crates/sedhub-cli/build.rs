//! Stamps `SEDHUB_VERSION` for `sedhub --version`.
//!
//! Resolution order: `SEDHUB_BUILD_VERSION` from the build environment, then
//! `git describe --tags --always --dirty`, then the package version.

use std::env;
use std::process::Command;

const OVERRIDE_VAR: &str = "SEDHUB_BUILD_VERSION";

fn main() {
    println!("cargo:rerun-if-env-changed={OVERRIDE_VAR}");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");

    let version = env::var(OVERRIDE_VAR)
        .ok()
        .and_then(|v| normalize(&v))
        .or_else(describe)
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=SEDHUB_VERSION={version}");
}

fn describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()
        .filter(|o| o.status.success())?;

    normalize(std::str::from_utf8(&output.stdout).ok()?)
}

/// Trim and drop a leading `v` tag prefix; blank input yields `None`.
fn normalize(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let raw = raw.strip_prefix('v').unwrap_or(raw);
    (!raw.is_empty()).then(|| raw.to_string())
}
