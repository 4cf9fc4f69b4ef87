//! # credreg-cli: Credential Registry Command-Line Host
//!
//! Runs the registry against a ledger file on disk. Every invocation
//! replays and verifies the ledger, applies at most one write, and saves
//! the ledger atomically.
//!
//! ## Subcommands
//!
//! - `issue`: issue a new credential
//! - `renew`: reset a credential's validity window from now
//! - `validate`: look up a credential and derive `is_valid`
//! - `verify-ledger`: check the ledger's hash chain
//!
//! Handlers return domain values; `main` renders them as JSON on stdout.
//! Logs go to stderr.

pub mod config;
pub mod issue;
pub mod renew;
pub mod store;
pub mod validate;
pub mod verify;

use anyhow::Context;

use credreg_core::IssuerId;
use credreg_state::{IssuerAuthority, SingleIssuer};

use crate::config::CliConfig;

/// Check that `acting` (or the configured issuer when absent) may write.
pub fn authorize(config: &CliConfig, acting: Option<&str>) -> anyhow::Result<IssuerId> {
    let authorized =
        IssuerId::new(config.issuer.as_str()).context("invalid configured issuer")?;
    let acting = match acting {
        Some(name) => IssuerId::new(name).context("invalid --issuer")?,
        None => authorized.clone(),
    };
    SingleIssuer::new(authorized).authorize(&acting)?;
    Ok(acting)
}

/// Log a failed command with its full context chain.
pub fn log_failure(err: &anyhow::Error) {
    tracing::error!(error = %format!("{err:#}"), "command failed");
}
