//! # Validate Subcommand
//!
//! Read-only lookup under a shared ledger lock. Never writes the ledger file.

use anyhow::Context;
use clap::Args;

use credreg_core::{Clock, CredentialId, Timestamp};
use credreg_state::CredentialView;

use crate::config::CliConfig;
use crate::store::LedgerStore;

/// Arguments for the validate subcommand.
#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Credential ID to look up.
    pub credential_id: String,

    /// Evaluate validity at this RFC 3339 instant instead of now.
    #[arg(long)]
    pub at: Option<String>,
}

/// Look up a credential and derive its validity.
pub fn run_validate<C: Clock>(
    args: &ValidateArgs,
    config: &CliConfig,
    clock: C,
) -> anyhow::Result<CredentialView> {
    let credential_id =
        CredentialId::new(args.credential_id.as_str()).context("invalid credential ID")?;
    let at = args
        .at
        .as_deref()
        .map(Timestamp::parse_lenient)
        .transpose()
        .context("invalid --at instant")?;

    let store = LedgerStore::new(&config.ledger_path);
    let _lock = store.lock_shared()?;
    let registry = store.open_registry(clock)?;
    let view = match at {
        Some(at) => registry.validate_at(&credential_id, at),
        None => registry.validate(&credential_id),
    }
    .with_context(|| format!("cannot validate {}", args.credential_id))?;
    Ok(view)
}
