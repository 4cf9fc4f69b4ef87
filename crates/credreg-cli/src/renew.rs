//! # Renew Subcommand
//!
//! Resets a credential's validity window from the current instant.

use anyhow::Context;
use clap::Args;

use credreg_core::{Clock, CredentialId};
use credreg_state::CredentialView;

use crate::config::CliConfig;
use crate::store::LedgerStore;

/// Arguments for the renew subcommand.
#[derive(Args, Debug, Clone)]
pub struct RenewArgs {
    /// Credential ID to renew.
    pub credential_id: String,

    /// Issuer performing the write. Defaults to the configured issuer.
    #[arg(long)]
    pub issuer: Option<String>,
}

/// Authorize, renew, and save. Returns the credential as of renewal.
pub fn run_renew<C: Clock>(
    args: &RenewArgs,
    config: &CliConfig,
    clock: C,
) -> anyhow::Result<CredentialView> {
    crate::authorize(config, args.issuer.as_deref())?;
    let credential_id =
        CredentialId::new(args.credential_id.as_str()).context("invalid credential ID")?;

    let store = LedgerStore::new(&config.ledger_path);
    let _lock = store.lock_exclusive()?;
    let mut registry = store.open_registry(clock)?;
    let view = {
        let record = registry
            .renew(&credential_id)
            .with_context(|| format!("cannot renew {}", args.credential_id))?;
        record.view_at(record.last_renewed_at.unwrap_or(record.issued_at))
    };
    store.save(registry.ledger())?;
    Ok(view)
}
