//! # Issue Subcommand
//!
//! Issues a new credential and appends it to the ledger file.

use anyhow::Context;
use clap::Args;

use credreg_core::{Clock, CredentialId};
use credreg_state::{CredentialView, HolderIdentity};

use crate::config::CliConfig;
use crate::store::LedgerStore;

/// Arguments for the issue subcommand.
#[derive(Args, Debug, Clone)]
pub struct IssueArgs {
    /// Credential ID, e.g. a license number.
    pub credential_id: String,

    /// Holder's first name.
    #[arg(long)]
    pub first_name: String,

    /// Holder's last name.
    #[arg(long)]
    pub last_name: String,

    /// Holder's nationality.
    #[arg(long)]
    pub nationality: String,

    /// Holder's date of birth, stored as given.
    #[arg(long)]
    pub date_of_birth: String,

    /// Issuer performing the write. Defaults to the configured issuer.
    #[arg(long)]
    pub issuer: Option<String>,
}

/// Authorize, issue, and save. Returns the credential as of issuance.
pub fn run_issue<C: Clock>(
    args: &IssueArgs,
    config: &CliConfig,
    clock: C,
) -> anyhow::Result<CredentialView> {
    crate::authorize(config, args.issuer.as_deref())?;
    let credential_id =
        CredentialId::new(args.credential_id.as_str()).context("invalid credential ID")?;
    let holder = HolderIdentity::new(
        args.first_name.as_str(),
        args.last_name.as_str(),
        args.nationality.as_str(),
        args.date_of_birth.as_str(),
    );

    let store = LedgerStore::new(&config.ledger_path);
    let _lock = store.lock_exclusive()?;
    let mut registry = store.open_registry(clock)?;
    let view = {
        let record = registry
            .issue(credential_id, holder)
            .with_context(|| format!("cannot issue {}", args.credential_id))?;
        record.view_at(record.issued_at)
    };
    store.save(registry.ledger())?;
    Ok(view)
}
