//! # Verify-Ledger Subcommand
//!
//! Checks the ledger file's hash chain and that it replays cleanly.

use clap::Args;
use serde::Serialize;

use credreg_core::Clock;

use crate::config::CliConfig;
use crate::store::LedgerStore;

/// Arguments for the verify-ledger subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct VerifyLedgerArgs {}

/// Summary of a verified ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerSummary {
    /// Number of ledger entries.
    pub entries: usize,
    /// Number of distinct credentials.
    pub credentials: usize,
    /// Digest of the last entry, or the genesis digest.
    pub head: String,
}

/// Verify and replay the ledger file.
pub fn run_verify_ledger<C: Clock>(
    _args: &VerifyLedgerArgs,
    config: &CliConfig,
    clock: C,
) -> anyhow::Result<LedgerSummary> {
    let store = LedgerStore::new(&config.ledger_path);
    let _lock = store.lock_shared()?;
    let registry = store.open_registry(clock)?;
    let summary = LedgerSummary {
        entries: registry.ledger().len(),
        credentials: registry.len(),
        head: registry.ledger().head().to_string(),
    };
    tracing::info!(
        entries = summary.entries,
        credentials = summary.credentials,
        head = %summary.head,
        "ledger verified"
    );
    Ok(summary)
}
