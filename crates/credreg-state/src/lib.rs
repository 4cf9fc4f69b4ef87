//! # credreg-state: Credential Lifecycle State Machine
//!
//! Issues, renews, and validates identity credentials (e.g. driving
//! licenses) keyed by a unique credential ID.
//!
//! ## Modules
//!
//! - **Credential** (`credential.rs`): the stored record, the holder
//!   identity, the verifier's view, and the 730-day validity period.
//!
//! - **Registry** (`registry.rs`): `issue` / `renew` / `validate`. Each
//!   write reads the clock once; validity is derived on every read.
//!
//! - **Ledger** (`ledger.rs`): hash-chained, append-only log of committed
//!   writes. The registry can be rebuilt from it and tampering is detected.
//!
//! - **Authority** (`authority.rs`): the single-issuer check hosts run
//!   before writes.
//!
//! - **Shared** (`shared.rs`): lock-guarded handle for concurrent hosts.
//!
//! ## Rules
//!
//! - A credential ID is issued at most once for the registry's lifetime.
//! - `expiry_date = issuance or latest renewal instant + 730 days`.
//! - `is_valid = now < expiry_date`, never stored.
//! - Renewal resets the window from the renewal instant, never from the
//!   prior expiry, and applies to expired credentials as well.
//! - A rejected operation commits nothing.

pub mod authority;
pub mod credential;
pub mod error;
pub mod ledger;
pub mod registry;
pub mod shared;

// ─── Credential re-exports ──────────────────────────────────────────

pub use credential::{
    CredentialRecord, CredentialStatus, CredentialView, HolderIdentity, VALIDITY_PERIOD_DAYS,
    VALIDITY_PERIOD_SECS,
};

// ─── Registry re-exports ────────────────────────────────────────────

pub use error::{LedgerError, RegistryError};
pub use registry::CredentialRegistry;
pub use shared::SharedRegistry;

// ─── Ledger re-exports ──────────────────────────────────────────────

pub use ledger::{Ledger, LedgerEntry, RegistryEvent, GENESIS_DIGEST};

// ─── Authority re-exports ───────────────────────────────────────────

pub use authority::{IssuerAuthority, SingleIssuer};
