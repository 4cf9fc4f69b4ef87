//! # Registry Errors
//!
//! Every error here is a rejected operation: nothing was committed, and
//! every other record is untouched.

use thiserror::Error;

use credreg_core::{CanonicalizationError, CredentialId, IssuerId, Timestamp};

/// Errors returned by registry operations.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// `issue` on an ID that already has a record. Callers should `validate`
    /// or `renew` instead.
    #[error("credential {credential_id} already exists")]
    DuplicateCredential {
        /// The existing credential.
        credential_id: CredentialId,
    },

    /// `renew` or `validate` on an ID that was never issued. This means
    /// "never issued", not "expired".
    #[error("credential {credential_id} not found")]
    CredentialNotFound {
        /// The unknown credential.
        credential_id: CredentialId,
    },

    /// Adding the validity period to the current time leaves the
    /// representable timestamp range.
    #[error("expiry for credential {credential_id} overflows from {from}")]
    ExpiryOverflow {
        /// The credential being issued or renewed.
        credential_id: CredentialId,
        /// The issuance or renewal instant.
        from: Timestamp,
    },

    /// A replayed event carries an expiry that is not its instant plus the
    /// validity period.
    #[error("credential {credential_id} has expiry {actual}, expected {expected}")]
    InconsistentExpiry {
        /// The credential the event refers to.
        credential_id: CredentialId,
        /// Expiry derived from the event instant.
        expected: Timestamp,
        /// Expiry recorded in the event.
        actual: Timestamp,
    },

    /// A replayed issuance record disagrees with its ledger entry: it was
    /// issued at another instant, or it already carries a renewal.
    #[error("issuance of credential {credential_id} is inconsistent with its ledger entry: {detail}")]
    InconsistentIssuance {
        /// The credential the event refers to.
        credential_id: CredentialId,
        /// What disagrees.
        detail: String,
    },

    /// The caller is not the authorized issuer.
    #[error("{issuer} is not authorized to issue or renew credentials")]
    Unauthorized {
        /// The rejected issuer.
        issuer: IssuerId,
    },

    /// Ledger integrity or replay failure.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Errors raised while sealing, verifying, or replaying the registry ledger.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The entry could not be canonicalized for hashing.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// Entry sequence numbers are not contiguous from zero.
    #[error("sequence gap: expected entry #{expected}, found #{actual}")]
    SequenceGap {
        /// The sequence number the chain expects next.
        expected: u64,
        /// The sequence number found.
        actual: u64,
    },

    /// An entry's `prev_digest` does not equal its predecessor's digest.
    #[error("broken link at entry #{sequence}: expected prev {expected}, got {actual}")]
    BrokenLink {
        /// The offending entry.
        sequence: u64,
        /// The predecessor's digest (or the genesis digest).
        expected: String,
        /// The `prev_digest` stored in the entry.
        actual: String,
    },

    /// An entry's stored digest does not match its recomputed digest.
    #[error("digest mismatch at entry #{sequence}: expected {expected}, got {actual}")]
    DigestMismatch {
        /// The offending entry.
        sequence: u64,
        /// The recomputed digest.
        expected: String,
        /// The stored digest.
        actual: String,
    },

    /// An entry is well-formed but violates the credential state machine.
    #[error("entry #{sequence} cannot be replayed: {reason}")]
    Replay {
        /// The offending entry.
        sequence: u64,
        /// Why the state machine rejected it.
        reason: String,
    },
}
