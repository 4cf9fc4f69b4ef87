//! # Registry Ledger
//!
//! Append-only, hash-chained log of every committed registry write. The
//! ledger is the durable source of truth: a registry can be rebuilt from
//! it with [`CredentialRegistry::from_ledger`], and any edit to a stored
//! entry is caught by [`Ledger::verify`].
//!
//! ## Chain
//!
//! ```text
//! digest(n) = SHA256(JCS({ sequence, recorded_at, event, prev_digest }))
//! prev_digest(0) = GENESIS_DIGEST
//! prev_digest(n) = digest(n - 1)
//! ```
//!
//! The digest field itself is excluded from the hashed payload.
//!
//! [`CredentialRegistry::from_ledger`]: crate::registry::CredentialRegistry::from_ledger

use serde::{Deserialize, Serialize};

use credreg_core::{sha256_digest, CanonicalBytes, CredentialId, Timestamp};

use crate::credential::CredentialRecord;
use crate::error::LedgerError;

/// `prev_digest` of the first entry: 64 hex zeros.
pub const GENESIS_DIGEST: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// A committed registry write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistryEvent {
    /// A credential was issued. Carries the full initial record.
    Issued {
        /// The record as created.
        record: CredentialRecord,
    },
    /// A credential's validity window was reset from the renewal instant.
    Renewed {
        /// The renewed credential.
        credential_id: CredentialId,
        /// The new expiry.
        expiry_date: Timestamp,
    },
}

impl RegistryEvent {
    /// The credential this event refers to.
    pub fn credential_id(&self) -> &CredentialId {
        match self {
            Self::Issued { record } => &record.credential_id,
            Self::Renewed { credential_id, .. } => credential_id,
        }
    }
}

/// One link of the ledger chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Position in the ledger, starting at 0.
    pub sequence: u64,
    /// The instant the write was committed (the operation's clock reading).
    pub recorded_at: Timestamp,
    /// What was written.
    pub event: RegistryEvent,
    /// Hex digest of the previous entry, or [`GENESIS_DIGEST`].
    pub prev_digest: String,
    /// Hex digest of this entry's payload.
    pub digest: String,
}

#[derive(Serialize)]
struct EntryPayload<'a> {
    sequence: u64,
    recorded_at: Timestamp,
    event: &'a RegistryEvent,
    prev_digest: &'a str,
}

impl LedgerEntry {
    /// Recompute the digest of this entry from its payload.
    pub fn compute_digest(&self) -> Result<String, LedgerError> {
        payload_digest(self.sequence, self.recorded_at, &self.event, &self.prev_digest)
    }
}

fn payload_digest(
    sequence: u64,
    recorded_at: Timestamp,
    event: &RegistryEvent,
    prev_digest: &str,
) -> Result<String, LedgerError> {
    let payload = EntryPayload {
        sequence,
        recorded_at,
        event,
        prev_digest,
    };
    let canonical = CanonicalBytes::new(&payload)?;
    Ok(sha256_digest(&canonical).to_hex())
}

/// The ordered chain of ledger entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    /// An empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries in commit order.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ledger has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Digest the next entry must link to.
    pub fn head(&self) -> &str {
        self.entries
            .last()
            .map(|e| e.digest.as_str())
            .unwrap_or(GENESIS_DIGEST)
    }

    /// Build the next entry for `event` without appending it.
    ///
    /// Sealing can fail (canonicalization); appending cannot. The registry
    /// seals first so that a failed seal leaves both the ledger and the
    /// record map untouched.
    pub fn seal(
        &self,
        recorded_at: Timestamp,
        event: RegistryEvent,
    ) -> Result<LedgerEntry, LedgerError> {
        let sequence = self.entries.len() as u64;
        let prev_digest = self.head().to_string();
        let digest = payload_digest(sequence, recorded_at, &event, &prev_digest)?;
        Ok(LedgerEntry {
            sequence,
            recorded_at,
            event,
            prev_digest,
            digest,
        })
    }

    /// Append an entry produced by [`Ledger::seal`] on this ledger.
    pub(crate) fn append(&mut self, entry: LedgerEntry) {
        debug_assert_eq!(entry.sequence, self.entries.len() as u64);
        debug_assert_eq!(entry.prev_digest, self.head());
        self.entries.push(entry);
    }

    /// Verify sequence numbers, links, and digests of every entry.
    ///
    /// Reports the first entry that fails.
    pub fn verify(&self) -> Result<(), LedgerError> {
        let mut expected_prev = GENESIS_DIGEST;
        for (index, entry) in self.entries.iter().enumerate() {
            let expected_sequence = index as u64;
            if entry.sequence != expected_sequence {
                return Err(LedgerError::SequenceGap {
                    expected: expected_sequence,
                    actual: entry.sequence,
                });
            }
            if entry.prev_digest != expected_prev {
                return Err(LedgerError::BrokenLink {
                    sequence: entry.sequence,
                    expected: expected_prev.to_string(),
                    actual: entry.prev_digest.clone(),
                });
            }
            let recomputed = entry.compute_digest()?;
            if recomputed != entry.digest {
                return Err(LedgerError::DigestMismatch {
                    sequence: entry.sequence,
                    expected: recomputed,
                    actual: entry.digest.clone(),
                });
            }
            expected_prev = entry.digest.as_str();
        }
        Ok(())
    }
}
