//! # Credential Records
//!
//! One [`CredentialRecord`] per credential ID. The holder identity and the
//! issuance instant are fixed at issuance; only `expiry_date` (and the
//! informational `last_renewed_at`) moves afterwards.
//!
//! Validity is never stored. [`CredentialRecord::is_valid_at`] derives it
//! from `expiry_date` and a caller-supplied instant, so a credential lapses
//! without any explicit expiration transition.

use serde::{Deserialize, Serialize};

use credreg_core::{CredentialId, Timestamp};

/// Validity window granted by issuance and by every renewal: 730 days.
pub const VALIDITY_PERIOD_DAYS: i64 = 730;

/// [`VALIDITY_PERIOD_DAYS`] in seconds (63,072,000).
pub const VALIDITY_PERIOD_SECS: i64 = VALIDITY_PERIOD_DAYS * 24 * 60 * 60;

// ─── Credential Status ───────────────────────────────────────────────

/// Point-in-time status of an issued credential.
///
/// ```text
/// Unissued ──issue──▶ Valid ──(time passes)──▶ Expired
///                       ▲                        │
///                       └────────renew───────────┘
/// ```
///
/// `Unissued` is not a variant: an unissued credential has no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CredentialStatus {
    /// The instant is strictly before `expiry_date`.
    Valid,
    /// The instant is at or after `expiry_date`.
    Expired,
}

impl std::fmt::Display for CredentialStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Valid => "VALID",
            Self::Expired => "EXPIRED",
        };
        f.write_str(s)
    }
}

// ─── Holder Identity ─────────────────────────────────────────────────

/// Identity fields of the credential holder. Stored verbatim; format
/// checking (e.g. of `date_of_birth`) is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolderIdentity {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Nationality, e.g. `"Nigerian"`.
    pub nationality: String,
    /// Date of birth in the caller's canonical date form, e.g. `"1990-01-01"`.
    pub date_of_birth: String,
}

impl HolderIdentity {
    /// Bundle the four holder fields.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        nationality: impl Into<String>,
        date_of_birth: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            nationality: nationality.into(),
            date_of_birth: date_of_birth.into(),
        }
    }
}

// ─── Credential Record ───────────────────────────────────────────────

/// The stored state of one issued credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Primary key.
    pub credential_id: CredentialId,
    /// Holder identity, immutable after issuance.
    pub holder: HolderIdentity,
    /// Issuance instant.
    pub issued_at: Timestamp,
    /// First instant at which the credential is no longer valid.
    pub expiry_date: Timestamp,
    /// Most recent renewal instant, if the credential was ever renewed.
    #[serde(default)]
    pub last_renewed_at: Option<Timestamp>,
}

impl CredentialRecord {
    /// Whether the credential is valid at `at` (strictly before expiry).
    pub fn is_valid_at(&self, at: Timestamp) -> bool {
        at < self.expiry_date
    }

    /// Status at `at`.
    pub fn status_at(&self, at: Timestamp) -> CredentialStatus {
        if self.is_valid_at(at) {
            CredentialStatus::Valid
        } else {
            CredentialStatus::Expired
        }
    }

    /// Build the read-only view returned by validation.
    pub fn view_at(&self, at: Timestamp) -> CredentialView {
        CredentialView {
            credential_id: self.credential_id.clone(),
            first_name: self.holder.first_name.clone(),
            last_name: self.holder.last_name.clone(),
            nationality: self.holder.nationality.clone(),
            date_of_birth: self.holder.date_of_birth.clone(),
            issued_at: self.issued_at.epoch_secs(),
            expiry_date: self.expiry_date.epoch_secs(),
            is_valid: self.is_valid_at(at),
        }
    }
}

// ─── Credential View ─────────────────────────────────────────────────

/// What a verifier sees: stored fields plus the derived `is_valid` flag.
///
/// Times are integer seconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialView {
    pub credential_id: CredentialId,
    pub first_name: String,
    pub last_name: String,
    pub nationality: String,
    pub date_of_birth: String,
    pub issued_at: i64,
    pub expiry_date: i64,
    pub is_valid: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(issued: i64, expiry: i64) -> CredentialRecord {
        CredentialRecord {
            credential_id: CredentialId::new("DL12345").unwrap(),
            holder: HolderIdentity::new("John", "Doe", "Nigerian", "1990-01-01"),
            issued_at: Timestamp::from_epoch_secs(issued).unwrap(),
            expiry_date: Timestamp::from_epoch_secs(expiry).unwrap(),
            last_renewed_at: None,
        }
    }

    fn at(secs: i64) -> Timestamp {
        Timestamp::from_epoch_secs(secs).unwrap()
    }

    #[test]
    fn test_validity_period_constant() {
        assert_eq!(VALIDITY_PERIOD_SECS, 63_072_000);
    }

    #[test]
    fn test_valid_strictly_before_expiry() {
        let rec = record(0, 100);
        assert!(rec.is_valid_at(at(99)));
        assert!(!rec.is_valid_at(at(100)));
        assert!(!rec.is_valid_at(at(101)));
    }

    #[test]
    fn test_status_at() {
        let rec = record(0, 100);
        assert_eq!(rec.status_at(at(50)), CredentialStatus::Valid);
        assert_eq!(rec.status_at(at(100)), CredentialStatus::Expired);
        assert_eq!(CredentialStatus::Expired.to_string(), "EXPIRED");
    }

    #[test]
    fn test_view_carries_fields_and_epoch_seconds() {
        let view = record(10, 100).view_at(at(20));
        assert_eq!(view.credential_id.as_str(), "DL12345");
        assert_eq!(view.first_name, "John");
        assert_eq!(view.last_name, "Doe");
        assert_eq!(view.nationality, "Nigerian");
        assert_eq!(view.date_of_birth, "1990-01-01");
        assert_eq!(view.issued_at, 10);
        assert_eq!(view.expiry_date, 100);
        assert!(view.is_valid);
    }

    #[test]
    fn test_record_serialization() {
        let rec = record(0, 100);
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["credential_id"], "DL12345");
        assert_eq!(json["expiry_date"], "1970-01-01T00:01:40Z");
        assert!(json["last_renewed_at"].is_null());
        let parsed: CredentialRecord = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, rec);
    }
}
