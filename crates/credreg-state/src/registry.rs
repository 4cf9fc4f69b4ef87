//! # Credential Registry State Machine
//!
//! Owns the mapping from credential ID to [`CredentialRecord`] and the
//! [`Ledger`] of committed writes.
//!
//! ## States (per credential ID)
//!
//! ```text
//! Unissued ──issue──▶ Issued(valid) ──(clock passes expiry)──▶ Issued(expired)
//!                          ▲   │                                    │
//!                          │   └──renew (reset from now)──┐         │
//!                          └──────────────────────────────┴─renew───┘
//! ```
//!
//! `Unissued` is initial and there is no terminal state. Only `issue` and
//! `renew` change stored state; `validate` derives validity from the clock.
//!
//! ## Commit protocol
//!
//! Each write reads the clock once, checks its precondition, seals a
//! ledger entry, then applies the change to the record map and appends the
//! entry. A rejected write commits nothing to either.
//!
//! ## Concurrency
//!
//! Writes take `&mut self` and reads take `&self`; the owner serializes
//! them. Hosts that share a registry across threads wrap it in
//! [`SharedRegistry`](crate::shared::SharedRegistry).

use std::collections::HashMap;

use credreg_core::{Clock, CredentialId, Timestamp};

use crate::credential::{CredentialRecord, CredentialView, HolderIdentity, VALIDITY_PERIOD_SECS};
use crate::error::{LedgerError, RegistryError};
use crate::ledger::{Ledger, RegistryEvent};

/// The credential registry.
#[derive(Debug)]
pub struct CredentialRegistry<C> {
    records: HashMap<CredentialId, CredentialRecord>,
    ledger: Ledger,
    clock: C,
}

impl<C: Clock> CredentialRegistry<C> {
    /// An empty registry reading time from `clock`.
    pub fn new(clock: C) -> Self {
        Self {
            records: HashMap::new(),
            ledger: Ledger::new(),
            clock,
        }
    }

    /// Rebuild a registry by verifying and replaying `ledger`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Ledger`] if the chain fails verification or an
    /// entry violates the state machine (duplicate issue, renewal of an
    /// unknown ID, expiry inconsistent with the entry instant).
    pub fn from_ledger(ledger: Ledger, clock: C) -> Result<Self, RegistryError> {
        ledger.verify()?;
        let mut registry = Self::new(clock);
        for entry in ledger.entries() {
            registry
                .apply(entry.recorded_at, &entry.event)
                .map_err(|e| LedgerError::Replay {
                    sequence: entry.sequence,
                    reason: e.to_string(),
                })?;
        }
        registry.ledger = ledger;
        tracing::debug!(
            credentials = registry.records.len(),
            entries = registry.ledger.len(),
            "registry replayed from ledger"
        );
        Ok(registry)
    }

    /// Issue a new credential valid for [`VALIDITY_PERIOD_SECS`] from now.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateCredential`] if `credential_id` already has
    /// a record, whatever the holder fields supplied.
    pub fn issue(
        &mut self,
        credential_id: CredentialId,
        holder: HolderIdentity,
    ) -> Result<&CredentialRecord, RegistryError> {
        let now = self.clock.now();
        if self.records.contains_key(&credential_id) {
            tracing::warn!(%credential_id, "issue rejected: credential already exists");
            return Err(RegistryError::DuplicateCredential { credential_id });
        }
        let expiry_date = expiry_from(&credential_id, now)?;
        let record = CredentialRecord {
            credential_id: credential_id.clone(),
            holder,
            issued_at: now,
            expiry_date,
            last_renewed_at: None,
        };
        self.commit(now, RegistryEvent::Issued { record })?;
        tracing::info!(%credential_id, issued_at = %now, %expiry_date, "credential issued");
        self.get(&credential_id)
            .ok_or(RegistryError::CredentialNotFound { credential_id })
    }

    /// Reset the validity window of an existing credential to
    /// [`VALIDITY_PERIOD_SECS`] from now.
    ///
    /// The new expiry is measured from the renewal instant, not from the
    /// prior expiry: renewing early can shorten the remaining term. Expired
    /// credentials renew exactly like valid ones.
    ///
    /// # Errors
    ///
    /// [`RegistryError::CredentialNotFound`] if the ID was never issued.
    pub fn renew(&mut self, credential_id: &CredentialId) -> Result<&CredentialRecord, RegistryError> {
        let now = self.clock.now();
        let (previous_expiry, previous_status) = match self.records.get(credential_id) {
            Some(record) => (record.expiry_date, record.status_at(now)),
            None => {
                tracing::warn!(%credential_id, "renew rejected: credential not found");
                return Err(not_found(credential_id));
            }
        };
        let expiry_date = expiry_from(credential_id, now)?;
        self.commit(
            now,
            RegistryEvent::Renewed {
                credential_id: credential_id.clone(),
                expiry_date,
            },
        )?;
        tracing::info!(
            %credential_id,
            renewed_at = %now,
            %previous_expiry,
            %previous_status,
            %expiry_date,
            "credential renewed"
        );
        self.get(credential_id).ok_or_else(|| not_found(credential_id))
    }

    /// Validate a credential against the registry clock.
    ///
    /// # Errors
    ///
    /// [`RegistryError::CredentialNotFound`] if the ID was never issued.
    pub fn validate(&self, credential_id: &CredentialId) -> Result<CredentialView, RegistryError> {
        self.validate_at(credential_id, self.clock.now())
    }

    /// Validate a credential as of an explicit instant.
    pub fn validate_at(
        &self,
        credential_id: &CredentialId,
        at: Timestamp,
    ) -> Result<CredentialView, RegistryError> {
        let record = self
            .records
            .get(credential_id)
            .ok_or_else(|| not_found(credential_id))?;
        tracing::debug!(%credential_id, %at, status = %record.status_at(at), "credential validated");
        Ok(record.view_at(at))
    }

    /// The stored record, if the ID was ever issued.
    pub fn get(&self, credential_id: &CredentialId) -> Option<&CredentialRecord> {
        self.records.get(credential_id)
    }

    /// Whether the ID was ever issued.
    pub fn contains(&self, credential_id: &CredentialId) -> bool {
        self.records.contains_key(credential_id)
    }

    /// Number of issued credentials.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no credential was ever issued.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records, in no particular order.
    pub fn credentials(&self) -> impl Iterator<Item = &CredentialRecord> {
        self.records.values()
    }

    /// The ledger of committed writes.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Consume the registry, keeping only its ledger.
    pub fn into_ledger(self) -> Ledger {
        self.ledger
    }

    /// The clock this registry reads.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn commit(&mut self, at: Timestamp, event: RegistryEvent) -> Result<(), RegistryError> {
        let entry = self.ledger.seal(at, event)?;
        self.apply(at, &entry.event)?;
        self.ledger.append(entry);
        Ok(())
    }

    /// Apply one event to the record map, enforcing the state machine.
    fn apply(&mut self, at: Timestamp, event: &RegistryEvent) -> Result<(), RegistryError> {
        let expected = expiry_from(event.credential_id(), at)?;
        match event {
            RegistryEvent::Issued { record } => {
                if self.records.contains_key(&record.credential_id) {
                    return Err(RegistryError::DuplicateCredential {
                        credential_id: record.credential_id.clone(),
                    });
                }
                check_issuance(record, at)?;
                check_expiry(&record.credential_id, expected, record.expiry_date)?;
                self.records.insert(record.credential_id.clone(), record.clone());
            }
            RegistryEvent::Renewed {
                credential_id,
                expiry_date,
            } => {
                check_expiry(credential_id, expected, *expiry_date)?;
                let record = self
                    .records
                    .get_mut(credential_id)
                    .ok_or_else(|| not_found(credential_id))?;
                record.expiry_date = *expiry_date;
                record.last_renewed_at = Some(at);
            }
        }
        Ok(())
    }
}

fn expiry_from(credential_id: &CredentialId, from: Timestamp) -> Result<Timestamp, RegistryError> {
    from.checked_add_secs(VALIDITY_PERIOD_SECS)
        .ok_or_else(|| RegistryError::ExpiryOverflow {
            credential_id: credential_id.clone(),
            from,
        })
}

fn check_issuance(record: &CredentialRecord, at: Timestamp) -> Result<(), RegistryError> {
    let detail = if record.issued_at != at {
        format!("issued_at {} differs from entry instant {at}", record.issued_at)
    } else if let Some(renewed_at) = record.last_renewed_at {
        format!("new record already renewed at {renewed_at}")
    } else {
        return Ok(());
    };
    Err(RegistryError::InconsistentIssuance {
        credential_id: record.credential_id.clone(),
        detail,
    })
}

fn check_expiry(
    credential_id: &CredentialId,
    expected: Timestamp,
    actual: Timestamp,
) -> Result<(), RegistryError> {
    if expected != actual {
        return Err(RegistryError::InconsistentExpiry {
            credential_id: credential_id.clone(),
            expected,
            actual,
        });
    }
    Ok(())
}

fn not_found(credential_id: &CredentialId) -> RegistryError {
    RegistryError::CredentialNotFound {
        credential_id: credential_id.clone(),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use credreg_core::ManualClock;

    const T0: i64 = 1_767_225_600; // 2026-01-01T00:00:00Z
    const DAY: i64 = 24 * 60 * 60;

    fn clock() -> ManualClock {
        ManualClock::new(Timestamp::from_epoch_secs(T0).unwrap())
    }

    fn id(s: &str) -> CredentialId {
        CredentialId::new(s).unwrap()
    }

    fn john() -> HolderIdentity {
        HolderIdentity::new("John", "Doe", "Nigerian", "1990-01-01")
    }

    fn jane() -> HolderIdentity {
        HolderIdentity::new("Jane", "Smith", "Ghanaian", "1992-05-12")
    }

    fn registry_with_dl12345() -> (CredentialRegistry<ManualClock>, ManualClock) {
        let clock = clock();
        let mut registry = CredentialRegistry::new(clock.clone());
        registry.issue(id("DL12345"), john()).unwrap();
        (registry, clock)
    }

    // ── issue ────────────────────────────────────────────────────────

    #[test]
    fn test_issue_round_trips_holder_fields() {
        let (registry, _) = registry_with_dl12345();
        let view = registry.validate(&id("DL12345")).unwrap();
        assert_eq!(view.first_name, "John");
        assert_eq!(view.last_name, "Doe");
        assert_eq!(view.nationality, "Nigerian");
        assert_eq!(view.date_of_birth, "1990-01-01");
        assert!(view.is_valid);
    }

    #[test]
    fn test_issue_sets_two_year_window() {
        let (registry, _) = registry_with_dl12345();
        let record = registry.get(&id("DL12345")).unwrap();
        assert_eq!(record.issued_at.epoch_secs(), T0);
        assert_eq!(record.expiry_date.epoch_secs(), T0 + 63_072_000);
        assert_eq!(record.last_renewed_at, None);
    }

    #[test]
    fn test_duplicate_issue_rejected_and_record_unchanged() {
        let (mut registry, clock) = registry_with_dl12345();
        clock.advance(DAY).unwrap();
        let err = registry.issue(id("DL12345"), jane()).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateCredential { .. }));

        let record = registry.get(&id("DL12345")).unwrap();
        assert_eq!(record.holder, john());
        assert_eq!(record.issued_at.epoch_secs(), T0);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.ledger().len(), 1);
    }

    #[test]
    fn test_duplicate_with_identical_fields_still_rejected() {
        let (mut registry, _) = registry_with_dl12345();
        assert!(registry.issue(id("DL12345"), john()).is_err());
    }

    #[test]
    fn test_issue_grows_registry_by_one() {
        let (mut registry, _) = registry_with_dl12345();
        registry.issue(id("DL67890"), jane()).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.contains(&id("DL67890")));
    }

    // ── renew ────────────────────────────────────────────────────────

    #[test]
    fn test_renew_resets_window_from_now() {
        let (mut registry, clock) = registry_with_dl12345();
        let renewed_at = clock.advance(100 * DAY).unwrap();
        let record = registry.renew(&id("DL12345")).unwrap();
        assert_eq!(
            record.expiry_date.epoch_secs(),
            renewed_at.epoch_secs() + VALIDITY_PERIOD_SECS
        );
        assert_eq!(record.last_renewed_at, Some(renewed_at));
        assert_eq!(record.issued_at.epoch_secs(), T0);
    }

    #[test]
    fn test_renew_is_not_additive() {
        let (mut registry, clock) = registry_with_dl12345();
        clock.advance(DAY).unwrap();
        registry.renew(&id("DL12345")).unwrap();
        clock.advance(DAY).unwrap();
        let record = registry.renew(&id("DL12345")).unwrap();
        assert_eq!(
            record.expiry_date.epoch_secs(),
            T0 + 2 * DAY + VALIDITY_PERIOD_SECS
        );
    }

    #[test]
    fn test_renew_can_shorten_remaining_term() {
        let clock = clock();
        let mut registry = CredentialRegistry::new(clock.clone());
        clock.advance(10 * DAY).unwrap();
        registry.issue(id("DL1"), john()).unwrap();
        let original_expiry = registry.get(&id("DL1")).unwrap().expiry_date;

        // A clock that moved backwards between writes still measures from "now".
        clock.set(Timestamp::from_epoch_secs(T0).unwrap());
        let record = registry.renew(&id("DL1")).unwrap();
        assert!(record.expiry_date < original_expiry);
        assert_eq!(record.expiry_date.epoch_secs(), T0 + VALIDITY_PERIOD_SECS);
    }

    #[test]
    fn test_renew_revives_expired_credential() {
        let (mut registry, clock) = registry_with_dl12345();
        clock.advance(VALIDITY_PERIOD_SECS + 5 * 365 * DAY).unwrap();
        assert!(!registry.validate(&id("DL12345")).unwrap().is_valid);

        registry.renew(&id("DL12345")).unwrap();
        assert!(registry.validate(&id("DL12345")).unwrap().is_valid);
    }

    #[test]
    fn test_renew_unknown_is_not_found() {
        let (mut registry, _) = registry_with_dl12345();
        let err = registry.renew(&id("DL99999")).unwrap_err();
        assert!(matches!(err, RegistryError::CredentialNotFound { .. }));
        assert_eq!(registry.ledger().len(), 1);
    }

    // ── validate ─────────────────────────────────────────────────────

    #[test]
    fn test_validate_unknown_is_not_found() {
        let registry = CredentialRegistry::new(clock());
        let err = registry.validate(&id("DL12345")).unwrap_err();
        assert!(matches!(err, RegistryError::CredentialNotFound { .. }));
    }

    #[test]
    fn test_validity_boundary_is_exclusive() {
        let (registry, clock) = registry_with_dl12345();
        clock.advance(VALIDITY_PERIOD_SECS - 1).unwrap();
        assert!(registry.validate(&id("DL12345")).unwrap().is_valid);
        clock.advance(1).unwrap();
        assert!(!registry.validate(&id("DL12345")).unwrap().is_valid);
    }

    #[test]
    fn test_validate_at_explicit_instant() {
        let (registry, _) = registry_with_dl12345();
        let later = Timestamp::from_epoch_secs(T0 + VALIDITY_PERIOD_SECS + 1).unwrap();
        assert!(!registry.validate_at(&id("DL12345"), later).unwrap().is_valid);
    }

    #[test]
    fn test_validate_does_not_mutate() {
        let (registry, clock) = registry_with_dl12345();
        clock.advance(3 * 365 * DAY).unwrap();
        let before = registry.get(&id("DL12345")).unwrap().clone();
        let _ = registry.validate(&id("DL12345")).unwrap();
        assert_eq!(registry.get(&id("DL12345")).unwrap(), &before);
        assert_eq!(registry.ledger().len(), 1);
    }

    // ── failure atomicity ────────────────────────────────────────────

    #[test]
    fn test_expiry_overflow_commits_nothing() {
        let clock = ManualClock::new(Timestamp::from_utc(chrono_max()));
        let mut registry = CredentialRegistry::new(clock);
        let err = registry.issue(id("DL1"), john()).unwrap_err();
        assert!(matches!(err, RegistryError::ExpiryOverflow { .. }));
        assert!(registry.is_empty());
        assert!(registry.ledger().is_empty());
    }

    fn chrono_max() -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::<chrono::Utc>::MAX_UTC
    }

    // ── ledger replay ────────────────────────────────────────────────

    #[test]
    fn test_every_write_appends_one_entry() {
        let (mut registry, clock) = registry_with_dl12345();
        clock.advance(DAY).unwrap();
        registry.renew(&id("DL12345")).unwrap();
        registry.issue(id("DL2"), jane()).unwrap();
        assert_eq!(registry.ledger().len(), 3);
        assert!(registry.ledger().verify().is_ok());
    }

    #[test]
    fn test_replay_reproduces_records() {
        let (mut registry, clock) = registry_with_dl12345();
        clock.advance(DAY).unwrap();
        registry.renew(&id("DL12345")).unwrap();
        registry.issue(id("DL2"), jane()).unwrap();

        let original: Vec<CredentialRecord> = {
            let mut v: Vec<_> = registry.credentials().cloned().collect();
            v.sort_by(|a, b| a.credential_id.cmp(&b.credential_id));
            v
        };
        let rebuilt = CredentialRegistry::from_ledger(registry.into_ledger(), clock).unwrap();
        let mut replayed: Vec<_> = rebuilt.credentials().cloned().collect();
        replayed.sort_by(|a, b| a.credential_id.cmp(&b.credential_id));
        assert_eq!(replayed, original);
    }

    #[test]
    fn test_replay_rejects_duplicate_issue() {
        let mut ledger = Ledger::new();
        let at = Timestamp::from_epoch_secs(T0).unwrap();
        let record = CredentialRecord {
            credential_id: id("DL1"),
            holder: john(),
            issued_at: at,
            expiry_date: at.checked_add_secs(VALIDITY_PERIOD_SECS).unwrap(),
            last_renewed_at: None,
        };
        for _ in 0..2 {
            let entry = ledger
                .seal(at, RegistryEvent::Issued { record: record.clone() })
                .unwrap();
            ledger.append(entry);
        }
        let err = CredentialRegistry::from_ledger(ledger, clock()).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Ledger(LedgerError::Replay { sequence: 1, .. })
        ));
    }

    #[test]
    fn test_replay_rejects_inconsistent_expiry() {
        let mut ledger = Ledger::new();
        let at = Timestamp::from_epoch_secs(T0).unwrap();
        let record = CredentialRecord {
            credential_id: id("DL1"),
            holder: john(),
            issued_at: at,
            expiry_date: at.checked_add_secs(10 * VALIDITY_PERIOD_SECS).unwrap(),
            last_renewed_at: None,
        };
        let entry = ledger.seal(at, RegistryEvent::Issued { record }).unwrap();
        ledger.append(entry);
        let err = CredentialRegistry::from_ledger(ledger, clock()).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Ledger(LedgerError::Replay { sequence: 0, .. })
        ));
    }

    fn sealed_issuance(record: CredentialRecord, at: Timestamp) -> Ledger {
        let mut ledger = Ledger::new();
        let entry = ledger.seal(at, RegistryEvent::Issued { record }).unwrap();
        ledger.append(entry);
        ledger
    }

    #[test]
    fn test_replay_rejects_issued_at_other_than_entry_instant() {
        let at = Timestamp::from_epoch_secs(T0).unwrap();
        let record = CredentialRecord {
            credential_id: id("DL1"),
            holder: john(),
            issued_at: Timestamp::from_epoch_secs(0).unwrap(),
            expiry_date: at.checked_add_secs(VALIDITY_PERIOD_SECS).unwrap(),
            last_renewed_at: None,
        };
        let err = CredentialRegistry::from_ledger(sealed_issuance(record, at), clock()).unwrap_err();
        match err {
            RegistryError::Ledger(LedgerError::Replay { sequence, reason }) => {
                assert_eq!(sequence, 0);
                assert!(reason.contains("issued_at"), "{reason}");
            }
            other => panic!("expected replay failure, got {other:?}"),
        }
    }

    #[test]
    fn test_replay_rejects_issuance_carrying_renewal() {
        let at = Timestamp::from_epoch_secs(T0).unwrap();
        let record = CredentialRecord {
            credential_id: id("DL1"),
            holder: john(),
            issued_at: at,
            expiry_date: at.checked_add_secs(VALIDITY_PERIOD_SECS).unwrap(),
            last_renewed_at: Some(Timestamp::from_epoch_secs(5).unwrap()),
        };
        let err = CredentialRegistry::from_ledger(sealed_issuance(record, at), clock()).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Ledger(LedgerError::Replay { sequence: 0, .. })
        ));
    }

    #[test]
    fn test_replayed_issuance_keeps_expiry_invariant() {
        let (registry, _) = registry_with_dl12345();
        let replayed = CredentialRegistry::from_ledger(registry.ledger().clone(), clock()).unwrap();
        let record = replayed.get(&id("DL12345")).unwrap();
        assert_eq!(
            record.expiry_date.epoch_secs(),
            record.issued_at.epoch_secs() + VALIDITY_PERIOD_SECS
        );
    }

    #[test]
    fn test_replay_rejects_renewal_of_unknown() {
        let mut ledger = Ledger::new();
        let at = Timestamp::from_epoch_secs(T0).unwrap();
        let entry = ledger
            .seal(
                at,
                RegistryEvent::Renewed {
                    credential_id: id("DL1"),
                    expiry_date: at.checked_add_secs(VALIDITY_PERIOD_SECS).unwrap(),
                },
            )
            .unwrap();
        ledger.append(entry);
        assert!(CredentialRegistry::from_ledger(ledger, clock()).is_err());
    }
}
