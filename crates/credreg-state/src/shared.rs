//! # Shared Registry Handle
//!
//! For hosts that call the registry from several threads. Each write holds
//! the write lock for the whole operation, so `issue` and `renew` are
//! atomic with respect to each other; `validate` takes the read lock and
//! observes the last committed write.
//!
//! `parking_lot::RwLock` does not poison, and no lock is held across any
//! blocking call.

use std::sync::Arc;

use parking_lot::RwLock;

use credreg_core::{Clock, CredentialId, Timestamp};

use crate::credential::{CredentialView, HolderIdentity};
use crate::error::RegistryError;
use crate::ledger::Ledger;
use crate::registry::CredentialRegistry;

/// A cloneable, thread-safe handle to one [`CredentialRegistry`].
#[derive(Debug)]
pub struct SharedRegistry<C> {
    inner: Arc<RwLock<CredentialRegistry<C>>>,
}

impl<C> Clone for SharedRegistry<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Clock> SharedRegistry<C> {
    /// Wrap a registry.
    pub fn new(registry: CredentialRegistry<C>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    /// See [`CredentialRegistry::issue`]. Returns the view as of issuance.
    pub fn issue(
        &self,
        credential_id: CredentialId,
        holder: HolderIdentity,
    ) -> Result<CredentialView, RegistryError> {
        let mut registry = self.inner.write();
        let record = registry.issue(credential_id, holder)?;
        Ok(record.view_at(record.issued_at))
    }

    /// See [`CredentialRegistry::renew`]. Returns the view as of renewal.
    pub fn renew(&self, credential_id: &CredentialId) -> Result<CredentialView, RegistryError> {
        let mut registry = self.inner.write();
        let record = registry.renew(credential_id)?;
        let renewed_at = record.last_renewed_at.unwrap_or(record.issued_at);
        Ok(record.view_at(renewed_at))
    }

    /// See [`CredentialRegistry::validate`].
    pub fn validate(&self, credential_id: &CredentialId) -> Result<CredentialView, RegistryError> {
        self.inner.read().validate(credential_id)
    }

    /// See [`CredentialRegistry::validate_at`].
    pub fn validate_at(
        &self,
        credential_id: &CredentialId,
        at: Timestamp,
    ) -> Result<CredentialView, RegistryError> {
        self.inner.read().validate_at(credential_id, at)
    }

    /// Number of issued credentials.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether no credential was ever issued.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// A consistent copy of the ledger.
    pub fn ledger_snapshot(&self) -> Ledger {
        self.inner.read().ledger().clone()
    }
}
