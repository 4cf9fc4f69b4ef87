//! # Issuer Authority
//!
//! The registry operations assume the caller is already authorized. Hosts
//! consult an [`IssuerAuthority`] before calling `issue` or `renew`;
//! `validate` is open to any caller.
//!
//! Only a single issuer role is modelled.

use credreg_core::IssuerId;

use crate::error::RegistryError;

/// Decides whether an issuer may write to the registry.
pub trait IssuerAuthority: Send + Sync {
    /// `Ok(())` if `issuer` may issue and renew credentials.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Unauthorized`] otherwise.
    fn authorize(&self, issuer: &IssuerId) -> Result<(), RegistryError>;
}

/// Exactly one issuer is authorized.
#[derive(Debug, Clone)]
pub struct SingleIssuer {
    issuer: IssuerId,
}

impl SingleIssuer {
    /// Authorize only `issuer`.
    pub fn new(issuer: IssuerId) -> Self {
        Self { issuer }
    }

    /// The authorized issuer.
    pub fn issuer(&self) -> &IssuerId {
        &self.issuer
    }
}

impl IssuerAuthority for SingleIssuer {
    fn authorize(&self, issuer: &IssuerId) -> Result<(), RegistryError> {
        if issuer != &self.issuer {
            tracing::warn!(%issuer, authorized = %self.issuer, "issuer rejected");
            return Err(RegistryError::Unauthorized {
                issuer: issuer.clone(),
            });
        }
        Ok(())
    }
}
