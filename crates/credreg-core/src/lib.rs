//! # credreg-core: Foundational Types for the Credential Registry
//!
//! The leaf crate of the workspace. Everything that the registry state
//! machine and its hosts agree on lives here:
//!
//! 1. **Identifier newtypes.** `CredentialId` and `IssuerId` are validated
//!    at construction. An empty credential ID cannot exist as a value, so
//!    the registry never has to re-check it.
//!
//! 2. **UTC-only timestamps and the clock oracle.** `Timestamp` is UTC with
//!    seconds precision. The registry never reads the wall clock directly;
//!    it asks a [`Clock`], which hosts and tests supply.
//!
//! 3. **Canonical bytes and digests.** Ledger entries are hashed through
//!    `CanonicalBytes` (RFC 8785 JSON, floats rejected) and `sha256_digest()`.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `credreg-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, ContentDigest, DigestAlgorithm};
pub use error::{CanonicalizationError, CoreError};
pub use identity::{CredentialId, IssuerId};
pub use temporal::{Clock, FixedClock, ManualClock, SystemClock, Timestamp};
