//! Error types for gencache
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait
//! implementations.
//!
//! Propagation policy: the core never swallows a collaborator failure. A
//! resolution or store error aborts the whole operation: there are no
//! partially-built batches and no catch-and-log-and-continue paths. A
//! silently defaulted identity risks cache-key collisions across unrelated
//! entities, which is the one failure mode this scheme cannot tolerate.

use crate::record::FamilyId;
use thiserror::Error;

/// Result type alias for gencache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Result type alias for counter-store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Error types for identity resolution and versioning
#[derive(Debug, Error)]
pub enum Error {
    /// Identity derivation reached a record whose family has no registered
    /// handler
    #[error("no identity handler registered for record family '{family}'")]
    UnresolvedShape {
        /// Family the resolver failed to dispatch on
        family: FamilyId,
    },

    /// A record declares no usable primary key, or an instance's key values
    /// do not line up with its declared key columns
    #[error("record '{record}' has no usable key definition: {reason}")]
    MissingKeyDefinition {
        /// Record name the derivation failed for
        record: String,
        /// What was wrong with the key metadata
        reason: String,
    },

    /// A family was registered twice on the same resolver
    #[error("record family '{family}' is already registered")]
    DuplicateFamily {
        /// Family that was registered twice
        family: FamilyId,
    },

    /// Counter-store failure, propagated unchanged
    #[error("counter store failure: {0}")]
    Store(#[from] StoreError),
}

/// Error types for the external counter store
///
/// The store contract is narrow (`get_multi`, `incr`), so its failure
/// surface is too: the store is unreachable or its backend rejected the
/// operation. Retry policy belongs to the store client, not to this core.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The counter store could not be reached or timed out
    #[error("counter store unavailable: {0}")]
    Unavailable(String),

    /// The counter store backend rejected the operation
    #[error("counter store backend error: {0}")]
    Backend(String),
}
