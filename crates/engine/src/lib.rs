//! Versioning engine for gencache
//!
//! This crate orchestrates the two core components of the invalidation
//! scheme:
//!
//! - [`IdentityResolver`]: polymorphic dispatch from a subject (value or
//!   record type) to a deterministic string identity
//! - [`Versioner`]: batched generation-stamped cache keys plus the
//!   dual-increment mutation protocol
//! - [`MutationTracker`]: commit-hook glue for transactional persistence
//!   layers
//!
//! The engine is the only component that knows about both identity
//! derivation and counter state; callers wire it up once at startup:
//!
//! ```ignore
//! let resolver = Arc::new(
//!     IdentityResolver::builder()
//!         .register_keyed_family(FamilyId::new("sql"))?
//!         .build(),
//! );
//! let versioner = Versioner::new(resolver, store);
//!
//! let keys = versioner.get_multi_keys(&[Subject::record(order)])?;
//! versioner.increment(&Subject::record(order))?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod mutation;
pub mod resolver;
pub mod versioner;

pub use mutation::MutationTracker;
pub use resolver::{IdentityResolver, IdentityResolverBuilder, KeyedFamily, RecordFamily};
pub use versioner::Versioner;

// Re-export the core vocabulary so downstream callers need one import path
pub use gencache_core::{
    CacheKey, CounterStore, Error, FamilyId, Generation, Identity, Record, RecordSchema, Result,
    Scalar, StoreError, StoreResult, Subject,
};
