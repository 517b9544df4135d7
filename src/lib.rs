//! gencache - generation-based cache invalidation
//!
//! Rather than deleting cache entries on mutation, every cacheable entity
//! and entity class owns a monotonically increasing generation counter.
//! Cache keys embed the current generation of every entity they depend on,
//! so a mutation silently invalidates all derived cache entries by changing
//! the keys they would be looked up under. No invalidation fan-out.
//!
//! # Quick Start
//!
//! ```ignore
//! use gencache::{FamilyId, IdentityResolver, MemoryCounterStore, Subject, Versioner};
//! use std::sync::Arc;
//!
//! // Wire up once at startup
//! let resolver = Arc::new(
//!     IdentityResolver::builder()
//!         .register_keyed_family(FamilyId::new("sql"))?
//!         .build(),
//! );
//! let versioner = Versioner::new(resolver, Arc::new(MemoryCounterStore::new()));
//!
//! // Before a cache read/write: build generation-stamped keys
//! let keys = versioner.get_multi_keys(&[Subject::record(order)])?;
//! // keys[0] renders as "Order:id=7:v=3"
//!
//! // After a transaction commits: bump the mutated record
//! versioner.increment(&Subject::record(order))?;
//! ```
//!
//! # Architecture
//!
//! The public API lives in the engine crate: the identity resolver, the
//! versioner, and the mutation tracker. The counter-store contract and the
//! value model come from the core crate; `MemoryCounterStore` is the
//! embedded backend for development and tests, with production deployments
//! pointing the versioner at a remote store client instead.

// Re-export the public API from gencache-engine
pub use gencache_engine::*;

// Counter-store backends
pub use gencache_store::MemoryCounterStore;
