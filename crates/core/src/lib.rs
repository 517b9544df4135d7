//! Core types and contracts for gencache
//!
//! This crate defines the foundational types used throughout the system:
//! - Subject: tagged union of every shape the resolver can identify
//! - Identity, Generation, CacheKey: the invalidation-scheme value types
//! - RecordSchema, Record, FamilyId, Scalar: structured-record metadata
//! - CounterStore: contract for the external generation-counter owner
//! - Error: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod identity;
pub mod record;
pub mod subject;
pub mod traits;

// Re-export commonly used types and traits
pub use error::{Error, Result, StoreError, StoreResult};
pub use identity::{CacheKey, Generation, Identity};
pub use record::{FamilyId, Record, RecordSchema, Scalar};
pub use subject::Subject;
pub use traits::CounterStore;
