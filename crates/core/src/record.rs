//! Structured-record metadata
//!
//! A structured record is a typed entity with a declared name and declared
//! primary-key column(s), typically a database-mapped model. Records come
//! in *families*: all record types mapped by the same persistence layer
//! share one family, and the identity resolver dispatches on the family id.
//!
//! The metadata here is deliberately minimal: a [`RecordSchema`] names the
//! record type and its key columns, and the [`Record`] trait lets an
//! instance hand out its key values in declared column order. Everything
//! else about the entity stays with the persistence layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identifier of a record family
///
/// A family groups every record type produced by one integration (one ORM
/// base class, one table mapper). The resolver refuses to identify records
/// whose family has no registered handler.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FamilyId(String);

impl FamilyId {
    /// Create a family id
    pub fn new(id: impl Into<String>) -> Self {
        FamilyId(id.into())
    }

    /// View the id as a string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FamilyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FamilyId {
    fn from(s: &str) -> Self {
        FamilyId(s.to_string())
    }
}

/// Declared shape of a record type: family, name, key columns
///
/// The schema is the only type-level metadata the resolver needs. Key
/// columns are kept in declared order; that order is part of the identity
/// contract (`<name>:<col1>=<v1>:<col2>=<v2>...`).
///
/// Schemas are shared: record instances and bare-type subjects reference the
/// same `Arc<RecordSchema>`, which is what makes instance and type identities
/// agree on the record name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSchema {
    /// Family this record type belongs to
    pub family: FamilyId,
    /// Declared record name (e.g. a table name)
    pub name: String,
    /// Declared primary-key columns, in order
    pub primary_key: Vec<String>,
}

impl RecordSchema {
    /// Declare a record schema
    ///
    /// A schema with zero key columns can be constructed (the declaration
    /// may come from external metadata), but deriving an *instance* identity
    /// from it fails with `MissingKeyDefinition`.
    pub fn new<C, S>(family: FamilyId, name: impl Into<String>, primary_key: C) -> Arc<Self>
    where
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(RecordSchema {
            family,
            name: name.into(),
            primary_key: primary_key.into_iter().map(Into::into).collect(),
        })
    }

    /// Check whether the schema declares any key columns
    #[inline]
    pub fn has_key_columns(&self) -> bool {
        !self.primary_key.is_empty()
    }
}

impl fmt::Display for RecordSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.family, self.name)
    }
}

/// Scalar value of a record key column
///
/// Rendering matches the scalar subject rules: the `Display` form of the
/// value, with strings rendered verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    /// String value, rendered verbatim
    Str(String),
    /// Boolean value
    Bool(bool),
    /// Signed integer value
    Int(i64),
    /// Unsigned integer value
    Uint(u64),
    /// Floating-point value
    Float(f64),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Str(s) => write!(f, "{}", s),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Uint(u) => write!(f, "{}", u),
            Scalar::Float(x) => write!(f, "{}", x),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Str(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Str(s)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Int(i)
    }
}

impl From<u64> for Scalar {
    fn from(u: u64) -> Self {
        Scalar::Uint(u)
    }
}

impl From<f64> for Scalar {
    fn from(x: f64) -> Self {
        Scalar::Float(x)
    }
}

/// A structured-record instance
///
/// Implemented by entity types that want generation-tracked cache keys. An
/// implementation exposes its shared schema and its primary-key values in
/// the schema's declared column order.
///
/// Thread safety: record instances cross thread boundaries inside mutation
/// trackers, so `Send + Sync` is required.
pub trait Record: Send + Sync {
    /// The schema shared by every instance of this record type
    fn schema(&self) -> &Arc<RecordSchema>;

    /// Primary-key values, in the schema's declared column order
    ///
    /// The returned vector must have exactly one value per declared key
    /// column; a mismatch is reported as `MissingKeyDefinition` at
    /// resolution time.
    fn key_values(&self) -> Vec<Scalar>;
}
