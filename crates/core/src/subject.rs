//! The subject union: everything the resolver can be asked to identify
//!
//! Identity resolution dispatches on the *shape* of its input, not on a
//! class hierarchy. `Subject` makes every supported shape an explicit
//! variant, including the class-vs-instance distinction the scheme depends
//! on: a record *instance* ([`Subject::Record`]) and its bare *type*
//! ([`Subject::Type`]) are separate variants with separate identity rules
//! and separate increment behavior.
//!
//! ## Shapes
//!
//! | variant | identity rule |
//! |---|---|
//! | `Str` | the string itself |
//! | `Bool` / `Int` / `Uint` / `Float` | `Display` rendering |
//! | `Seq` | `:`-joined element identities, in given order |
//! | `Map` | `:`-joined `key=value` pair identities, in given order |
//! | `Type` | the record's declared name |
//! | `Record` | `<name>:<col1>=<v1>:...` in declared key-column order |
//!
//! The mapping shape is an ordered pair list, so "the mapping's own
//! iteration order" is explicit and caller-controlled. Callers that need
//! identities to agree across differently-ordered constructions must sort
//! before building the subject.

use crate::record::{Record, RecordSchema, Scalar};
use std::fmt;
use std::sync::Arc;

/// A value or type submitted for identity resolution
///
/// ## Invariants
///
/// - Every subject has exactly one shape (variant).
/// - `Record` always refers to an instance; `Type` always refers to a bare
///   record type. There is no untyped "object or class" input.
#[derive(Clone)]
pub enum Subject {
    /// String scalar
    Str(String),
    /// Boolean scalar
    Bool(bool),
    /// Signed integer scalar
    Int(i64),
    /// Unsigned integer scalar
    Uint(u64),
    /// Floating-point scalar
    Float(f64),
    /// Ordered sequence of subjects
    Seq(Vec<Subject>),
    /// Ordered key-value mapping
    Map(Vec<(Subject, Subject)>),
    /// Structured-record instance
    Record(Arc<dyn Record>),
    /// Bare structured-record type
    Type(Arc<RecordSchema>),
}

impl Subject {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Build a record-instance subject
    pub fn record(record: impl Record + 'static) -> Self {
        Subject::Record(Arc::new(record))
    }

    /// Build a record-instance subject from a shared record
    pub fn shared_record(record: Arc<dyn Record>) -> Self {
        Subject::Record(record)
    }

    /// Build a bare-type subject for a record schema
    pub fn record_type(schema: &Arc<RecordSchema>) -> Self {
        Subject::Type(Arc::clone(schema))
    }

    /// Build a sequence subject from anything convertible
    pub fn seq<I, T>(elems: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Subject>,
    {
        Subject::Seq(elems.into_iter().map(Into::into).collect())
    }

    /// Build a mapping subject from ordered pairs
    pub fn map<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Subject>,
        V: Into<Subject>,
    {
        Subject::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Short name of this subject's shape, for diagnostics
    pub fn shape(&self) -> &'static str {
        match self {
            Subject::Str(_) => "str",
            Subject::Bool(_) => "bool",
            Subject::Int(_) => "int",
            Subject::Uint(_) => "uint",
            Subject::Float(_) => "float",
            Subject::Seq(_) => "seq",
            Subject::Map(_) => "map",
            Subject::Record(_) => "record",
            Subject::Type(_) => "type",
        }
    }

    /// Check whether this subject is a record instance
    #[inline]
    pub fn is_record(&self) -> bool {
        matches!(self, Subject::Record(_))
    }

    /// Check whether this subject is a bare record type
    #[inline]
    pub fn is_type(&self) -> bool {
        matches!(self, Subject::Type(_))
    }

    /// The owning record type of a record-instance subject
    ///
    /// Returns `None` for every other shape, including `Type` itself: a bare
    /// type has no owning type and gets no second increment.
    pub fn owning_type(&self) -> Option<&Arc<RecordSchema>> {
        match self {
            Subject::Record(record) => Some(record.schema()),
            _ => None,
        }
    }
}

impl fmt::Debug for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Subject::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Subject::Int(i) => f.debug_tuple("Int").field(i).finish(),
            Subject::Uint(u) => f.debug_tuple("Uint").field(u).finish(),
            Subject::Float(x) => f.debug_tuple("Float").field(x).finish(),
            Subject::Seq(elems) => f.debug_tuple("Seq").field(elems).finish(),
            Subject::Map(pairs) => f.debug_tuple("Map").field(pairs).finish(),
            Subject::Record(record) => f
                .debug_tuple("Record")
                .field(&record.schema().to_string())
                .finish(),
            Subject::Type(schema) => f.debug_tuple("Type").field(&schema.to_string()).finish(),
        }
    }
}

impl From<&str> for Subject {
    fn from(s: &str) -> Self {
        Subject::Str(s.to_string())
    }
}

impl From<String> for Subject {
    fn from(s: String) -> Self {
        Subject::Str(s)
    }
}

impl From<bool> for Subject {
    fn from(b: bool) -> Self {
        Subject::Bool(b)
    }
}

impl From<i64> for Subject {
    fn from(i: i64) -> Self {
        Subject::Int(i)
    }
}

impl From<u64> for Subject {
    fn from(u: u64) -> Self {
        Subject::Uint(u)
    }
}

impl From<f64> for Subject {
    fn from(x: f64) -> Self {
        Subject::Float(x)
    }
}

impl From<Scalar> for Subject {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Str(s) => Subject::Str(s),
            Scalar::Bool(b) => Subject::Bool(b),
            Scalar::Int(i) => Subject::Int(i),
            Scalar::Uint(u) => Subject::Uint(u),
            Scalar::Float(x) => Subject::Float(x),
        }
    }
}
