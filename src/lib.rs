//! N+1-safe bulk serialization hooks for query results.
//!
//! Binds a serialization strategy to a query before it runs, rewrites the
//! query to prefetch exactly what the strategy needs, runs one bulk
//! preparation pass when rows materialize, and hands back rows that
//! serialize with zero additional queries.
//!
//! The pipeline: a [`Serializer`] declares relation loading and the per-row
//! transform. [`SerializableQuerySet::to_serialize`] resolves a
//! [`SerializerRef`] and applies the strategy's directives via
//! [`SerializerExt::prepare_query`]. `fetch()` materializes through the
//! engine's [`Query`] boundary, runs `prepare_rows` once, and returns
//! [`BoundRow`] values; [`serialize`] batch-drives a bound row list.

pub mod error;
pub mod query;
pub mod queryset;
pub mod row;
pub mod serializer;
mod tracing;

// Re-export key types and traits
pub use error::{Error, Result};
pub use query::{Query, Relations, relations};
pub use queryset::SerializableQuerySet;
pub use row::{BoundRow, Serialized, serialize};
pub use serializer::resolve::SerializerRef;
pub use serializer::{
    ArcSerializer, FieldMap, RelationSpec, Serializer, SerializerExt, SerializerSpec, TransformFn,
};
