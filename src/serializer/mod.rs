//! Serialization strategies.
//!
//! The pipeline: a [`Serializer`] declares what relation loading a query
//! needs and how one row becomes a JSON object. [`SerializerExt`] drives the
//! non-overridable protocol around those declarations — query rewriting,
//! the bulk preparation pass, and extras merging. [`SerializerSpec`] is the
//! build-it-from-options form, and [`SerializerRef`](resolve::SerializerRef)
//! normalizes the three caller-supplied shapes (instance, factory, plain
//! transform function) into one canonical interface.

pub mod resolve;
pub mod spec;

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::query::{Query, Relations};

pub use spec::SerializerSpec;

/// Output structure of every serialize operation.
pub type FieldMap = serde_json::Map<String, serde_json::Value>;

/// A shared, type-erased serializer. One instance may be attached to many
/// queries and drive many row batches; it holds no per-call state.
pub type ArcSerializer<Q> = Arc<dyn Serializer<Q> + Send + Sync>;

/// A plain one-argument row transformation.
pub type TransformFn<Q> = Arc<dyn Fn(&<Q as Query>::Row) -> FieldMap + Send + Sync>;

/// A relation-name list in literal or computed form.
///
/// The computed form is invoked with no arguments at query-rewrite time and
/// must behave identically to supplying the same list literally.
#[derive(Clone)]
pub enum RelationSpec {
    Literal(Relations),
    Computed(Arc<dyn Fn() -> Relations + Send + Sync>),
}

impl RelationSpec {
    pub fn resolve(&self) -> Relations {
        match self {
            Self::Literal(names) => names.clone(),
            Self::Computed(f) => f(),
        }
    }
}

impl core::fmt::Debug for RelationSpec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Literal(names) => f.debug_tuple("Literal").field(names).finish(),
            Self::Computed(_) => f.debug_tuple("Computed").finish(),
        }
    }
}

/// A serialization strategy for rows of query type `Q`.
///
/// Implementors override the extension points; the surrounding protocol
/// (directive application order, extras recursion, row binding) lives in
/// [`SerializerExt`] and cannot be overridden.
pub trait Serializer<Q: Query> {
    /// Relations to load via joins in the same round-trip. Default: none.
    fn eager_joins(&self) -> Option<Relations> {
        None
    }

    /// Relations to load in one extra batched round-trip. Default: none.
    fn batched_prefetches(&self) -> Option<Relations> {
        None
    }

    /// Arbitrary query rewrite hook, applied after the join and prefetch
    /// directives. Default: identity. Must not execute the query.
    fn prepare_queryset(&self, query: Q) -> Q {
        query
    }

    /// Bulk hook over all materialized rows, before any caller sees them.
    ///
    /// The place to attach bulk-fetched auxiliary data (one cache lookup
    /// covering every row, etc.). Runs after batched prefetches have
    /// resolved. Default: no-op.
    fn prepare_objects(&self, _rows: &mut [Q::Row]) {}

    /// Converts one row to its own fields. The mandatory extension point.
    ///
    /// Must not trigger any lazy data access that `eager_joins`,
    /// `batched_prefetches`, or `prepare_objects` did not already satisfy;
    /// anything slow here runs once per row and reintroduces N+1.
    fn serialize_object(&self, _row: &Q::Row) -> Result<FieldMap> {
        Err(Error::MissingImplementation(core::any::type_name::<Self>()))
    }

    /// Ordered child serializers whose output merges into this one's.
    /// Default: none.
    fn extras(&self) -> &[(String, ArcSerializer<Q>)] {
        &[]
    }
}

/// The serializer-attachment protocol, provided for every [`Serializer`].
///
/// Blanket-implemented with no overridable methods, so the ordering
/// invariants hold for every strategy: joins, then prefetches, then the
/// custom rewrite, then extras; bulk hooks before binding; extras merged in
/// declared order with later entries winning key collisions.
pub trait SerializerExt<Q: Query>: Serializer<Q> {
    /// Applies every relation-loading directive this serializer (and its
    /// extras, recursively) needs. Never executes the query.
    fn prepare_query(&self, query: Q) -> Q {
        let mut query = query;
        if let Some(joins) = self.eager_joins() {
            query = query.with_eager_join(&joins);
        }
        if let Some(prefetches) = self.batched_prefetches() {
            query = query.with_batched_prefetch(&prefetches);
        }
        query = self.prepare_queryset(query);
        for (_, extra) in self.extras() {
            query = extra.prepare_query(query);
        }
        query
    }

    /// Runs the bulk preparation pass: this serializer's `prepare_objects`,
    /// then every extra's, in declared order, all over the same row list.
    ///
    /// Called exactly once per materialization, after batched prefetches
    /// have resolved and before any caller observes the rows.
    fn prepare_rows(&self, rows: &mut [Q::Row]) {
        self.prepare_objects(rows);
        for (_, extra) in self.extras() {
            extra.prepare_rows(rows);
        }
    }

    /// Serializes one row: own fields first, then each extra's output merged
    /// in declared order. An extra always wins a key collision against the
    /// parent, and later extras win against earlier ones.
    fn serialize_one(&self, row: &Q::Row) -> Result<FieldMap> {
        let mut out = self.serialize_object(row)?;
        for (_, extra) in self.extras() {
            let fields = extra.serialize_one(row)?;
            out.extend(fields);
        }
        Ok(out)
    }

    /// Lazily serializes a row slice, one output per row, in input order.
    fn serialize_many<'a>(
        &'a self,
        rows: &'a [Q::Row],
    ) -> impl Iterator<Item = Result<FieldMap>> + 'a {
        rows.iter().map(move |row| self.serialize_one(row))
    }
}

impl<Q: Query, S: Serializer<Q> + ?Sized> SerializerExt<Q> for S {}
