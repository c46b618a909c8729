//! `SerializableQuerySet` — the query wrapped with its attached serializer.

use std::sync::Arc;

use crate::query::Query;
use crate::row::{BoundRow, bind_rows};
use crate::serializer::resolve::SerializerRef;
use crate::serializer::{ArcSerializer, SerializerExt, SerializerSpec};
use crate::{Result, qserializer_trace_attach, qserializer_trace_materialize};

/// A query carrying at most one attached serialization strategy.
///
/// Without an attachment this behaves exactly like the bare query: fetching
/// runs no hooks and yields unbound rows. Attaching rewrites the query with
/// the strategy's relation-loading directives up front; fetching then runs
/// one bulk preparation pass over the materialized rows and binds each of
/// them, so per-row serialization costs zero further queries.
///
/// Querysets are values: derivations and attachment consume `self` and
/// return the updated wrapper, threading the attachment through every
/// pre-execution transformation.
#[derive(Clone)]
pub struct SerializableQuerySet<Q: Query> {
    query: Q,
    serializer: Option<ArcSerializer<Q>>,
    default_serializer: Option<ArcSerializer<Q>>,
}

impl<Q: Query> SerializableQuerySet<Q> {
    pub fn new(query: Q) -> Self {
        Self {
            query,
            serializer: None,
            default_serializer: None,
        }
    }

    /// Like [`new`](Self::new), with a default strategy for
    /// [`to_serialize_default`](Self::to_serialize_default).
    ///
    /// The default resolves once, here; it is meant to be process-wide
    /// configuration built at setup and shared read-only afterwards.
    pub fn with_default(query: Q, default: impl Into<SerializerRef<Q>>) -> Self {
        Self {
            query,
            serializer: None,
            default_serializer: Some(default.into().resolve()),
        }
    }

    pub fn query(&self) -> &Q {
        &self.query
    }

    /// The attached serializer, or `None` when nothing is attached.
    pub fn serializer(&self) -> Option<&ArcSerializer<Q>> {
        self.serializer.as_ref()
    }

    /// Attaches a serialization strategy and rewrites the query with its
    /// relation-loading directives.
    ///
    /// Re-attaching replaces the previous strategy. Chaining continues from
    /// the returned wrapper; the query inside it is the rewritten one.
    pub fn to_serialize(mut self, serializer: impl Into<SerializerRef<Q>>) -> Self {
        let serializer = serializer.into().resolve();
        qserializer_trace_attach!();
        self.query = serializer.prepare_query(self.query);
        self.serializer = Some(serializer);
        self
    }

    /// Attaches the configured default strategy.
    ///
    /// When no default was configured, a bare [`SerializerSpec`] is used:
    /// the query runs unmodified and rows fail with `MissingImplementation`
    /// only if something actually tries to serialize them.
    pub fn to_serialize_default(self) -> Self {
        let default: ArcSerializer<Q> = match &self.default_serializer {
            Some(default) => Arc::clone(default),
            None => Arc::new(SerializerSpec::new()),
        };
        self.to_serialize(SerializerRef::Instance(default))
    }

    /// Applies a non-executing engine derivation (filter, order, slice),
    /// carrying the attached serializer onto the derived query.
    pub fn derive(mut self, f: impl FnOnce(Q) -> Q) -> Self {
        self.query = f(self.query);
        self
    }

    /// Materializes the query.
    ///
    /// With a serializer attached, the bulk preparation pass runs exactly
    /// once here — after the engine has resolved batched prefetches, before
    /// any caller sees a row — and every row comes back bound. Without one,
    /// this is a plain fetch of unbound rows.
    pub fn fetch(&self) -> Result<Vec<BoundRow<Q>>> {
        let rows = self.query.fetch()?;
        qserializer_trace_materialize!(rows.len(), self.serializer.is_some());
        Ok(match &self.serializer {
            Some(serializer) => bind_rows(serializer, rows),
            None => rows.into_iter().map(BoundRow::unbound).collect(),
        })
    }

    /// Materializes and returns the first row, if any.
    pub fn first(&self) -> Result<Option<BoundRow<Q>>> {
        Ok(self.fetch()?.into_iter().next())
    }
}
