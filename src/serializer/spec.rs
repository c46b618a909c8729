//! `SerializerSpec` — the configurable, build-from-options serializer.

use std::sync::Arc;

use hashbrown::HashSet;

use crate::error::{Error, Result};
use crate::query::{Query, Relations, relations};

use super::resolve::SerializerRef;
use super::{ArcSerializer, FieldMap, RelationSpec, Serializer, TransformFn};

type BulkFn<Q> = Arc<dyn Fn(&mut [<Q as Query>::Row]) + Send + Sync>;

/// A serializer assembled from options instead of a dedicated impl.
///
/// Covers the common case where a strategy is just "load these relations,
/// run this transform, merge these extras" and a named type would be noise.
/// Everything is optional; an unset transform fails with
/// [`Error::MissingImplementation`] the first time a row is serialized,
/// which makes a bare `SerializerSpec::new()` a valid do-nothing default
/// for query preparation.
///
/// Stateless across rows and immutable once built; share it freely via
/// [`ArcSerializer`].
#[derive(Clone)]
pub struct SerializerSpec<Q: Query> {
    eager_joins: Option<RelationSpec>,
    batched_prefetches: Option<RelationSpec>,
    transform: Option<TransformFn<Q>>,
    bulk: Option<BulkFn<Q>>,
    extras: Vec<(String, ArcSerializer<Q>)>,
}

impl<Q: Query> SerializerSpec<Q> {
    pub fn new() -> Self {
        Self {
            eager_joins: None,
            batched_prefetches: None,
            transform: None,
            bulk: None,
            extras: Vec::new(),
        }
    }

    /// Declares relations to eager-join, as a literal list.
    pub fn eager_joins<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.eager_joins = Some(RelationSpec::Literal(relations(names)));
        self
    }

    /// Declares relations to eager-join, computed at query-rewrite time.
    pub fn eager_joins_with(mut self, f: impl Fn() -> Relations + Send + Sync + 'static) -> Self {
        self.eager_joins = Some(RelationSpec::Computed(Arc::new(f)));
        self
    }

    /// Declares relations to batch-prefetch, as a literal list.
    pub fn batched_prefetches<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.batched_prefetches = Some(RelationSpec::Literal(relations(names)));
        self
    }

    /// Declares relations to batch-prefetch, computed at query-rewrite time.
    pub fn batched_prefetches_with(
        mut self,
        f: impl Fn() -> Relations + Send + Sync + 'static,
    ) -> Self {
        self.batched_prefetches = Some(RelationSpec::Computed(Arc::new(f)));
        self
    }

    /// Sets the per-row transform. Required before any row can serialize.
    pub fn transform(mut self, f: impl Fn(&Q::Row) -> FieldMap + Send + Sync + 'static) -> Self {
        self.transform = Some(Arc::new(f));
        self
    }

    pub(crate) fn transform_arc(mut self, f: TransformFn<Q>) -> Self {
        self.transform = Some(f);
        self
    }

    /// Sets the bulk hook run once over every materialized row.
    pub fn prepare_with(mut self, f: impl Fn(&mut [Q::Row]) + Send + Sync + 'static) -> Self {
        self.bulk = Some(Arc::new(f));
        self
    }

    /// Declares an extra: a named child serializer whose output merges into
    /// (and overrides key collisions with) this serializer's own fields.
    ///
    /// Extras apply in declaration order. Re-declaring a name replaces the
    /// child in place, keeping the original position.
    pub fn extra(mut self, name: impl Into<String>, child: impl Into<SerializerRef<Q>>) -> Self {
        let name = name.into();
        let resolved = child.into().resolve();
        match self.extras.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = resolved,
            None => self.extras.push((name, resolved)),
        }
        self
    }

    /// Re-instantiates this spec with only the named extras active.
    ///
    /// Declaration order governs merge precedence regardless of the order
    /// (or duplication) of `names`; the activation list only selects
    /// membership. Naming an undeclared extra is a configuration error,
    /// surfaced here rather than at serialization time.
    pub fn select_extras<I, S>(&self, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<S> = names.into_iter().collect();
        let requested: HashSet<&str> = names.iter().map(|s| s.as_ref()).collect();
        for name in &requested {
            if !self.extras.iter().any(|(n, _)| n == name) {
                return Err(Error::UnknownExtra((*name).to_string()));
            }
        }
        let mut selected = self.clone();
        selected
            .extras
            .retain(|(n, _)| requested.contains(n.as_str()));
        Ok(selected)
    }
}

impl<Q: Query> core::fmt::Debug for SerializerSpec<Q> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SerializerSpec")
            .field("eager_joins", &self.eager_joins)
            .field("batched_prefetches", &self.batched_prefetches)
            .field("transform", &self.transform.is_some())
            .field("bulk", &self.bulk.is_some())
            .field(
                "extras",
                &self.extras.iter().map(|(n, _)| n).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<Q: Query> Default for SerializerSpec<Q> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Q: Query> Serializer<Q> for SerializerSpec<Q> {
    fn eager_joins(&self) -> Option<Relations> {
        self.eager_joins.as_ref().map(RelationSpec::resolve)
    }

    fn batched_prefetches(&self) -> Option<Relations> {
        self.batched_prefetches.as_ref().map(RelationSpec::resolve)
    }

    fn prepare_objects(&self, rows: &mut [Q::Row]) {
        if let Some(bulk) = &self.bulk {
            bulk(rows);
        }
    }

    fn serialize_object(&self, row: &Q::Row) -> Result<FieldMap> {
        match &self.transform {
            Some(f) => Ok(f(row)),
            None => Err(Error::MissingImplementation(core::any::type_name::<Self>())),
        }
    }

    fn extras(&self) -> &[(String, ArcSerializer<Q>)] {
        &self.extras
    }
}
