//! `SerializerRef` — normalizes caller-supplied serializer shapes.
//!
//! Callers hand a query one of three things: a constructed strategy, a
//! factory standing in for "the strategy type itself", or a bare transform
//! function. A closed union resolved once at attachment keeps that
//! polymorphism out of the core protocol.

use std::sync::Arc;

use crate::query::Query;

use super::spec::SerializerSpec;
use super::{ArcSerializer, FieldMap, Serializer, TransformFn};

/// A resolvable reference to a serialization strategy.
///
/// Resolution happens exactly once, at attachment: the resolved instance is
/// the instance bound to every row of that query, never a fresh one per call.
pub enum SerializerRef<Q: Query> {
    /// An already-constructed strategy.
    Instance(ArcSerializer<Q>),
    /// A zero-argument constructor for a strategy.
    Factory(Arc<dyn Fn() -> ArcSerializer<Q> + Send + Sync>),
    /// A plain one-argument transform, wrapped into a strategy that declares
    /// no relation loading and no extras.
    Transform(TransformFn<Q>),
}

impl<Q: Query> SerializerRef<Q> {
    /// Wraps a constructed strategy.
    pub fn instance(serializer: impl Serializer<Q> + Send + Sync + 'static) -> Self {
        Self::Instance(Arc::new(serializer))
    }

    /// Wraps a strategy constructor.
    pub fn factory(f: impl Fn() -> ArcSerializer<Q> + Send + Sync + 'static) -> Self {
        Self::Factory(Arc::new(f))
    }

    /// Wraps a plain transform function.
    pub fn transform(f: impl Fn(&Q::Row) -> FieldMap + Send + Sync + 'static) -> Self {
        Self::Transform(Arc::new(f))
    }

    /// Produces the canonical strategy instance.
    pub fn resolve(self) -> ArcSerializer<Q> {
        match self {
            Self::Instance(serializer) => serializer,
            Self::Factory(f) => f(),
            Self::Transform(f) => Arc::new(SerializerSpec::new().transform_arc(f)),
        }
    }
}

impl<Q: Query> Clone for SerializerRef<Q> {
    fn clone(&self) -> Self {
        match self {
            Self::Instance(s) => Self::Instance(Arc::clone(s)),
            Self::Factory(f) => Self::Factory(Arc::clone(f)),
            Self::Transform(f) => Self::Transform(Arc::clone(f)),
        }
    }
}

impl<Q: Query> From<ArcSerializer<Q>> for SerializerRef<Q> {
    fn from(serializer: ArcSerializer<Q>) -> Self {
        Self::Instance(serializer)
    }
}

impl<Q: Query> From<SerializerSpec<Q>> for SerializerRef<Q> {
    fn from(spec: SerializerSpec<Q>) -> Self {
        Self::Instance(Arc::new(spec))
    }
}
