//! Bound rows and batch serialization.
//!
//! Instead of installing a serialize callable onto row objects at runtime,
//! materialization returns [`BoundRow`] values pairing each row with a
//! reference to the serializer that prepared it. The row stays whatever type
//! the engine produced; the pairing is what makes it self-serializing.

use std::ops::Deref;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::query::Query;
use crate::serializer::{ArcSerializer, FieldMap, SerializerExt};

/// A materialized row, optionally paired with the serializer that bound it.
///
/// Unbound rows come from querysets without an attached serializer; calling
/// [`serialize`](BoundRow::serialize) on one is a caller error and returns
/// [`Error::UnboundRow`]. The binding captures the serializer and the row,
/// nothing else, so a `BoundRow` moves freely within the process.
pub struct BoundRow<Q: Query> {
    row: Q::Row,
    serializer: Option<ArcSerializer<Q>>,
}

impl<Q: Query> BoundRow<Q> {
    pub(crate) fn bound(row: Q::Row, serializer: ArcSerializer<Q>) -> Self {
        Self {
            row,
            serializer: Some(serializer),
        }
    }

    pub(crate) fn unbound(row: Q::Row) -> Self {
        Self {
            row,
            serializer: None,
        }
    }

    /// Serializes this row with its bound serializer. Issues no queries:
    /// everything the serializer needs was loaded at materialization.
    pub fn serialize(&self) -> Result<FieldMap> {
        match &self.serializer {
            Some(serializer) => serializer.serialize_one(&self.row),
            None => Err(Error::UnboundRow),
        }
    }

    /// The serializer this row was bound with, if any.
    pub fn serializer(&self) -> Option<&ArcSerializer<Q>> {
        self.serializer.as_ref()
    }

    pub fn row(&self) -> &Q::Row {
        &self.row
    }

    pub fn into_row(self) -> Q::Row {
        self.row
    }

    /// The raw row as a JSON value, independent of any serializer.
    pub fn row_value(&self) -> Result<serde_json::Value>
    where
        Q::Row: serde::Serialize,
    {
        serde_json::to_value(&self.row).map_err(|e| Error::Mapping(e.to_string()))
    }
}

impl<Q: Query> Deref for BoundRow<Q> {
    type Target = Q::Row;

    fn deref(&self) -> &Q::Row {
        &self.row
    }
}

impl<Q: Query> core::fmt::Debug for BoundRow<Q>
where
    Q::Row: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BoundRow")
            .field("row", &self.row)
            .field("bound", &self.serializer.is_some())
            .finish()
    }
}

impl<Q: Query> Clone for BoundRow<Q>
where
    Q::Row: Clone,
{
    fn clone(&self) -> Self {
        Self {
            row: self.row.clone(),
            serializer: self.serializer.clone(),
        }
    }
}

/// Runs the bulk preparation pass and binds every row to `serializer`.
pub(crate) fn bind_rows<Q: Query>(
    serializer: &ArcSerializer<Q>,
    mut rows: Vec<Q::Row>,
) -> Vec<BoundRow<Q>> {
    serializer.prepare_rows(&mut rows);
    rows.into_iter()
        .map(|row| BoundRow::bound(row, Arc::clone(serializer)))
        .collect()
}

/// Serializes a uniformly-bound row list with the first row's serializer.
///
/// An empty slice yields an empty iterator. Every row is expected to carry
/// the same binding; mixing rows from different attachments is a caller
/// error and produces field sets consistent with the first row's serializer
/// only. If the first row is unbound, every item is [`Error::UnboundRow`].
pub fn serialize<Q: Query>(rows: &[BoundRow<Q>]) -> Serialized<'_, Q> {
    Serialized {
        serializer: rows.first().and_then(|row| row.serializer.clone()),
        rows: rows.iter(),
    }
}

/// Lazy iterator over serialized rows, in input order. See [`serialize`].
pub struct Serialized<'a, Q: Query> {
    serializer: Option<ArcSerializer<Q>>,
    rows: core::slice::Iter<'a, BoundRow<Q>>,
}

impl<'a, Q: Query> Iterator for Serialized<'a, Q> {
    type Item = Result<FieldMap>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.next()?;
        Some(match &self.serializer {
            Some(serializer) => serializer.serialize_one(&row.row),
            None => Err(Error::UnboundRow),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl<'a, Q: Query> ExactSizeIterator for Serialized<'a, Q> {}

impl<'a, Q: Query> core::iter::FusedIterator for Serialized<'a, Q> {}
