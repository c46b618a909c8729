//! Engine boundary contract.
//!
//! The relational engine (query building, SQL generation, execution) is an
//! external collaborator. This module pins down the minimum surface the
//! serialization layer needs from it: two relation-loading rewrites and a
//! single materialization call.

use smallvec::SmallVec;

use crate::error::Result;

/// Relation-name list, stack-allocated in the common case.
pub type Relations = SmallVec<[String; 4]>;

/// Builds a [`Relations`] list from anything string-like.
///
/// ```ignore
/// relations(["company", "company__owner"])
/// ```
pub fn relations<I, S>(names: I) -> Relations
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(Into::into).collect()
}

/// A query value understood by the serialization layer.
///
/// Queries are owned, cloneable values: every rewrite consumes the query and
/// returns a new one, so derived queries never mutate their source. Rows are
/// owned, materialized records — relation data loaded by a rewrite lands in
/// row fields, and bulk-prepared auxiliary data is written there too.
pub trait Query: Clone + 'static {
    /// The materialized row type this query produces.
    type Row: 'static;

    /// Rewrites the query so the named relations are fetched in the same
    /// round-trip via joins.
    fn with_eager_join(self, relations: &Relations) -> Self;

    /// Rewrites the query so the named relations are fetched in one extra
    /// round-trip covering all result rows, rather than one per row.
    fn with_batched_prefetch(self, relations: &Relations) -> Self;

    /// Executes the query and returns its rows.
    ///
    /// This is the single materialization event: the engine must resolve the
    /// base query plus all batched prefetches before returning.
    fn fetch(&self) -> Result<Vec<Self::Row>>;
}
