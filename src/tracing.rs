//! Tracing utilities for serializer attachment and materialization.
//!
//! Enable the `tracing` feature to emit events via the `tracing` crate.
//! These macros no-op when the feature is disabled, avoiding `#[cfg]`
//! boilerplate at every call site.

/// Emit a debug-level event when a serializer is attached to a queryset.
#[macro_export]
macro_rules! qserializer_trace_attach {
    () => {
        #[cfg(feature = "tracing")]
        tracing::debug!("qserializer.attach");
    };
}

/// Emit a debug-level event at materialization, with the row count and
/// whether a serializer is attached.
///
/// ```ignore
/// qserializer_trace_materialize!(rows.len(), true);
/// ```
#[macro_export]
macro_rules! qserializer_trace_materialize {
    ($rows:expr, $bound:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(rows = $rows, bound = $bound, "qserializer.materialize");
    };
}
