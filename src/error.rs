use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The mandatory `serialize_object` override was not supplied.
    ///
    /// Carries the concrete serializer type name. Raised when a row's
    /// serialize is invoked, not when the serializer is attached.
    #[error("serializer `{0}` does not implement serialize_object")]
    MissingImplementation(&'static str),

    /// A row was never materialized through a queryset with an attached
    /// serializer, so it has nothing to serialize with.
    #[error("row has no bound serializer")]
    UnboundRow,

    /// An extras activation list named a field that was never declared.
    #[error("unknown extra field: {0}")]
    UnknownExtra(String),

    /// Engine failure during materialization or batched prefetch.
    #[error("execution error: {0}")]
    Execution(String),

    /// Error converting a row into a JSON value.
    #[error("mapping error: {0}")]
    Mapping(String),
}

/// Result type for serialization operations
pub type Result<T> = core::result::Result<T, Error>;
