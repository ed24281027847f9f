//! Error definitions for all `svcgen` generation stages.

use thiserror::Error;

#[derive(Debug, Error)]
/// Top-level error type returned by public APIs.
pub enum SvcgenError {
    /// A lookup table (type catalog, reserved-identifier list) failed to
    /// load or parse. Fatal to the whole run.
    #[error("config error: {0}")]
    ConfigInvalid(String),
    /// The structural model is inconsistent: inheritance cycle, duplicate
    /// names, or an attribute marked both array and list.
    #[error("schema error: {0}")]
    SchemaInvalid(String),
    /// An attribute's declared type matches neither a scalar nor a known
    /// structure. Fatal for that one structure, recoverable for the run.
    #[error("unresolved type '{type_name}' for attribute '{structure}.{attribute}'")]
    UnresolvedType {
        structure: String,
        attribute: String,
        type_name: String,
    },
    /// Filesystem I/O error from callers that load catalogs from disk.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
