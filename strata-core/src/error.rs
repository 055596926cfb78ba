//! Error types for Strata operations

use thiserror::Error;

/// Schema validation errors.
///
/// Raised whenever a document's attribute set falls outside the
/// `required ⊆ present ⊆ admissible` bounds, or when a schema definition
/// itself is unacceptable. Violations are always surfaced, never
/// auto-corrected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Required fields missing: {missing:?}")]
    MissingRequired { missing: Vec<String> },

    #[error("Fields not admissible: {offending:?}")]
    NotAdmissible { offending: Vec<String> },

    #[error("Required fields not listed as admissible: {fields:?}")]
    RequiredNotAdmissible { fields: Vec<String> },

    #[error("Field name not in registry: {field}")]
    UnknownField { field: String },

    #[error("Schema definition unreadable: {reason}")]
    Definition { reason: String },
}

/// Persistent store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store backend error: {reason}")]
    Backend { reason: String },

    #[error("Malformed record: {reason}")]
    MalformedRecord { reason: String },

    #[error("Cursor exhausted: no more records in result set")]
    CursorExhausted,
}

/// Cache backend errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache backend error: {reason}")]
    Backend { reason: String },
}

/// Errors converting between the store's identifier notation and the
/// cache's plain-text serialization format.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("Cached text is not valid JSON: {reason}")]
    Malformed { reason: String },

    #[error("Cached text is not a JSON object")]
    NotAnObject,

    #[error("Cached record has no _id field")]
    MissingId,

    #[error("Identifier tag is malformed: {got}")]
    BadIdTag { got: String },
}

/// Session and authentication errors.
///
/// `UnknownUser` and `InvalidCredentials` are recoverable: the caller may
/// retry with different credentials. They stay distinguishable so callers
/// can present them differently; collapsing them into one generic failure
/// is a caller-side presentation choice.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Unknown user: {username}")]
    UnknownUser { username: String },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Key material unavailable at {path}: {reason}")]
    KeyMaterialUnavailable { path: String, reason: String },
}

/// Configuration errors raised when a context object is built without its
/// required collaborators. Moving these to construction time is what makes
/// a built context always safe to call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Model context incomplete: missing {field}")]
    UninitializedModel { field: &'static str },

    #[error("Session manager incomplete: missing {field}")]
    UninitializedSession { field: &'static str },
}

/// Master error type for all Strata errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StrataError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for Strata operations.
pub type StrataResult<T> = Result<T, StrataError>;

// =============================================================================
// TESTS
// =============================================================================
