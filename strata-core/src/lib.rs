//! Strata Core - Data Types
//!
//! Pure data structures with no behavior beyond validation. All other
//! crates depend on this. This crate contains ONLY data types and the
//! error taxonomy - no I/O, no business logic.

pub mod error;
pub mod geo;
pub mod identity;
pub mod record;
pub mod schema;

pub use error::{
    CacheError, CodecError, ConfigError, SchemaError, SessionError, StoreError, StrataError,
    StrataResult,
};
pub use geo::{GeoJson, GeoPoint};
pub use identity::{DocumentId, SessionToken, Timestamp};
pub use record::{RawRecord, UserRecord};
pub use schema::{FieldRegistry, Schema, SchemaDef};
