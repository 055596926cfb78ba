//! Strata Model - Schema-Validated Documents with Cache-Aside Lookup
//!
//! The document model sits between a persistent document store and a
//! volatile text cache. Reads go cache-first (`query_by_id`), writes are
//! partial saves of exactly the dirty fields, and every construction path
//! runs the schema's `required ⊆ present ⊆ admissible` validation.
//!
//! All shared configuration lives in an explicit [`ModelContext`] built
//! once at startup and passed by reference; there is no process-wide
//! mutable class state and therefore no init-ordering hazard.

pub mod context;
pub mod cursor;
pub mod document;

pub use context::{ModelConfig, ModelContext, ModelContextBuilder};
pub use cursor::DocumentCursor;
pub use document::{Changeset, Document};
