//! Strata Store - Collaborator Traits and In-Memory Backends
//!
//! Defines the black-box abstractions the document model and session
//! manager are written against: the persistent document store, the
//! volatile text cache, and the geocoder. The actual production backends
//! (e.g. a MongoDB or Redis binding) live outside this workspace; the
//! in-memory implementations here are the reference used by tests and
//! embedders.
//!
//! This crate also owns the cache text codec: the bidirectional
//! conversion between the store's typed-identifier notation and the
//! cache's plain-text serialization format.

pub mod clock;
pub mod codec;
pub mod memory;
pub mod traits;

pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::{decode_record, encode_record};
pub use memory::{CacheStats, MemoryCache, MemoryCursor, MemoryStore, StoreStats};
pub use traits::{address_geometry, DocumentStore, Filter, Geocoder, RecordCursor, TextCache};
