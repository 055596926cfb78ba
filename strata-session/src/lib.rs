//! Strata Session - Token-Issuing Authentication
//!
//! Issues opaque session tokens backed by the cache, falling back to
//! credential verification against the store. Reuses the same store and
//! cache abstractions as the document model; tokens live only in the
//! cache under the owning username and age out by TTL.

pub mod credentials;
pub mod manager;

pub use credentials::{hash_password, verify_password};
pub use manager::{
    load_key_material, LoginOutcome, SessionConfig, SessionManager, SessionManagerBuilder,
};
