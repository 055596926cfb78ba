//! Identity types for Strata entities

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Opaque unique key assigned by the persistent store when a document is
/// created. Immutable once set; the store is the only party that mints them.
///
/// The store's native notation for an identifier is the tagged form
/// `ObjectId('<key>')`; the cache codec in `strata-store` converts between
/// that notation and the plain key held here.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Wrap a store-assigned key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Mint a fresh key. Called by store implementations at insert time;
    /// callers never generate identifiers themselves.
    ///
    /// UUIDv7 keys are timestamp-sortable, so insertion order is roughly
    /// recoverable from the key alone.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

/// Opaque authentication token issued on a successful login.
///
/// A token is a random capability string: it carries no claims and is
/// meaningful only as a cache key lookup. Tokens live in the cache under
/// the owning username and expire by TTL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Generate a fresh random token.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an existing token string (e.g. one read back from the cache).
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
