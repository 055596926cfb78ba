//! Black-box collaborator traits
//!
//! The persistent store, the cache, and the geocoder are external
//! collaborators. These traits pin down exactly what Strata relies on;
//! everything else about the backends is out of scope.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use strata_core::{DocumentId, GeoJson, GeoPoint, RawRecord, StrataResult};

/// Equality filter for store queries. An empty filter matches everything.
pub type Filter = BTreeMap<String, Value>;

/// Persistent document store contract.
///
/// Point lookups by identifier, filtered queries returning a cursor,
/// partial field updates, and secondary index creation. The store assigns
/// identifiers at insert time; per-document update atomicity is the
/// store's responsibility, not Strata's.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Point lookup by identifier. Absence is `Ok(None)`, not an error.
    async fn find_by_id(&self, id: &DocumentId) -> StrataResult<Option<RawRecord>>;

    /// First record whose named field equals the given value.
    async fn find_by_field(&self, field: &str, value: &Value) -> StrataResult<Option<RawRecord>>;

    /// Filtered query returning an iterable cursor of raw records.
    async fn query(&self, filter: Filter) -> StrataResult<Box<dyn RecordCursor>>;

    /// Set exactly these fields on the identified document, leaving every
    /// other field untouched. An empty field map is a valid no-op write.
    async fn set_fields(
        &self,
        id: &DocumentId,
        fields: BTreeMap<String, Value>,
    ) -> StrataResult<()>;

    /// Create a document; the store assigns and returns its identifier.
    async fn insert(&self, fields: BTreeMap<String, Value>) -> StrataResult<DocumentId>;

    /// Ensure a secondary index exists on the named field. Idempotent.
    async fn ensure_index(&self, field: &str) -> StrataResult<()>;
}

/// Cursor over a multi-document query result.
#[async_trait]
pub trait RecordCursor: Send {
    /// True iff unread records remain. Must not advance the cursor.
    fn has_more(&self) -> bool;

    /// Take the next raw record, or `None` once the result set is consumed.
    async fn advance(&mut self) -> StrataResult<Option<RawRecord>>;
}

/// Volatile text cache contract.
///
/// Keys and values are plain strings. An entry past its TTL reads as
/// absent; `set` alone stores without expiry until `expire` attaches one.
#[async_trait]
pub trait TextCache: Send + Sync {
    async fn get(&self, key: &str) -> StrataResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> StrataResult<()>;

    async fn expire(&self, key: &str, ttl: Duration) -> StrataResult<()>;
}

/// Geocoding collaborator: free-text address to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn locate(&self, address: &str) -> StrataResult<GeoPoint>;
}

/// Wrap a geocoded address into the geometry container stored with
/// documents. A pure pass-through call: no caching, no retry.
pub async fn address_geometry<G>(geocoder: &G, address: &str) -> StrataResult<GeoJson>
where
    G: Geocoder + ?Sized,
{
    let point = geocoder.locate(address).await?;
    Ok(GeoJson::collection_of(point))
}
