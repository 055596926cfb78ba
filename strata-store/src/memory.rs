//! In-memory reference backends
//!
//! Reference implementations of [`DocumentStore`] and [`TextCache`] used
//! by tests and embedders that do not need an external store. Both track
//! operation counters so tests can assert which side of the cache-aside
//! protocol actually served a read.

use crate::clock::{Clock, SystemClock};
use crate::traits::{DocumentStore, Filter, RecordCursor, TextCache};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::RwLock;
use std::time::Duration;
use strata_core::{DocumentId, RawRecord, StoreError, StrataResult, Timestamp};

/// Operation counters for [`MemoryStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub point_lookups: u64,
    pub field_lookups: u64,
    pub queries: u64,
    pub writes: u64,
    pub inserts: u64,
}

/// In-memory document store.
pub struct MemoryStore {
    records: RwLock<BTreeMap<DocumentId, BTreeMap<String, Value>>>,
    indexes: RwLock<BTreeSet<String>>,
    stats: RwLock<StoreStats>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            indexes: RwLock::new(BTreeSet::new()),
            stats: RwLock::new(StoreStats::default()),
        }
    }

    pub fn stats(&self) -> StoreStats {
        self.stats.read().expect("stats lock poisoned").clone()
    }

    /// Whether an index was ensured on the named field.
    pub fn has_index(&self, field: &str) -> bool {
        self.indexes
            .read()
            .expect("index lock poisoned")
            .contains(field)
    }

    fn matches(fields: &BTreeMap<String, Value>, filter: &Filter) -> bool {
        filter
            .iter()
            .all(|(name, value)| fields.get(name) == Some(value))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_by_id(&self, id: &DocumentId) -> StrataResult<Option<RawRecord>> {
        self.stats.write().expect("stats lock poisoned").point_lookups += 1;
        let records = self.records.read().expect("records lock poisoned");
        Ok(records
            .get(id)
            .map(|fields| RawRecord::new(id.clone(), fields.clone())))
    }

    async fn find_by_field(&self, field: &str, value: &Value) -> StrataResult<Option<RawRecord>> {
        self.stats.write().expect("stats lock poisoned").field_lookups += 1;
        let records = self.records.read().expect("records lock poisoned");
        Ok(records
            .iter()
            .find(|(_, fields)| fields.get(field) == Some(value))
            .map(|(id, fields)| RawRecord::new(id.clone(), fields.clone())))
    }

    async fn query(&self, filter: Filter) -> StrataResult<Box<dyn RecordCursor>> {
        self.stats.write().expect("stats lock poisoned").queries += 1;
        let records = self.records.read().expect("records lock poisoned");
        let matched: VecDeque<RawRecord> = records
            .iter()
            .filter(|(_, fields)| Self::matches(fields, &filter))
            .map(|(id, fields)| RawRecord::new(id.clone(), fields.clone()))
            .collect();
        Ok(Box::new(MemoryCursor::new(matched)))
    }

    async fn set_fields(
        &self,
        id: &DocumentId,
        fields: BTreeMap<String, Value>,
    ) -> StrataResult<()> {
        self.stats.write().expect("stats lock poisoned").writes += 1;
        let mut records = self.records.write().expect("records lock poisoned");
        let existing = records.get_mut(id).ok_or_else(|| StoreError::Backend {
            reason: format!("unknown identifier {id}"),
        })?;
        existing.extend(fields);
        Ok(())
    }

    async fn insert(&self, fields: BTreeMap<String, Value>) -> StrataResult<DocumentId> {
        self.stats.write().expect("stats lock poisoned").inserts += 1;
        let id = DocumentId::generate();
        self.records
            .write()
            .expect("records lock poisoned")
            .insert(id.clone(), fields);
        Ok(id)
    }

    async fn ensure_index(&self, field: &str) -> StrataResult<()> {
        self.indexes
            .write()
            .expect("index lock poisoned")
            .insert(field.to_string());
        Ok(())
    }
}

/// Cursor over a materialized result set.
pub struct MemoryCursor {
    queue: VecDeque<RawRecord>,
}

impl MemoryCursor {
    pub fn new(queue: VecDeque<RawRecord>) -> Self {
        Self { queue }
    }
}

#[async_trait]
impl RecordCursor for MemoryCursor {
    fn has_more(&self) -> bool {
        !self.queue.is_empty()
    }

    async fn advance(&mut self) -> StrataResult<Option<RawRecord>> {
        Ok(self.queue.pop_front())
    }
}

/// Hit/miss counters for [`MemoryCache`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

struct CacheEntry {
    value: String,
    expires_at: Option<Timestamp>,
}

/// In-memory text cache with per-entry TTL deadlines.
///
/// Expiry is evaluated lazily against the injected clock: an entry past
/// its deadline reads as absent and is dropped on the next `get`.
pub struct MemoryCache<K: Clock = SystemClock> {
    entries: RwLock<HashMap<String, CacheEntry>>,
    stats: RwLock<CacheStats>,
    clock: K,
}

impl MemoryCache<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for MemoryCache<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clock> MemoryCache<K> {
    pub fn with_clock(clock: K) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            stats: RwLock::new(CacheStats::default()),
            clock,
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.read().expect("stats lock poisoned").clone()
    }

    /// Number of live entries, expired ones included until they are read.
    pub fn len(&self) -> usize {
        self.entries.read().expect("entries lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl<K: Clock> TextCache for MemoryCache<K> {
    async fn get(&self, key: &str) -> StrataResult<Option<String>> {
        let now = self.clock.now();
        let mut entries = self.entries.write().expect("entries lock poisoned");
        let mut stats = self.stats.write().expect("stats lock poisoned");

        match entries.get(key) {
            Some(entry) if entry.expires_at.map_or(true, |deadline| now < deadline) => {
                stats.hits += 1;
                Ok(Some(entry.value.clone()))
            }
            Some(_) => {
                entries.remove(key);
                stats.misses += 1;
                Ok(None)
            }
            None => {
                stats.misses += 1;
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: &str) -> StrataResult<()> {
        self.entries.write().expect("entries lock poisoned").insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at: None,
            },
        );
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> StrataResult<()> {
        let deadline = self.clock.now() + chrono::Duration::from_std(ttl).unwrap_or_default();
        if let Some(entry) = self
            .entries
            .write()
            .expect("entries lock poisoned")
            .get_mut(key)
        {
            entry.expires_at = Some(deadline);
        }
        Ok(())
    }
}
