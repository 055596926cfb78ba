//! Model context: build-once configuration and the cache-aside lookup
//!
//! [`ModelContext`] replaces mutable class-level globals with an explicit
//! object constructed once at startup: the store and cache handles, the
//! validated schema, and the tuning knobs. Because completeness is
//! checked by the builder, a context that exists is always safe to call.

use crate::cursor::DocumentCursor;
use crate::document::Document;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use strata_core::{
    ConfigError, DocumentId, FieldRegistry, Schema, SchemaDef, SchemaError, StrataResult,
};
use strata_store::{codec, DocumentStore, Filter, TextCache};
use tracing::debug;

/// Tuning knobs for the document model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    /// TTL attached to cache entries written by the on-miss populate.
    pub cache_ttl: Duration,
    /// Field the secondary index is ensured on at build time.
    pub index_field: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(24 * 3600),
            index_field: "city".to_string(),
        }
    }
}

impl ModelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_index_field(mut self, field: impl Into<String>) -> Self {
        self.index_field = field.into();
        self
    }
}

/// Shared, build-once state for one document type: store and cache
/// handles plus the validated schema.
pub struct ModelContext<S, C> {
    store: Arc<S>,
    cache: Arc<C>,
    schema: Schema,
    config: ModelConfig,
}

impl<S, C> std::fmt::Debug for ModelContext<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelContext")
            .field("schema", &self.schema)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S, C> ModelContext<S, C>
where
    S: DocumentStore,
    C: TextCache,
{
    pub fn builder() -> ModelContextBuilder<S, C> {
        ModelContextBuilder::new()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Fetch a document by identifier, cache first.
    ///
    /// On a hit the cached text is decoded and validated into a document
    /// without touching the store. On a miss the store is read; absence
    /// returns `Ok(None)` and writes nothing, presence populates the
    /// cache under the identifier key with the configured TTL.
    ///
    /// The on-miss populate is the only write path to the cache: entries
    /// are never updated or invalidated afterwards and age out by TTL
    /// alone. Concurrent lookups may populate redundantly with identical
    /// content, which needs no locking.
    pub async fn query_by_id(&self, id: &DocumentId) -> StrataResult<Option<Document>> {
        if let Some(text) = self.cache.get(id.as_str()).await? {
            debug!(%id, "cache hit");
            let record = codec::decode_record(&text)?;
            return Ok(Some(Document::from_record(&self.schema, record)?));
        }

        let Some(record) = self.store.find_by_id(id).await? else {
            debug!(%id, "not found");
            return Ok(None);
        };

        debug!(%id, "cache miss, populating");
        let text = codec::encode_record(&record);
        self.cache.set(id.as_str(), &text).await?;
        self.cache.expire(id.as_str(), self.config.cache_ttl).await?;

        Ok(Some(Document::from_record(&self.schema, record)?))
    }

    /// Persist exactly the document's dirty fields, then mark it clean.
    ///
    /// An empty changeset still issues the (no-op) write. The cache is
    /// deliberately left alone: a cached copy stays stale until its TTL
    /// lapses, bounded by `cache_ttl`.
    pub async fn save(&self, document: &mut Document) -> StrataResult<()> {
        let changeset = document.changeset();
        debug!(id = %document.id(), fields = changeset.len(), "saving changeset");
        self.store
            .set_fields(document.id(), changeset.into_fields())
            .await?;
        document.mark_clean();
        Ok(())
    }

    /// Create a document; the store assigns the identifier.
    pub async fn insert(
        &self,
        attributes: BTreeMap<String, serde_json::Value>,
    ) -> StrataResult<Document> {
        self.schema
            .validate_construction(attributes.keys().map(String::as_str))?;
        let id = self.store.insert(attributes.clone()).await?;
        debug!(%id, "inserted document");
        Ok(Document::new(&self.schema, id, attributes)?)
    }

    /// Filtered query over the store, yielding validated documents.
    pub async fn find(&self, filter: Filter) -> StrataResult<DocumentCursor> {
        let inner = self.store.query(filter).await?;
        Ok(DocumentCursor::new(self.schema.clone(), inner))
    }
}

/// Builder for [`ModelContext`]. Fails at build time when a collaborator
/// or the schema source is missing.
pub struct ModelContextBuilder<S, C> {
    store: Option<Arc<S>>,
    cache: Option<Arc<C>>,
    schema_def: Option<SchemaDef>,
    registry: FieldRegistry,
    config: ModelConfig,
}

impl<S, C> ModelContextBuilder<S, C>
where
    S: DocumentStore,
    C: TextCache,
{
    pub fn new() -> Self {
        Self {
            store: None,
            cache: None,
            schema_def: None,
            registry: FieldRegistry::default(),
            config: ModelConfig::default(),
        }
    }

    pub fn store(mut self, store: Arc<S>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn cache(mut self, cache: Arc<C>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Provide the schema definition directly.
    pub fn schema_def(mut self, def: SchemaDef) -> Self {
        self.schema_def = Some(def);
        self
    }

    /// Load the schema definition from an external JSON document with
    /// `required_vars` and `admissible_vars` fields.
    pub fn schema_path(mut self, path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| SchemaError::Definition {
            reason: format!("{}: {e}", path.display()),
        })?;
        let def: SchemaDef =
            serde_json::from_str(&text).map_err(|e| SchemaError::Definition {
                reason: format!("{}: {e}", path.display()),
            })?;
        self.schema_def = Some(def);
        Ok(self)
    }

    /// Registry of known field names the schema is validated against.
    pub fn registry(mut self, registry: FieldRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(mut self, config: ModelConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate the schema against the registry, ensure the secondary
    /// index, and assemble the context.
    pub async fn build(self) -> StrataResult<ModelContext<S, C>> {
        let store = self
            .store
            .ok_or(ConfigError::UninitializedModel { field: "store" })?;
        let cache = self
            .cache
            .ok_or(ConfigError::UninitializedModel { field: "cache" })?;
        let def = self
            .schema_def
            .ok_or(ConfigError::UninitializedModel { field: "schema" })?;

        let schema = Schema::from_def(def, &self.registry)?;
        store.ensure_index(&self.config.index_field).await?;

        Ok(ModelContext {
            store,
            cache,
            schema,
            config: self.config,
        })
    }
}

impl<S, C> Default for ModelContextBuilder<S, C>
where
    S: DocumentStore,
    C: TextCache,
{
    fn default() -> Self {
        Self::new()
    }
}
