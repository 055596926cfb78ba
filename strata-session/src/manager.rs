//! Session manager: login, token issuance, token reuse

use crate::credentials;
use rand::Rng;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use strata_core::{
    ConfigError, RawRecord, SessionError, SessionToken, StrataResult, UserRecord,
};
use strata_store::{DocumentStore, TextCache};
use tracing::{debug, warn};

/// Tuning knobs for the session manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// TTL attached to cached tokens.
    pub token_ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_ttl: Duration::from_secs(30 * 24 * 3600),
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }
}

/// Result of a successful login.
///
/// A fresh login carries a randomized privilege stub; only a reuse of an
/// unexpired token returns the store-backed privilege level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub token: SessionToken,
    pub privileges: i64,
}

/// Read raw symmetric key bytes from a file.
pub fn load_key_material(path: impl AsRef<Path>) -> Result<Vec<u8>, SessionError> {
    let path = path.as_ref();
    std::fs::read(path).map_err(|e| SessionError::KeyMaterialUnavailable {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Issues and validates opaque session tokens.
///
/// Tokens live in the cache under the owning username with a fixed TTL.
/// While a token is cached, repeat logins reuse it without re-checking
/// credentials - a deliberate, auditable trust decision. Concurrent
/// logins for one username may race to two tokens; last write wins and
/// the loser sees a future cache miss.
pub struct SessionManager<S, C> {
    store: Arc<S>,
    cache: Arc<C>,
    key: Option<Vec<u8>>,
    config: SessionConfig,
}

impl<S, C> std::fmt::Debug for SessionManager<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("has_key", &self.key.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S, C> SessionManager<S, C>
where
    S: DocumentStore,
    C: TextCache,
{
    pub fn builder() -> SessionManagerBuilder<S, C> {
        SessionManagerBuilder::new()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Whether symmetric key material was loaded at build time. The key
    /// is held for credential encryption but not exercised by the login
    /// path; reserved capability.
    pub fn has_key_material(&self) -> bool {
        self.key.is_some()
    }

    /// Authenticate a user and return a session token.
    ///
    /// Cache first: an unexpired token is returned as-is with the
    /// privilege level re-fetched from the store. Otherwise credentials
    /// are verified against the stored salted digest, and on success a
    /// fresh token is cached under the username with the configured TTL.
    pub async fn login(&self, username: &str, password: &str) -> StrataResult<LoginOutcome> {
        if let Some(token) = self.cache.get(username).await? {
            let user = self.fetch_user(username).await?;
            debug!(username, "reusing cached token");
            return Ok(LoginOutcome {
                token: SessionToken::new(token),
                privileges: user.privileges,
            });
        }

        let user = self.fetch_user(username).await?;
        if !credentials::verify_password(password, &user.password_digest) {
            debug!(username, "password mismatch");
            return Err(SessionError::InvalidCredentials.into());
        }

        let token = SessionToken::generate();
        self.cache.set(username, token.as_str()).await?;
        self.cache.expire(username, self.config.token_ttl).await?;
        debug!(username, "issued fresh token");

        Ok(LoginOutcome {
            token,
            privileges: privilege_stub(),
        })
    }

    async fn fetch_user(&self, username: &str) -> StrataResult<UserRecord> {
        let record: RawRecord = self
            .store
            .find_by_field("username", &json!(username))
            .await?
            .ok_or_else(|| SessionError::UnknownUser {
                username: username.to_string(),
            })?;
        Ok(UserRecord::from_record(&record)?)
    }
}

/// Privilege classification handed out with a fresh token. The real
/// level is re-fetched from the store on every token reuse.
fn privilege_stub() -> i64 {
    rand::thread_rng().gen_range(0..=10)
}

/// Builder for [`SessionManager`]. Missing collaborators fail the build;
/// missing key material is reported and tolerated.
pub struct SessionManagerBuilder<S, C> {
    store: Option<Arc<S>>,
    cache: Option<Arc<C>>,
    key_path: Option<std::path::PathBuf>,
    config: SessionConfig,
}

impl<S, C> SessionManagerBuilder<S, C>
where
    S: DocumentStore,
    C: TextCache,
{
    pub fn new() -> Self {
        Self {
            store: None,
            cache: None,
            key_path: None,
            config: SessionConfig::default(),
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

    /// Path to the raw symmetric key file loaded at build time.
    pub fn key_material_path(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.key_path = Some(path.into());
        self
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> StrataResult<SessionManager<S, C>> {
        let store = self
            .store
            .ok_or(ConfigError::UninitializedSession { field: "store" })?;
        let cache = self
            .cache
            .ok_or(ConfigError::UninitializedSession { field: "cache" })?;

        let key = match self.key_path {
            Some(path) => match load_key_material(&path) {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    // Reported, not fatal: the manager works without it.
                    warn!(error = %e, "continuing without key material");
                    None
                }
            },
            None => None,
        };

        Ok(SessionManager {
            store,
            cache,
            key,
            config: self.config,
        })
    }
}

impl<S, C> Default for SessionManagerBuilder<S, C>
where
    S: DocumentStore,
    C: TextCache,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::hash_password;
    use std::collections::BTreeMap;
    use std::io::Write;
    use strata_core::StrataError;
    use strata_store::{ManualClock, MemoryCache, MemoryStore};

    fn user_fields(
        username: &str,
        digest: &str,
        privileges: i64,
    ) -> BTreeMap<String, serde_json::Value> {
        let mut fields = BTreeMap::new();
        fields.insert("username".to_string(), json!(username));
        fields.insert("password".to_string(), json!(digest));
        fields.insert("privileges".to_string(), json!(privileges));
        fields
    }

    async fn seed_admin(store: &MemoryStore) {
        store
            .insert(user_fields("admin", &hash_password("s3cret", "pepper"), 7))
            .await
            .unwrap();
    }

    fn manager(
        store: Arc<MemoryStore>,
        cache: Arc<MemoryCache<ManualClock>>,
    ) -> SessionManager<MemoryStore, MemoryCache<ManualClock>> {
        SessionManager::builder()
            .store(store)
            .cache(cache)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_unknown_user_is_reported() {
        let store = Arc::new(MemoryStore::new());
        let cache = Arc::new(MemoryCache::with_clock(ManualClock::from_system()));
        let sessions = manager(store, cache.clone());

        let err = sessions.login("nobody", "whatever").await.unwrap_err();
        assert_eq!(
            err,
            StrataError::Session(SessionError::UnknownUser {
                username: "nobody".to_string()
            })
        );
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_wrong_password_issues_no_token() {
        let store = Arc::new(MemoryStore::new());
        seed_admin(&store).await;
        let cache = Arc::new(MemoryCache::with_clock(ManualClock::from_system()));
        let sessions = manager(store, cache.clone());

        let err = sessions.login("admin", "wrong").await.unwrap_err();
        assert_eq!(err, StrataError::Session(SessionError::InvalidCredentials));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_fresh_login_issues_and_caches_token() {
        let store = Arc::new(MemoryStore::new());
        seed_admin(&store).await;
        let cache = Arc::new(MemoryCache::with_clock(ManualClock::from_system()));
        let sessions = manager(store, cache.clone());

        let outcome = sessions.login("admin", "s3cret").await.unwrap();
        assert!((0..=10).contains(&outcome.privileges));

        let cached = cache.get("admin").await.unwrap().unwrap();
        assert_eq!(cached, outcome.token.as_str());
    }

    #[tokio::test]
    async fn test_repeat_login_reuses_token_and_refetches_privileges() {
        let store = Arc::new(MemoryStore::new());
        seed_admin(&store).await;
        let cache = Arc::new(MemoryCache::with_clock(ManualClock::from_system()));
        let sessions = manager(store.clone(), cache);

        let first = sessions.login("admin", "s3cret").await.unwrap();
        let lookups_after_first = store.stats().field_lookups;

        // Password is not re-checked, so even a wrong one reuses the token.
        let second = sessions.login("admin", "ignored").await.unwrap();
        assert_eq!(second.token, first.token);
        // Privileges come from the store, not the cache.
        assert_eq!(second.privileges, 7);
        assert_eq!(store.stats().field_lookups, lookups_after_first + 1);
    }

    #[tokio::test]
    async fn test_token_expires_after_thirty_days() {
        let clock = ManualClock::from_system();
        let store = Arc::new(MemoryStore::new());
        seed_admin(&store).await;
        let cache = Arc::new(MemoryCache::with_clock(clock.clone()));
        let sessions = manager(store, cache);

        let first = sessions.login("admin", "s3cret").await.unwrap();

        clock.advance(Duration::from_secs(30 * 24 * 3600 - 1));
        let reused = sessions.login("admin", "ignored").await.unwrap();
        assert_eq!(reused.token, first.token);

        clock.advance(Duration::from_secs(2));
        // Token gone: credentials are checked again and a new one issued.
        let err = sessions.login("admin", "ignored").await.unwrap_err();
        assert_eq!(err, StrataError::Session(SessionError::InvalidCredentials));

        let fresh = sessions.login("admin", "s3cret").await.unwrap();
        assert_ne!(fresh.token, first.token);
    }

    #[tokio::test]
    async fn test_malformed_user_record_is_surfaced() {
        let store = Arc::new(MemoryStore::new());
        let mut fields = user_fields("admin", "digest", 7);
        fields.remove("privileges");
        store.insert(fields).await.unwrap();
        let cache = Arc::new(MemoryCache::with_clock(ManualClock::from_system()));
        let sessions = manager(store, cache);

        let err = sessions.login("admin", "whatever").await.unwrap_err();
        assert!(matches!(err, StrataError::Store(_)));
    }

    #[tokio::test]
    async fn test_builder_requires_store_and_cache() {
        let missing_store = SessionManager::<MemoryStore, MemoryCache>::builder()
            .cache(Arc::new(MemoryCache::new()))
            .build()
            .unwrap_err();
        assert_eq!(
            missing_store,
            StrataError::Config(ConfigError::UninitializedSession { field: "store" })
        );

        let missing_cache = SessionManager::<MemoryStore, MemoryCache>::builder()
            .store(Arc::new(MemoryStore::new()))
            .build()
            .unwrap_err();
        assert_eq!(
            missing_cache,
            StrataError::Config(ConfigError::UninitializedSession { field: "cache" })
        );
    }

    #[tokio::test]
    async fn test_missing_key_material_is_tolerated() {
        let store = Arc::new(MemoryStore::new());
        seed_admin(&store).await;
        let sessions = SessionManager::builder()
            .store(store)
            .cache(Arc::new(MemoryCache::new()))
            .key_material_path("/definitely/not/here.keys")
            .build()
            .unwrap();

        assert!(!sessions.has_key_material());
        // Login is unaffected by the missing key.
        sessions.login("admin", "s3cret").await.unwrap();
    }

    #[tokio::test]
    async fn test_key_material_loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"raw-key-bytes").unwrap();

        let sessions = SessionManager::<MemoryStore, MemoryCache>::builder()
            .store(Arc::new(MemoryStore::new()))
            .cache(Arc::new(MemoryCache::new()))
            .key_material_path(file.path())
            .build()
            .unwrap();
        assert!(sessions.has_key_material());
    }

    #[test]
    fn test_load_key_material_error_names_path() {
        let err = load_key_material("/definitely/not/here.keys").unwrap_err();
        let msg = format!("{}", err);
        assert!(msg.contains("Key material unavailable"));
        assert!(msg.contains("/definitely/not/here.keys"));
    }
}
