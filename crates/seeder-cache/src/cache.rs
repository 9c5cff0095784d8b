//! Identifier resolution cache using moka
//!
//! Maps `(resource kind, scope, name)` to the remote identifier a lookup
//! resolved it to. Every entry carries its own time-to-live; a background sweep
//! evicts expired entries on a fixed interval until it is cancelled.

use moka::future::Cache;
use moka::Expiry;
use seeder_types::ResourceKind;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Cache settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// TTL used when `add` is called with a zero TTL
    pub default_ttl: Duration,
    /// Interval between background sweeps
    pub sweep_interval: Duration,
    /// Maximum number of entries
    ///
    /// Once the cache holds this many entries moka may evict one before its
    /// TTL runs out; the next lookup then misses and resolves remotely again.
    /// Size it above the number of distinct references one session resolves.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(7 * 24 * 60 * 60),
            sweep_interval: Duration::from_secs(30 * 60),
            max_capacity: 100_000,
        }
    }
}

/// Composite cache key
///
/// Scoped entities (projects, users, groups) keep their scope apart from the
/// name, so `a.b@c` and `a@b.c` never share an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    kind: ResourceKind,
    scope: Option<String>,
    name: String,
}

impl CacheKey {
    /// Create key for an unscoped entity
    #[inline]
    #[must_use]
    pub fn new(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            scope: None,
            name: name.into(),
        }
    }

    /// Create key for an entity named within a scope (its domain)
    #[inline]
    #[must_use]
    pub fn scoped(kind: ResourceKind, scope: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            scope: Some(scope.into()),
            name: name.into(),
        }
    }

    /// Entity type
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Scope, if the entity is scoped
    #[inline]
    #[must_use]
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Name within the scope
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{}:{scope}@{}", self.kind, self.name),
            None => write!(f, "{}:{}", self.kind, self.name),
        }
    }
}

#[derive(Debug, Clone)]
struct CachedId {
    value: String,
    ttl: Duration,
}

/// Expires each entry after the TTL it was added with
struct PerEntryTtl;

impl Expiry<CacheKey, CachedId> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &CacheKey,
        value: &CachedId,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &CacheKey,
        value: &CachedId,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

#[derive(Debug)]
struct Sweeper {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Session-scoped identifier cache
///
/// Reads never block each other; moka serializes writes and the sweep
/// internally. The cache belongs to one API session and is never shared
/// between sessions.
#[derive(Debug)]
pub struct IdCache {
    inner: Cache<CacheKey, CachedId>,
    config: CacheConfig,
    sweeps: Arc<AtomicU64>,
    sweeper: Option<Sweeper>,
}

impl IdCache {
    /// Create cache without a background sweep
    ///
    /// Expired entries are still never returned by `get`; they are only
    /// evicted lazily.
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(config.max_capacity)
                .expire_after(PerEntryTtl)
                .build(),
            config,
            sweeps: Arc::new(AtomicU64::new(0)),
            sweeper: None,
        }
    }

    /// Create cache and spawn its background sweep
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn start(config: CacheConfig) -> Self {
        let mut cache = Self::new(config);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_sweep(
            cache.inner.clone(),
            config.sweep_interval.max(Duration::from_millis(1)),
            cancel.clone(),
            Arc::clone(&cache.sweeps),
        ));
        cache.sweeper = Some(Sweeper { cancel, task });
        cache
    }

    /// Look up a cached identifier
    ///
    /// Never resolves on a miss; the caller looks the entity up remotely and
    /// calls [`IdCache::insert`] on a unique match.
    pub async fn lookup(&self, key: &CacheKey) -> Option<String> {
        let hit = self.inner.get(key).await.map(|cached| cached.value);
        tracing::trace!(%key, hit = hit.is_some(), "id cache lookup");
        hit
    }

    /// Look up the identifier of an unscoped entity
    pub async fn get(&self, kind: ResourceKind, name: &str) -> Option<String> {
        self.lookup(&CacheKey::new(kind, name)).await
    }

    /// Store an identifier
    ///
    /// A zero `ttl` uses the configured default TTL. Overwrites any existing
    /// entry and restarts its expiration.
    pub async fn insert(&self, key: CacheKey, value: impl Into<String>, ttl: Duration) {
        let ttl = if ttl.is_zero() {
            self.config.default_ttl
        } else {
            ttl
        };
        self.inner
            .insert(
                key,
                CachedId {
                    value: value.into(),
                    ttl,
                },
            )
            .await;
    }

    /// Store the identifier of an unscoped entity
    pub async fn add(&self, kind: ResourceKind, name: &str, value: impl Into<String>, ttl: Duration) {
        self.insert(CacheKey::new(kind, name), value, ttl).await;
    }

    /// Evict expired entries now
    pub async fn sweep(&self) {
        self.inner.run_pending_tasks().await;
    }

    /// Approximate number of live entries
    #[inline]
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Number of background sweeps completed
    #[inline]
    #[must_use]
    pub fn sweeps_completed(&self) -> u64 {
        self.sweeps.load(Ordering::Relaxed)
    }

    /// Check if the background sweep is running
    #[must_use]
    pub fn is_sweeping(&self) -> bool {
        self.sweeper
            .as_ref()
            .is_some_and(|s| !s.cancel.is_cancelled() && !s.task.is_finished())
    }

    /// Cache settings
    #[inline]
    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Stop the background sweep and wait for it to exit
    pub async fn shutdown(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.cancel.cancel();
            if let Err(e) = sweeper.task.await {
                tracing::warn!(error = %e, "id cache sweep task ended abnormally");
            }
        }
    }
}

impl Default for IdCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl Drop for IdCache {
    fn drop(&mut self) {
        if let Some(sweeper) = &self.sweeper {
            sweeper.cancel.cancel();
        }
    }
}

async fn run_sweep(
    inner: Cache<CacheKey, CachedId>,
    interval: Duration,
    cancel: CancellationToken,
    sweeps: Arc<AtomicU64>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // first tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                tracing::debug!("id cache sweep stopped");
                break;
            }
            _ = ticker.tick() => {
                inner.run_pending_tasks().await;
                sweeps.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(entries = inner.entry_count(), "id cache swept");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_config() -> CacheConfig {
        CacheConfig {
            default_ttl: Duration::from_millis(300),
            sweep_interval: Duration::from_millis(20),
            max_capacity: 100,
        }
    }

    #[tokio::test]
    async fn get_returns_added_value() {
        let cache = IdCache::new(CacheConfig::default());
        cache
            .add(ResourceKind::Domain, "acme", "d-1", Duration::ZERO)
            .await;

        assert_eq!(
            cache.get(ResourceKind::Domain, "acme").await.as_deref(),
            Some("d-1")
        );
    }

    #[tokio::test]
    async fn miss_does_not_create_entry() {
        let cache = IdCache::new(CacheConfig::default());

        assert!(cache
            .lookup(&CacheKey::scoped(ResourceKind::User, "acme", "alice"))
            .await
            .is_none());
        cache.sweep().await;
        assert_eq!(cache.entry_count(), 0);
    }

    #[tokio::test]
    async fn kinds_do_not_collide() {
        let cache = IdCache::new(CacheConfig::default());
        cache
            .add(ResourceKind::Domain, "acme", "d-1", Duration::ZERO)
            .await;

        assert!(cache.get(ResourceKind::Project, "acme").await.is_none());
    }

    #[tokio::test]
    async fn dotted_scopes_and_names_stay_apart() {
        let cache = IdCache::new(CacheConfig::default());
        let c_in_ab = CacheKey::scoped(ResourceKind::User, "a.b", "c");
        let bc_in_a = CacheKey::scoped(ResourceKind::User, "a", "b.c");
        cache.insert(c_in_ab.clone(), "u-1", Duration::ZERO).await;

        assert!(cache.lookup(&bc_in_a).await.is_none());
        cache.insert(bc_in_a.clone(), "u-2", Duration::ZERO).await;
        assert_eq!(cache.lookup(&c_in_ab).await.as_deref(), Some("u-1"));
        assert_eq!(cache.lookup(&bc_in_a).await.as_deref(), Some("u-2"));
    }

    #[tokio::test]
    async fn scoped_and_unscoped_keys_stay_apart() {
        let cache = IdCache::new(CacheConfig::default());
        cache
            .insert(CacheKey::scoped(ResourceKind::Project, "acme", "web"), "p-1", Duration::ZERO)
            .await;

        assert!(cache.get(ResourceKind::Project, "web").await.is_none());
    }

    #[tokio::test]
    async fn entries_within_capacity_live_for_their_ttl() {
        let config = CacheConfig {
            max_capacity: 64,
            ..CacheConfig::default()
        };
        let cache = IdCache::new(config);
        for i in 0..50 {
            cache
                .insert(
                    CacheKey::scoped(ResourceKind::User, "acme", format!("u{i}")),
                    format!("id-{i}"),
                    Duration::ZERO,
                )
                .await;
        }
        cache.sweep().await;

        for i in 0..50 {
            let key = CacheKey::scoped(ResourceKind::User, "acme", format!("u{i}"));
            assert_eq!(cache.lookup(&key).await, Some(format!("id-{i}")));
        }
    }

    #[test]
    fn key_display_keeps_scope_separate() {
        let key = CacheKey::scoped(ResourceKind::User, "acme", "alice");
        assert_eq!(key.scope(), Some("acme"));
        assert_eq!(key.name(), "alice");
        assert_eq!(key.to_string(), "user:acme@alice");
        assert_eq!(CacheKey::new(ResourceKind::Role, "admin").scope(), None);
    }

    #[tokio::test]
    async fn value_lives_for_its_ttl() {
        let cache = IdCache::new(CacheConfig::default());
        cache
            .add(ResourceKind::Role, "admin", "r-1", Duration::from_millis(400))
            .await;

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(
            cache.get(ResourceKind::Role, "admin").await.as_deref(),
            Some("r-1")
        );

        tokio::time::sleep(Duration::from_millis(450)).await;
        assert!(cache.get(ResourceKind::Role, "admin").await.is_none());
    }

    #[tokio::test]
    async fn zero_ttl_uses_default() {
        let cache = IdCache::new(short_config());
        cache
            .add(ResourceKind::Role, "admin", "r-1", Duration::ZERO)
            .await;

        assert!(cache.get(ResourceKind::Role, "admin").await.is_some());
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(cache.get(ResourceKind::Role, "admin").await.is_none());
    }

    #[tokio::test]
    async fn overwrite_replaces_value() {
        let cache = IdCache::new(CacheConfig::default());
        cache
            .add(ResourceKind::Domain, "acme", "d-1", Duration::ZERO)
            .await;
        cache
            .add(ResourceKind::Domain, "acme", "d-2", Duration::ZERO)
            .await;

        assert_eq!(
            cache.get(ResourceKind::Domain, "acme").await.as_deref(),
            Some("d-2")
        );
    }

    #[tokio::test]
    async fn background_sweep_evicts_expired_entries() {
        let mut cache = IdCache::start(short_config());
        assert!(cache.is_sweeping());

        for i in 0..5 {
            cache
                .insert(
                    CacheKey::scoped(ResourceKind::Project, "acme", format!("p{i}")),
                    format!("p-{i}"),
                    Duration::from_millis(50),
                )
                .await;
        }

        tokio::time::sleep(Duration::from_millis(400)).await;

        assert!(cache.sweeps_completed() > 0);
        assert_eq!(cache.entry_count(), 0);

        cache.shutdown().await;
        assert!(!cache.is_sweeping());
    }

    #[tokio::test]
    async fn shutdown_stops_sweeping() {
        let mut cache = IdCache::start(short_config());
        cache.shutdown().await;

        let after_shutdown = cache.sweeps_completed();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(cache.sweeps_completed(), after_shutdown);
    }

    #[test]
    fn default_config_values() {
        let config = CacheConfig::default();
        assert_eq!(config.default_ttl, Duration::from_secs(604_800));
        assert_eq!(config.sweep_interval, Duration::from_secs(1_800));
        assert_eq!(config.max_capacity, 100_000);
    }
}
