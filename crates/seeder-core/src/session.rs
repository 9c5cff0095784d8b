//! Remote API session
//!
//! A session bundles the deadline-bounded API with its own identifier cache.
//! The cache's sweep task lives exactly as long as the session.

use crate::config::SeederConfig;
use crate::remote::{DeadlineApi, ResourceApi};
use crate::resolve::Resolver;
use crate::sync::Synchronizer;
use seeder_cache::IdCache;
use std::sync::Arc;

/// One authenticated API session with its resolution cache
#[derive(Debug)]
pub struct SeedSession {
    api: DeadlineApi,
    cache: IdCache,
    config: SeederConfig,
}

impl SeedSession {
    /// Open a session and start its cache sweep
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn start(api: Arc<dyn ResourceApi>, config: SeederConfig) -> Self {
        let cache = IdCache::start(config.cache.to_cache_config());
        tracing::debug!(
            call_timeout_ms = config.remote.call_timeout_ms,
            "seed session started"
        );
        Self {
            api: DeadlineApi::new(api, config.remote.call_timeout()),
            cache,
            config,
        }
    }

    /// Deadline-bounded API
    #[inline]
    #[must_use]
    pub fn api(&self) -> &DeadlineApi {
        &self.api
    }

    /// Session cache
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &IdCache {
        &self.cache
    }

    /// Session configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SeederConfig {
        &self.config
    }

    /// Resolver over this session
    #[inline]
    #[must_use]
    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.api, &self.cache)
    }

    /// Synchronizer over this session
    #[inline]
    #[must_use]
    pub fn synchronizer(&self) -> Synchronizer<'_> {
        Synchronizer::new(&self.api, self.resolver())
    }

    /// Stop the cache sweep and close the session
    pub async fn shutdown(mut self) {
        self.cache.shutdown().await;
        tracing::debug!("seed session closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::MemoryApi;
    use seeder_types::ResourceKind;
    use std::time::Duration;

    #[tokio::test]
    async fn session_owns_a_sweeping_cache() {
        let config = SeederConfig::default().with_call_timeout(Duration::from_millis(250));
        let session = SeedSession::start(Arc::new(MemoryApi::new()), config);

        assert!(session.cache().is_sweeping());
        assert_eq!(session.api().timeout(), Duration::from_millis(250));

        session.shutdown().await;
    }

    #[tokio::test]
    async fn sessions_do_not_share_caches() {
        let api: Arc<dyn ResourceApi> = Arc::new(MemoryApi::new());
        let first = SeedSession::start(Arc::clone(&api), SeederConfig::default());
        let second = SeedSession::start(api, SeederConfig::default());

        first
            .cache()
            .add(ResourceKind::Domain, "acme", "d-1", Duration::ZERO)
            .await;
        assert!(second.cache().get(ResourceKind::Domain, "acme").await.is_none());

        first.shutdown().await;
        second.shutdown().await;
    }
}
