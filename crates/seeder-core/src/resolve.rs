//! Natural-key to identifier resolution
//!
//! Seeds refer to entities by name (`admin`) or by compound reference
//! (`acme@alice`). The resolver turns those into remote identifiers, checking
//! the session cache first and caching only unique matches.

use crate::error::{SeedError, SeedResult};
use crate::remote::{DeadlineApi, Filter};
use seeder_cache::{CacheKey, IdCache};
use seeder_types::{CompoundRef, ResourceKind};
use serde_json::Value;
use std::time::Duration;

/// Cache-backed identifier resolver
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'s> {
    api: &'s DeadlineApi,
    cache: &'s IdCache,
}

impl<'s> Resolver<'s> {
    /// Create resolver over an API and its session cache
    #[inline]
    #[must_use]
    pub fn new(api: &'s DeadlineApi, cache: &'s IdCache) -> Self {
        Self { api, cache }
    }

    /// Resolve a domain by name
    ///
    /// # Errors
    /// - `SeedError::NotFound` / `SeedError::AmbiguousMatch` unless exactly one domain matches
    /// - `SeedError::Remote` on API failure
    pub async fn domain_id(&self, name: &str) -> SeedResult<String> {
        let key = CacheKey::new(ResourceKind::Domain, name);
        if let Some(id) = self.cache.lookup(&key).await {
            return Ok(id);
        }
        let filter = Filter::new().eq("name", name);
        self.unique(key, &filter).await
    }

    /// Resolve a global role by name
    ///
    /// # Errors
    /// - `SeedError::NotFound` / `SeedError::AmbiguousMatch` unless exactly one role matches
    /// - `SeedError::Remote` on API failure
    pub async fn role_id(&self, name: &str) -> SeedResult<String> {
        let key = CacheKey::new(ResourceKind::Role, name);
        if let Some(id) = self.cache.lookup(&key).await {
            return Ok(id);
        }
        let filter = Filter::new()
            .eq("name", name)
            .eq("domain_id", Value::Null);
        self.unique(key, &filter).await
    }

    /// Resolve a project given as `domain@project`
    ///
    /// # Errors
    /// - as for [`Resolver::domain_id`], for the domain and then the project
    pub async fn project_id(&self, reference: &CompoundRef) -> SeedResult<String> {
        self.scoped_id(ResourceKind::Project, reference).await
    }

    /// Resolve a user given as `domain@user`
    ///
    /// # Errors
    /// - as for [`Resolver::domain_id`], for the domain and then the user
    pub async fn user_id(&self, reference: &CompoundRef) -> SeedResult<String> {
        self.scoped_id(ResourceKind::User, reference).await
    }

    /// Resolve a group given as `domain@group`
    ///
    /// # Errors
    /// - as for [`Resolver::domain_id`], for the domain and then the group
    pub async fn group_id(&self, reference: &CompoundRef) -> SeedResult<String> {
        self.scoped_id(ResourceKind::Group, reference).await
    }

    /// Parse a compound reference and resolve it
    ///
    /// # Errors
    /// - `SeedError::Validation` for a malformed reference
    /// - as for [`Resolver::project_id`] otherwise
    pub async fn parse_compound(&self, kind: ResourceKind, reference: &str) -> SeedResult<String> {
        let reference = CompoundRef::parse(reference)?;
        self.scoped_id(kind, &reference).await
    }

    /// Check that an entity referenced by id exists
    ///
    /// # Errors
    /// - `SeedError::NotFound` if the remote side does not know the id
    /// - `SeedError::Remote` on API failure
    pub async fn require_existing(&self, kind: ResourceKind, id: &str) -> SeedResult<String> {
        match self.api.get(kind, id).await? {
            Some(entity) => Ok(entity.id),
            None => Err(SeedError::not_found(kind, id)),
        }
    }

    async fn scoped_id(&self, kind: ResourceKind, reference: &CompoundRef) -> SeedResult<String> {
        let key = CacheKey::scoped(kind, reference.scope.as_str(), reference.name.as_str());
        if let Some(id) = self.cache.lookup(&key).await {
            return Ok(id);
        }
        let domain_id = self.domain_id(&reference.scope).await?;
        let filter = Filter::new()
            .eq("name", reference.name.as_str())
            .eq("domain_id", domain_id);
        self.unique(key, &filter).await
    }

    async fn unique(&self, key: CacheKey, filter: &Filter) -> SeedResult<String> {
        let kind = key.kind();
        let found = self.api.list(kind, filter).await?;
        let natural_key = match key.scope() {
            Some(scope) => CompoundRef::new(scope, key.name()).to_string(),
            None => key.name().to_string(),
        };
        match found.as_slice() {
            [] => Err(SeedError::not_found(kind, natural_key)),
            [entity] => {
                tracing::debug!(%kind, key = %natural_key, id = %entity.id, "resolved");
                self.cache.insert(key, entity.id.clone(), Duration::ZERO).await;
                Ok(entity.id.clone())
            }
            many => Err(SeedError::ambiguous(kind, natural_key, many.len())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::{MemoryApi, Operation};
    use seeder_cache::CacheConfig;
    use serde_json::json;
    use std::sync::Arc;

    fn setup() -> (Arc<MemoryApi>, DeadlineApi, IdCache) {
        let memory = Arc::new(MemoryApi::new());
        let api = DeadlineApi::new(memory.clone(), Duration::from_secs(5));
        (memory, api, IdCache::new(CacheConfig::default()))
    }

    #[tokio::test]
    async fn resolves_and_caches_user() {
        let (memory, api, cache) = setup();
        let domain = memory.insert(ResourceKind::Domain, json!({"name": "acme"}));
        let user = memory.insert(
            ResourceKind::User,
            json!({"name": "alice", "domain_id": domain.id}),
        );
        let resolver = Resolver::new(&api, &cache);
        let reference = CompoundRef::parse("acme@alice").unwrap();

        assert_eq!(resolver.user_id(&reference).await.unwrap(), user.id);
        assert_eq!(memory.calls(Operation::List, ResourceKind::Domain), 1);
        assert_eq!(memory.calls(Operation::List, ResourceKind::User), 1);

        assert_eq!(resolver.user_id(&reference).await.unwrap(), user.id);
        assert_eq!(memory.calls(Operation::List, ResourceKind::Domain), 1);
        assert_eq!(memory.calls(Operation::List, ResourceKind::User), 1);
        assert_eq!(
            cache
                .lookup(&CacheKey::scoped(ResourceKind::User, "acme", "alice"))
                .await
                .as_deref(),
            Some(user.id.as_str())
        );
    }

    #[tokio::test]
    async fn zero_matches_is_not_found_and_not_cached() {
        let (memory, api, cache) = setup();
        memory.insert(ResourceKind::Domain, json!({"name": "acme"}));
        let resolver = Resolver::new(&api, &cache);

        let err = resolver
            .parse_compound(ResourceKind::Project, "acme@missing")
            .await
            .unwrap_err();
        assert!(matches!(err, SeedError::NotFound { kind: ResourceKind::Project, .. }));
        assert!(cache
            .lookup(&CacheKey::scoped(ResourceKind::Project, "acme", "missing"))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn two_matches_is_ambiguous_and_not_cached() {
        let (memory, api, cache) = setup();
        let domain = memory.insert(ResourceKind::Domain, json!({"name": "acme"}));
        for _ in 0..2 {
            memory.insert(
                ResourceKind::Project,
                json!({"name": "web", "domain_id": domain.id}),
            );
        }
        let resolver = Resolver::new(&api, &cache);

        let err = resolver
            .parse_compound(ResourceKind::Project, "acme@web")
            .await
            .unwrap_err();
        assert!(matches!(err, SeedError::AmbiguousMatch { count: 2, .. }));
        assert!(cache
            .lookup(&CacheKey::scoped(ResourceKind::Project, "acme", "web"))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn dotted_names_resolve_to_their_own_ids() {
        let (memory, api, cache) = setup();
        let ab = memory.insert(ResourceKind::Domain, json!({"name": "a.b"}));
        let a = memory.insert(ResourceKind::Domain, json!({"name": "a"}));
        let c = memory.insert(ResourceKind::User, json!({"name": "c", "domain_id": ab.id}));
        let bc = memory.insert(ResourceKind::User, json!({"name": "b.c", "domain_id": a.id}));
        let resolver = Resolver::new(&api, &cache);

        let first = resolver.parse_compound(ResourceKind::User, "a.b@c").await.unwrap();
        let second = resolver.parse_compound(ResourceKind::User, "a@b.c").await.unwrap();

        assert_eq!(first, c.id);
        assert_eq!(second, bc.id);
        assert_eq!(memory.calls(Operation::List, ResourceKind::User), 2);
    }

    #[tokio::test]
    async fn malformed_reference_is_validation_error() {
        let (_, api, cache) = setup();
        let resolver = Resolver::new(&api, &cache);

        let err = resolver
            .parse_compound(ResourceKind::User, "alice")
            .await
            .unwrap_err();
        assert!(matches!(err, SeedError::Validation(_)));
    }

    #[tokio::test]
    async fn role_lookup_ignores_domain_roles() {
        let (memory, api, cache) = setup();
        let global = memory.insert(ResourceKind::Role, json!({"name": "admin"}));
        memory.insert(
            ResourceKind::Role,
            json!({"name": "admin", "domain_id": "d-1"}),
        );
        let resolver = Resolver::new(&api, &cache);

        assert_eq!(resolver.role_id("admin").await.unwrap(), global.id);
    }

    #[tokio::test]
    async fn require_existing_by_id() {
        let (memory, api, cache) = setup();
        let project = memory.insert(ResourceKind::Project, json!({"name": "web"}));
        let resolver = Resolver::new(&api, &cache);

        assert_eq!(
            resolver
                .require_existing(ResourceKind::Project, &project.id)
                .await
                .unwrap(),
            project.id
        );
        let err = resolver
            .require_existing(ResourceKind::Project, "nope")
            .await
            .unwrap_err();
        assert!(matches!(err, SeedError::NotFound { .. }));
    }
}
