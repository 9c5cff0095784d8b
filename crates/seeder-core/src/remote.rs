//! Remote resource API seam
//!
//! The seeder talks to the identity, compute, share, placement, network and
//! volume APIs through a single [`ResourceApi`] keyed by [`ResourceKind`].
//! Every call made by the seeder goes through [`DeadlineApi`], which bounds
//! each call with the configured timeout.

use crate::compare::values_equal;
use crate::error::RemoteError;
use async_trait::async_trait;
use seeder_types::{AttributeMap, ResourceKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Entity as returned by the remote API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Identifier assigned by the remote side
    pub id: String,
    /// All remote attributes, keyed by remote name
    #[serde(default)]
    pub attributes: AttributeMap,
}

impl Entity {
    /// Create entity
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, attributes: AttributeMap) -> Self {
        Self {
            id: id.into(),
            attributes,
        }
    }

    /// Attribute value by remote name
    #[inline]
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// String attribute by remote name
    #[inline]
    #[must_use]
    pub fn str_attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }

    /// Display name, if the entity has one
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.str_attribute("name")
    }
}

/// Equality filter for list calls
///
/// A `null` term matches entities where the attribute is absent or null.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    terms: AttributeMap,
}

impl Filter {
    /// Create empty filter
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter on every attribute of a map
    #[inline]
    #[must_use]
    pub fn from_attributes(terms: AttributeMap) -> Self {
        Self { terms }
    }

    /// With equality term
    #[must_use]
    pub fn eq(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.terms.insert(name.to_string(), value.into());
        self
    }

    /// Filter terms
    #[inline]
    #[must_use]
    pub fn terms(&self) -> &AttributeMap {
        &self.terms
    }

    /// String term by name
    #[inline]
    #[must_use]
    pub fn term(&self, name: &str) -> Option<&str> {
        self.terms.get(name).and_then(Value::as_str)
    }

    /// Check if an entity satisfies every term
    #[must_use]
    pub fn matches(&self, entity: &Entity) -> bool {
        self.terms.iter().all(|(name, wanted)| {
            let actual = if name == "id" {
                Some(Value::from(entity.id.as_str()))
            } else {
                entity.attributes.get(name).cloned()
            };
            match (wanted, actual) {
                (Value::Null, None | Some(Value::Null)) => true,
                (wanted, Some(actual)) => values_equal(wanted, &actual),
                (_, None) => false,
            }
        })
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in &self.terms {
            if !first {
                write!(f, ",")?;
            }
            first = false;
            match value {
                Value::String(s) => write!(f, "{name}={s}")?,
                other => write!(f, "{name}={other}")?,
            }
        }
        Ok(())
    }
}

/// Remote resource API
///
/// Implementations must be safe to call concurrently. Errors are reported as
/// [`RemoteError`]; a `get` for an unknown id returns `Ok(None)`.
#[async_trait]
pub trait ResourceApi: Send + Sync {
    /// List entities matching a filter
    async fn list(&self, kind: ResourceKind, filter: &Filter) -> Result<Vec<Entity>, RemoteError>;

    /// Get entity by id
    async fn get(&self, kind: ResourceKind, id: &str) -> Result<Option<Entity>, RemoteError>;

    /// Create entity
    async fn create(
        &self,
        kind: ResourceKind,
        attributes: AttributeMap,
    ) -> Result<Entity, RemoteError>;

    /// Partially update entity; attributes not named are left unchanged
    async fn update(
        &self,
        kind: ResourceKind,
        id: &str,
        attributes: AttributeMap,
    ) -> Result<Entity, RemoteError>;
}

/// Resource API with a deadline on every call
#[derive(Clone)]
pub struct DeadlineApi {
    inner: Arc<dyn ResourceApi>,
    timeout: Duration,
}

impl DeadlineApi {
    /// Wrap an API with a per-call timeout
    #[must_use]
    pub fn new(inner: Arc<dyn ResourceApi>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    /// Per-call timeout
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Wrapped API
    #[inline]
    #[must_use]
    pub fn inner(&self) -> &Arc<dyn ResourceApi> {
        &self.inner
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, RemoteError>>,
    ) -> Result<T, RemoteError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| RemoteError::timeout(self.timeout))?
    }

    /// List entities matching a filter
    ///
    /// # Errors
    /// - `RemoteError` from the API, or a timeout
    pub async fn list(
        &self,
        kind: ResourceKind,
        filter: &Filter,
    ) -> Result<Vec<Entity>, RemoteError> {
        tracing::trace!(%kind, %filter, "list");
        self.bounded(self.inner.list(kind, filter)).await
    }

    /// Get entity by id
    ///
    /// # Errors
    /// - `RemoteError` from the API, or a timeout
    pub async fn get(&self, kind: ResourceKind, id: &str) -> Result<Option<Entity>, RemoteError> {
        tracing::trace!(%kind, id, "get");
        self.bounded(self.inner.get(kind, id)).await
    }

    /// Create entity
    ///
    /// # Errors
    /// - `RemoteError` from the API, or a timeout
    pub async fn create(
        &self,
        kind: ResourceKind,
        attributes: AttributeMap,
    ) -> Result<Entity, RemoteError> {
        self.bounded(self.inner.create(kind, attributes)).await
    }

    /// Partially update entity
    ///
    /// # Errors
    /// - `RemoteError` from the API, or a timeout
    pub async fn update(
        &self,
        kind: ResourceKind,
        id: &str,
        attributes: AttributeMap,
    ) -> Result<Entity, RemoteError> {
        self.bounded(self.inner.update(kind, id, attributes)).await
    }
}

impl fmt::Debug for DeadlineApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeadlineApi")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entity(id: &str, attributes: Value) -> Entity {
        match attributes {
            Value::Object(map) => Entity::new(id, map),
            _ => Entity::new(id, AttributeMap::new()),
        }
    }

    #[test]
    fn filter_matches_all_terms() {
        let e = entity("p-1", json!({"name": "web", "domain_id": "d-1"}));

        assert!(Filter::new().matches(&e));
        assert!(Filter::new().eq("name", "web").eq("domain_id", "d-1").matches(&e));
        assert!(!Filter::new().eq("name", "web").eq("domain_id", "d-2").matches(&e));
        assert!(Filter::new().eq("id", "p-1").matches(&e));
    }

    #[test]
    fn null_term_matches_absent_attribute() {
        let global = entity("r-1", json!({"name": "admin"}));
        let scoped = entity("r-2", json!({"name": "admin", "domain_id": "d-1"}));
        let filter = Filter::new().eq("name", "admin").eq("domain_id", Value::Null);

        assert!(filter.matches(&global));
        assert!(!filter.matches(&scoped));
    }

    #[test]
    fn filter_display_lists_terms() {
        let filter = Filter::new().eq("name", "web").eq("enabled", true);
        assert_eq!(filter.to_string(), "enabled=true,name=web");
    }

    struct SlowApi;

    #[async_trait]
    impl ResourceApi for SlowApi {
        async fn list(&self, _: ResourceKind, _: &Filter) -> Result<Vec<Entity>, RemoteError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Vec::new())
        }

        async fn get(&self, _: ResourceKind, _: &str) -> Result<Option<Entity>, RemoteError> {
            Ok(None)
        }

        async fn create(&self, _: ResourceKind, a: AttributeMap) -> Result<Entity, RemoteError> {
            Ok(Entity::new("x", a))
        }

        async fn update(
            &self,
            _: ResourceKind,
            id: &str,
            a: AttributeMap,
        ) -> Result<Entity, RemoteError> {
            Ok(Entity::new(id, a))
        }
    }

    #[tokio::test]
    async fn slow_call_times_out() {
        let api = DeadlineApi::new(Arc::new(SlowApi), Duration::from_millis(20));

        let err = api
            .list(ResourceKind::Domain, &Filter::new())
            .await
            .unwrap_err();
        assert!(err.is_timeout());

        assert!(api.get(ResourceKind::Domain, "d-1").await.unwrap().is_none());
    }
}
