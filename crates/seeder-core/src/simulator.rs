//! In-memory remote resource API
//!
//! Stands in for the real identity, compute, share, placement, network and
//! volume APIs when validating seeds offline and in tests:
//! - Entities live in a per-kind table, ids are generated on create
//! - Every call is counted per operation and resource kind
//! - Failures can be injected per operation, kind and entity name
//! - Optional latency to exercise call deadlines
//!
//! The state can be loaded from and saved to a JSON snapshot keyed by kind.

use crate::error::RemoteError;
use crate::remote::{Entity, Filter, ResourceApi};
use async_trait::async_trait;
use parking_lot::Mutex;
use seeder_types::{AttributeMap, ResourceKind};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Remote API operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
}

impl Operation {
    /// Check if the operation changes remote state
    #[inline]
    #[must_use]
    pub fn is_mutation(self) -> bool {
        matches!(self, Self::Create | Self::Update)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::List => "list",
            Self::Get => "get",
            Self::Create => "create",
            Self::Update => "update",
        };
        f.write_str(name)
    }
}

/// Serializable remote state, entities per kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteSnapshot(pub BTreeMap<ResourceKind, Vec<Entity>>);

impl RemoteSnapshot {
    /// Parse JSON snapshot
    ///
    /// # Errors
    /// - `serde_json::Error` on syntax or shape errors
    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Entities of one kind
    #[must_use]
    pub fn entities(&self, kind: ResourceKind) -> &[Entity] {
        self.0.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Call counts keyed by operation and kind
pub type CallCounts = BTreeMap<(Operation, ResourceKind), usize>;

#[derive(Debug, Clone)]
struct InjectedFailure {
    operation: Operation,
    kind: ResourceKind,
    name: Option<String>,
    error: RemoteError,
}

impl InjectedFailure {
    fn applies(&self, operation: Operation, kind: ResourceKind, name: Option<&str>) -> bool {
        self.operation == operation
            && self.kind == kind
            && self.name.as_deref().map_or(true, |wanted| name == Some(wanted))
    }
}

#[derive(Debug, Default)]
struct State {
    entities: BTreeMap<ResourceKind, Vec<Entity>>,
    calls: CallCounts,
    failures: Vec<InjectedFailure>,
    next_id: u64,
}

impl State {
    fn record(
        &mut self,
        operation: Operation,
        kind: ResourceKind,
        name: Option<&str>,
    ) -> Result<(), RemoteError> {
        *self.calls.entry((operation, kind)).or_insert(0) += 1;
        match self
            .failures
            .iter()
            .find(|f| f.applies(operation, kind, name))
        {
            Some(failure) => Err(failure.error.clone()),
            None => Ok(()),
        }
    }

    fn generate_id(&mut self, kind: ResourceKind) -> String {
        self.next_id += 1;
        let id = uuid::Uuid::new_v4().simple().to_string();
        format!("{}-{}-{}", kind.as_str(), self.next_id, &id[..8])
    }
}

/// In-memory [`ResourceApi`]
#[derive(Debug, Default)]
pub struct MemoryApi {
    state: Mutex<State>,
    latency: Option<Duration>,
}

impl MemoryApi {
    /// Create empty API
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create API holding a snapshot's entities
    #[must_use]
    pub fn from_snapshot(snapshot: RemoteSnapshot) -> Self {
        let api = Self::new();
        api.state.lock().entities = snapshot.0;
        api
    }

    /// With latency added to every call
    #[inline]
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Store an entity directly, bypassing call counting and failures
    ///
    /// An `id` attribute becomes the entity id; otherwise one is generated.
    pub fn insert(&self, kind: ResourceKind, attributes: Value) -> Entity {
        let mut attributes = match attributes {
            Value::Object(map) => map,
            _ => AttributeMap::new(),
        };
        let mut state = self.state.lock();
        let id = match attributes.remove("id") {
            Some(Value::String(id)) => id,
            _ => state.generate_id(kind),
        };
        let entity = Entity::new(id, attributes);
        state.entities.entry(kind).or_default().push(entity.clone());
        entity
    }

    /// All entities of a kind
    #[must_use]
    pub fn entities(&self, kind: ResourceKind) -> Vec<Entity> {
        self.state
            .lock()
            .entities
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }

    /// Entities of a kind with the given name
    #[must_use]
    pub fn find_by_name(&self, kind: ResourceKind, name: &str) -> Vec<Entity> {
        self.entities(kind)
            .into_iter()
            .filter(|e| e.name() == Some(name))
            .collect()
    }

    /// Number of calls made for an operation and kind
    #[must_use]
    pub fn calls(&self, operation: Operation, kind: ResourceKind) -> usize {
        self.state
            .lock()
            .calls
            .get(&(operation, kind))
            .copied()
            .unwrap_or(0)
    }

    /// Number of calls made for an operation across all kinds
    #[must_use]
    pub fn total_calls(&self, operation: Operation) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|((op, _), _)| *op == operation)
            .map(|(_, n)| n)
            .sum()
    }

    /// Number of create and update calls across all kinds
    #[must_use]
    pub fn mutations(&self) -> usize {
        self.total_calls(Operation::Create) + self.total_calls(Operation::Update)
    }

    /// All call counts
    #[must_use]
    pub fn call_counts(&self) -> CallCounts {
        self.state.lock().calls.clone()
    }

    /// Reset call counts
    pub fn reset_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Fail calls of an operation on a kind, optionally only for one entity name
    pub fn fail_on(
        &self,
        operation: Operation,
        kind: ResourceKind,
        name: Option<&str>,
        error: RemoteError,
    ) {
        self.state.lock().failures.push(InjectedFailure {
            operation,
            kind,
            name: name.map(str::to_string),
            error,
        });
    }

    /// Remove all injected failures
    pub fn clear_failures(&self) {
        self.state.lock().failures.clear();
    }

    /// Copy of the current state
    #[must_use]
    pub fn snapshot(&self) -> RemoteSnapshot {
        RemoteSnapshot(self.state.lock().entities.clone())
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl ResourceApi for MemoryApi {
    async fn list(&self, kind: ResourceKind, filter: &Filter) -> Result<Vec<Entity>, RemoteError> {
        self.delay().await;
        let mut state = self.state.lock();
        state.record(Operation::List, kind, filter.term("name"))?;
        Ok(state
            .entities
            .get(&kind)
            .map(|all| all.iter().filter(|e| filter.matches(e)).cloned().collect())
            .unwrap_or_default())
    }

    async fn get(&self, kind: ResourceKind, id: &str) -> Result<Option<Entity>, RemoteError> {
        self.delay().await;
        let mut state = self.state.lock();
        state.record(Operation::Get, kind, None)?;
        Ok(state
            .entities
            .get(&kind)
            .and_then(|all| all.iter().find(|e| e.id == id).cloned()))
    }

    async fn create(
        &self,
        kind: ResourceKind,
        mut attributes: AttributeMap,
    ) -> Result<Entity, RemoteError> {
        self.delay().await;
        let mut state = self.state.lock();
        let name = attributes
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string);
        state.record(Operation::Create, kind, name.as_deref())?;

        let id = match attributes.remove("id") {
            Some(Value::String(id)) if !id.is_empty() => id,
            _ => state.generate_id(kind),
        };
        if state
            .entities
            .get(&kind)
            .is_some_and(|all| all.iter().any(|e| e.id == id))
        {
            return Err(RemoteError::rejected(
                409,
                format!("{kind} '{id}' already exists"),
            ));
        }
        attributes.insert(
            "links".to_string(),
            json!({"self": format!("memory://{kind}/{id}")}),
        );

        let entity = Entity::new(id, attributes);
        state.entities.entry(kind).or_default().push(entity.clone());
        Ok(entity)
    }

    async fn update(
        &self,
        kind: ResourceKind,
        id: &str,
        attributes: AttributeMap,
    ) -> Result<Entity, RemoteError> {
        self.delay().await;
        let mut state = self.state.lock();
        let name = attributes
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string);
        state.record(Operation::Update, kind, name.as_deref())?;

        let entity = state
            .entities
            .get_mut(&kind)
            .and_then(|all| all.iter_mut().find(|e| e.id == id))
            .ok_or_else(|| RemoteError::rejected(404, format!("{kind} '{id}' not found")))?;
        for (key, value) in attributes {
            if key != "id" {
                entity.attributes.insert(key, value);
            }
        }
        Ok(entity.clone())
    }
}
