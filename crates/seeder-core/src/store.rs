//! Desired-state store and the reconcile driver
//!
//! The store holds seed documents and their status. The [`Reconciler`] runs
//! the Get → Reconcile → Update cycle for one document and reports when it
//! should run again.

use crate::config::RequeuePolicy;
use crate::orchestrator::{ReconcileOutcome, SeedOrchestrator};
use async_trait::async_trait;
use dashmap::DashMap;
use seeder_types::{SeedDocument, SeedStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store cannot be reached
    #[error("seed store unavailable: {0}")]
    Unavailable(String),

    /// The document disappeared between read and status update
    #[error("seed document '{0}' no longer exists")]
    Gone(String),
}

/// Document together with its last stored status
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredSeed {
    pub document: SeedDocument,
    pub status: SeedStatus,
}

/// Source of seed documents and sink for their status
#[async_trait]
pub trait SeedStore: Send + Sync {
    /// Fetch a document and its status; `None` if it does not exist
    async fn get(&self, name: &str) -> Result<Option<StoredSeed>, StoreError>;

    /// Replace the status of a document
    async fn update_status(&self, name: &str, status: SeedStatus) -> Result<(), StoreError>;

    /// Names of all stored documents
    async fn names(&self) -> Result<Vec<String>, StoreError>;
}

/// In-memory [`SeedStore`]
#[derive(Debug, Default)]
pub struct MemorySeedStore {
    seeds: DashMap<String, StoredSeed>,
}

impl MemorySeedStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a document, keeping an existing status
    pub fn put(&self, document: SeedDocument) {
        self.seeds
            .entry(document.name.clone())
            .and_modify(|stored| stored.document = document.clone())
            .or_insert_with(|| StoredSeed {
                document,
                status: SeedStatus::default(),
            });
    }

    /// Remove a document
    pub fn remove(&self, name: &str) -> Option<StoredSeed> {
        self.seeds.remove(name).map(|(_, stored)| stored)
    }

    /// Current status of a document
    #[must_use]
    pub fn status(&self, name: &str) -> Option<SeedStatus> {
        self.seeds.get(name).map(|stored| stored.status.clone())
    }

    /// Stored document names, sorted
    #[must_use]
    pub fn sorted_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.seeds.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

#[async_trait]
impl SeedStore for MemorySeedStore {
    async fn get(&self, name: &str) -> Result<Option<StoredSeed>, StoreError> {
        Ok(self.seeds.get(name).map(|stored| stored.clone()))
    }

    async fn update_status(&self, name: &str, status: SeedStatus) -> Result<(), StoreError> {
        match self.seeds.get_mut(name) {
            Some(mut stored) => {
                stored.status = status;
                Ok(())
            }
            None => Err(StoreError::Gone(name.to_string())),
        }
    }

    async fn names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.sorted_names())
    }
}

/// Drives reconciliation of stored documents
#[derive(Debug)]
pub struct Reconciler<S> {
    orchestrator: SeedOrchestrator,
    store: S,
    policy: RequeuePolicy,
}

impl<S: SeedStore> Reconciler<S> {
    /// Create reconciler with the session's requeue policy
    #[must_use]
    pub fn new(orchestrator: SeedOrchestrator, store: S) -> Self {
        let policy = orchestrator.session().config().requeue;
        Self {
            orchestrator,
            store,
            policy,
        }
    }

    /// Backing store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reconcile one document and store its new status
    ///
    /// Returns the requeue delay, or `None` if the document no longer exists.
    ///
    /// # Errors
    /// - `StoreError` if reading the document or writing its status fails
    pub async fn reconcile(&self, name: &str) -> Result<Option<Duration>, StoreError> {
        Ok(self
            .reconcile_with_outcome(name)
            .await?
            .map(|outcome| outcome.requeue_after(&self.policy)))
    }

    /// Reconcile one document and return the full pass outcome
    ///
    /// # Errors
    /// - `StoreError` if reading the document or writing its status fails
    pub async fn reconcile_with_outcome(
        &self,
        name: &str,
    ) -> Result<Option<ReconcileOutcome>, StoreError> {
        let Some(stored) = self.store.get(name).await? else {
            tracing::debug!(seed = name, "seed document gone, nothing to reconcile");
            return Ok(None);
        };

        let outcome = self
            .orchestrator
            .reconcile(&stored.document, &stored.status)
            .await;
        self.store
            .update_status(name, outcome.status.clone())
            .await?;
        Ok(Some(outcome))
    }

    /// Close the underlying session
    pub async fn shutdown(self) {
        self.orchestrator.shutdown().await;
    }
}

impl<S: SeedStore + 'static> Reconciler<S> {
    /// Reconcile every stored document
    ///
    /// At most `max_concurrent_reconciles` documents are in flight at once.
    /// Returns each document's requeue delay, or the store error it hit.
    ///
    /// # Errors
    /// - `StoreError` if the document names cannot be listed
    pub async fn reconcile_all(
        self: &Arc<Self>,
    ) -> Result<Vec<(String, Result<Option<Duration>, StoreError>)>, StoreError> {
        let names = self.store.names().await?;
        let limit = self
            .orchestrator
            .session()
            .config()
            .max_concurrent_reconciles
            .max(1);
        let permits = Arc::new(Semaphore::new(limit));
        let mut tasks = JoinSet::new();

        for (index, name) in names.into_iter().enumerate() {
            let this = Arc::clone(self);
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await;
                let result = this.reconcile(&name).await;
                (index, name, result)
            });
        }

        let mut results = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(entry) => results.push(entry),
                Err(e) => tracing::error!(error = %e, "reconcile task panicked"),
            }
        }
        results.sort_by_key(|(index, _, _)| *index);
        Ok(results
            .into_iter()
            .map(|(_, name, result)| (name, result))
            .collect())
    }
}
