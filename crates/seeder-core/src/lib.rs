//! Seeder core - declarative seeding of cloud resource APIs
//!
//! Applies a [`SeedDocument`](seeder_types::SeedDocument) against a remote
//! resource API by diff-and-upsert:
//! - Looks every declared entity up by its natural key
//! - Creates what is missing, updates what differs, leaves the rest alone
//! - Never deletes anything
//! - Records failed categories so the next pass retries only those
//!
//! # Example
//!
//! ```rust,ignore
//! use seeder_core::{MemoryApi, SeedOrchestrator, SeedSession, SeederConfig};
//! use seeder_types::{SeedDocument, SeedStatus};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session = SeedSession::start(Arc::new(MemoryApi::new()), SeederConfig::default());
//! let orchestrator = SeedOrchestrator::new(session);
//!
//! let doc = SeedDocument::load("seeds/base.yaml")?;
//! let outcome = orchestrator.reconcile(&doc, &SeedStatus::default()).await;
//! println!("complete: {}", outcome.complete);
//! orchestrator.shutdown().await;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod compare;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod remote;
pub mod resolve;
pub mod session;
pub mod simulator;
pub mod store;
pub mod sync;

pub use compare::{attributes_match, mismatched_attributes, values_equal};
pub use config::{CacheSettings, ConfigError, RemoteSettings, RequeuePolicy, SeederConfig};
pub use error::{RemoteError, RemoteErrorKind, SeedError, SeedResult};
pub use orchestrator::{
    record_completion, CategoryOutcome, CategoryReport, ReconcileOutcome, SeedOrchestrator,
    SEED_COMPLETE_GAUGE,
};
pub use remote::{DeadlineApi, Entity, Filter, ResourceApi};
pub use resolve::Resolver;
pub use seeder_cache::{CacheKey, IdCache};
pub use session::SeedSession;
pub use simulator::{CallCounts, MemoryApi, Operation, RemoteSnapshot};
pub use store::{MemorySeedStore, Reconciler, SeedStore, StoreError, StoredSeed};
pub use sync::{Applied, Desired, Lookup, SyncSummary, Synchronizer};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the seeder
    pub use crate::{
        MemoryApi, ReconcileOutcome, ResourceApi, SeedError, SeedOrchestrator, SeedSession,
        SeederConfig, SyncSummary,
    };
    pub use seeder_types::{Category, SeedDocument, SeedSpec, SeedStatus};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
