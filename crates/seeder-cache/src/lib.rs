//! Seeder identifier resolution cache
//!
//! Short-lived mapping from human-readable natural keys (`acme`, `acme@alice`)
//! to the identifiers the remote API assigned them, scoped to one API session.
//!
//! # Lifecycle
//!
//! ```text
//! IdCache::start ──► sweep task (every sweep_interval) ──► shutdown / drop
//!        │
//!        ├── lookup(key)              miss → caller looks up remotely
//!        └── insert(key, id, ttl)     only after a unique match
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod cache;

pub use cache::{CacheConfig, CacheKey, IdCache};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
