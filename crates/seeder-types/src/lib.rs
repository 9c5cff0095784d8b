//! Seeder data model
//!
//! Typed desired state for the seeder and the status it reports back.
//!
//! # Core Concepts
//!
//! - [`SeedDocument`]: named, versioned [`SeedSpec`] as kept by the desired-state store
//! - [`Category`]: fixed, ordered list of seed sections (the status keys)
//! - [`ResourceKind`]: entity types of the remote resource API
//! - [`SeedStatus`]: failed categories with their structured error, last applied version
//! - [`FieldMapping`]: explicit spec-field to remote-attribute projection
//! - [`CompoundRef`]: `scope@name` references between entities
//!
//! # Example
//!
//! ```rust,ignore
//! use seeder_types::{Category, SeedDocument};
//!
//! let doc = SeedDocument::load("seeds/base.yaml")?;
//! for (category, problem) in doc.spec.validate() {
//!     eprintln!("{category}: {problem}");
//! }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod attributes;
mod category;
mod document;
mod error;
mod reference;
mod spec;
mod status;

pub use attributes::{AttributeMap, FieldMapping};
pub use category::{Category, ResourceKind};
pub use document::SeedDocument;
pub use error::{DocumentError, ValidationError};
pub use reference::{CompoundRef, REFERENCE_SEPARATOR};
pub use spec::{
    AssignmentActor, AssignmentScope, DomainSpec, EndpointSpec, FlavorSpec, GroupSpec,
    ProjectSpec, RbacPolicySpec, RegionSpec, RoleAssignmentSpec, RoleInferenceSpec, RoleSpec,
    SeedSpec, ServiceSpec, ShareTypeSpec, UserSpec, VolumeTypeSpec,
};
pub use status::{CategoryFailure, FailureKind, SeedStatus};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
