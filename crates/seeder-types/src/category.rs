//! Seed categories and remote resource kinds
//!
//! [`Category`] is the fixed, ordered list of top-level sections of a seed
//! document. Its declaration order is the processing order of a reconcile pass
//! and its `as_str` name is the key used in [`SeedStatus`](crate::SeedStatus).
//!
//! [`ResourceKind`] names the entity types of the remote API, including the
//! nested ones (users, endpoints, role assignments) that have no category of
//! their own.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Top-level section of a seed document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Keystone roles
    Roles,
    /// Implied roles
    RoleInferences,
    /// Keystone regions
    Regions,
    /// Keystone services and their endpoints
    Services,
    /// Nova flavors
    Flavors,
    /// Manila share types
    ShareTypes,
    /// Placement resource classes
    ResourceClasses,
    /// Keystone domains with groups, projects, users and role assignments
    Domains,
    /// Neutron RBAC policies
    RbacPolicies,
    /// Cinder volume types
    VolumeTypes,
}

impl Category {
    /// All categories in processing order
    pub const ALL: [Category; 10] = [
        Category::Roles,
        Category::RoleInferences,
        Category::Regions,
        Category::Services,
        Category::Flavors,
        Category::ShareTypes,
        Category::ResourceClasses,
        Category::Domains,
        Category::RbacPolicies,
        Category::VolumeTypes,
    ];

    /// Status key / document key of this category
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Roles => "roles",
            Self::RoleInferences => "role_inferences",
            Self::Regions => "regions",
            Self::Services => "services",
            Self::Flavors => "flavors",
            Self::ShareTypes => "share_types",
            Self::ResourceClasses => "resource_classes",
            Self::Domains => "domains",
            Self::RbacPolicies => "rbac_policies",
            Self::VolumeTypes => "volume_types",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownCategory(s.to_string()))
    }
}

/// Entity type of the remote resource API
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Domain,
    Project,
    User,
    Group,
    Role,
    RoleInference,
    RoleAssignment,
    Region,
    Service,
    Endpoint,
    Flavor,
    ShareType,
    ResourceClass,
    Network,
    RbacPolicy,
    VolumeType,
}

impl ResourceKind {
    /// Lowercase name used in logs, cache keys and snapshots
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Project => "project",
            Self::User => "user",
            Self::Group => "group",
            Self::Role => "role",
            Self::RoleInference => "role_inference",
            Self::RoleAssignment => "role_assignment",
            Self::Region => "region",
            Self::Service => "service",
            Self::Endpoint => "endpoint",
            Self::Flavor => "flavor",
            Self::ShareType => "share_type",
            Self::ResourceClass => "resource_class",
            Self::Network => "network",
            Self::RbacPolicy => "rbac_policy",
            Self::VolumeType => "volume_type",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_names_roundtrip() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn category_order_matches_declaration() {
        let mut sorted = Category::ALL;
        sorted.sort();
        assert_eq!(sorted, Category::ALL);
    }

    #[test]
    fn unknown_category_rejected() {
        let err = "endpoints".parse::<Category>().unwrap_err();
        assert_eq!(err, ValidationError::UnknownCategory("endpoints".to_string()));
    }

    #[test]
    fn serde_uses_status_keys() {
        let json = serde_json::to_string(&Category::RoleInferences).unwrap();
        assert_eq!(json, "\"role_inferences\"");
    }
}
