//! Seed specification: the desired catalog of one seed document
//!
//! Each category holds an ordered list of resource specs. A resource spec has a
//! natural key, typed recognized fields and an open `extra` bag (every key the
//! document carries that the spec does not type). Specs whose attributes need
//! no remote lookup expose them through `attributes()`; the ones holding
//! references are mapped by the synchronizer once the references resolve.

use crate::attributes::{AttributeMap, FieldMapping};
use crate::category::Category;
use crate::error::ValidationError;
use crate::reference::CompoundRef;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Desired state of one seed document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedSpec {
    /// Seeds that should be applied before this one (declared, not consulted)
    #[serde(rename = "requires", skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<RoleSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub role_inferences: Vec<RoleInferenceSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub regions: Vec<RegionSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<ServiceSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub flavors: Vec<FlavorSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub share_types: Vec<ShareTypeSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resource_classes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<DomainSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rbac_policies: Vec<RbacPolicySpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volume_types: Vec<VolumeTypeSpec>,
}

impl SeedSpec {
    /// Number of top-level entities declared for a category
    #[must_use]
    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::Roles => self.roles.len(),
            Category::RoleInferences => self.role_inferences.len(),
            Category::Regions => self.regions.len(),
            Category::Services => self.services.len(),
            Category::Flavors => self.flavors.len(),
            Category::ShareTypes => self.share_types.len(),
            Category::ResourceClasses => self.resource_classes.len(),
            Category::Domains => self.domains.len(),
            Category::RbacPolicies => self.rbac_policies.len(),
            Category::VolumeTypes => self.volume_types.len(),
        }
    }

    /// Whether the document declares anything for a category
    #[inline]
    #[must_use]
    pub fn is_present(&self, category: Category) -> bool {
        self.count(category) > 0
    }

    /// Categories with at least one entity, in processing order
    #[must_use]
    pub fn present_categories(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| self.is_present(*c))
            .collect()
    }

    /// Check every entity for problems that no retry can fix
    ///
    /// Returns all problems found, tagged with their category.
    #[must_use]
    pub fn validate(&self) -> Vec<(Category, ValidationError)> {
        let mut problems = Vec::new();
        let mut check = |category: Category, result: Result<(), ValidationError>| {
            if let Err(e) = result {
                problems.push((category, e));
            }
        };

        for role in &self.roles {
            check(Category::Roles, role.validate());
        }
        for inference in &self.role_inferences {
            check(Category::RoleInferences, inference.validate());
        }
        for region in &self.regions {
            check(Category::Regions, region.validate());
        }
        for service in &self.services {
            check(Category::Services, service.validate());
        }
        for flavor in &self.flavors {
            check(Category::Flavors, flavor.validate());
        }
        for share_type in &self.share_types {
            check(Category::ShareTypes, share_type.validate());
        }
        for class in &self.resource_classes {
            check(Category::ResourceClasses, require("resource_class", "name", class));
        }
        for domain in &self.domains {
            check(Category::Domains, domain.validate());
        }
        for policy in &self.rbac_policies {
            check(Category::RbacPolicies, policy.validate());
        }
        for volume_type in &self.volume_types {
            check(Category::VolumeTypes, volume_type.validate());
        }
        problems
    }
}

fn require(kind: &str, field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::missing(kind, field))
    } else {
        Ok(())
    }
}

/// Keystone role, optionally domain specific
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleSpec {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: AttributeMap,
}

impl RoleSpec {
    /// Recognized attributes plus extra bag
    #[must_use]
    pub fn attributes(&self) -> AttributeMap {
        FieldMapping::new()
            .field("name", self.name.as_str())
            .optional("domain_id", self.domain_id.as_deref())
            .optional("description", self.description.as_deref())
            .with_extra(&self.extra)
    }

    /// Check required fields
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("role", "name", &self.name)
    }
}

/// Implied role: granting `prior_role` also grants `implied_role`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleInferenceSpec {
    pub prior_role: String,
    pub implied_role: String,
}

impl RoleInferenceSpec {
    /// Check required fields
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("role_inference", "prior_role", &self.prior_role)?;
        require("role_inference", "implied_role", &self.implied_role)
    }
}

/// Keystone region, keyed by its id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionSpec {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_region: Option<String>,
    #[serde(flatten)]
    pub extra: AttributeMap,
}

impl RegionSpec {
    /// Recognized attributes plus extra bag
    #[must_use]
    pub fn attributes(&self) -> AttributeMap {
        FieldMapping::new()
            .field("id", self.id.as_str())
            .optional("description", self.description.as_deref())
            .optional("parent_region_id", self.parent_region.as_deref())
            .with_extra(&self.extra)
    }

    /// Check required fields
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("region", "id", &self.id)
    }
}

/// Keystone service with its endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub endpoints: Vec<EndpointSpec>,
    #[serde(flatten)]
    pub extra: AttributeMap,
}

impl ServiceSpec {
    /// Recognized attributes plus extra bag
    #[must_use]
    pub fn attributes(&self) -> AttributeMap {
        FieldMapping::new()
            .field("name", self.name.as_str())
            .field("type", self.service_type.as_str())
            .optional("description", self.description.as_deref())
            .optional("enabled", self.enabled)
            .with_extra(&self.extra)
    }

    /// Check required fields and every endpoint
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("service", "name", &self.name)?;
        require("service", "type", &self.service_type)?;
        self.endpoints.iter().try_for_each(EndpointSpec::validate)
    }
}

/// Endpoint of a service in one region
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointSpec {
    /// `public`, `internal` or `admin`
    pub interface: String,
    /// Region id
    pub region: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(flatten)]
    pub extra: AttributeMap,
}

impl EndpointSpec {
    /// Recognized attributes for an endpoint of `service_id`
    #[must_use]
    pub fn attributes(&self, service_id: &str) -> AttributeMap {
        FieldMapping::new()
            .field("service_id", service_id)
            .field("region_id", self.region.as_str())
            .field("interface", self.interface.as_str())
            .field("url", self.url.as_str())
            .optional("enabled", self.enabled)
            .with_extra(&self.extra)
    }

    /// Check interface, region and url
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("endpoint", "region", &self.region)?;
        match self.interface.as_str() {
            "public" | "internal" | "admin" => {}
            other => {
                return Err(ValidationError::Unsupported {
                    field: "endpoint interface".to_string(),
                    value: other.to_string(),
                })
            }
        }
        url::Url::parse(&self.url)
            .map(|_| ())
            .map_err(|e| ValidationError::InvalidUrl {
                url: self.url.clone(),
                reason: e.to_string(),
            })
    }
}

/// Nova flavor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlavorSpec {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub vcpus: u32,
    /// Memory in MiB
    pub ram: u64,
    /// Root disk in GiB
    pub disk: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ephemeral: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swap: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rxtx_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_specs: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: AttributeMap,
}

impl FlavorSpec {
    /// Recognized attributes plus extra bag
    #[must_use]
    pub fn attributes(&self) -> AttributeMap {
        FieldMapping::new()
            .field("name", self.name.as_str())
            .optional("id", self.id.as_deref())
            .field("vcpus", self.vcpus)
            .field("ram", self.ram)
            .field("disk", self.disk)
            .optional("OS-FLV-EXT-DATA:ephemeral", self.ephemeral)
            .optional("swap", self.swap)
            .optional("rxtx_factor", self.rxtx_factor)
            .optional("os-flavor-access:is_public", self.is_public)
            .dictionary("extra_specs", &self.extra_specs)
            .with_extra(&self.extra)
    }

    /// Check required fields
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("flavor", "name", &self.name)?;
        if self.vcpus == 0 || self.ram == 0 {
            return Err(ValidationError::conflict(
                "flavor",
                format!("{} needs non-zero vcpus and ram", self.name),
            ));
        }
        Ok(())
    }
}

/// Manila share type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareTypeSpec {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub specs: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: AttributeMap,
}

impl ShareTypeSpec {
    /// Recognized attributes plus extra bag
    #[must_use]
    pub fn attributes(&self) -> AttributeMap {
        FieldMapping::new()
            .field("name", self.name.as_str())
            .optional("description", self.description.as_deref())
            .optional("share_type_access:is_public", self.is_public)
            .dictionary("extra_specs", &self.specs)
            .with_extra(&self.extra)
    }

    /// Check required fields
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("share_type", "name", &self.name)
    }
}

/// Cinder volume type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeTypeSpec {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_specs: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: AttributeMap,
}

impl VolumeTypeSpec {
    /// Recognized attributes plus extra bag
    #[must_use]
    pub fn attributes(&self) -> AttributeMap {
        FieldMapping::new()
            .field("name", self.name.as_str())
            .optional("description", self.description.as_deref())
            .optional("os-volume-type-access:is_public", self.is_public)
            .dictionary("extra_specs", &self.extra_specs)
            .with_extra(&self.extra)
    }

    /// Check required fields
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("volume_type", "name", &self.name)
    }
}

/// Keystone domain and the identity entities that live in it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainSpec {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub projects: Vec<ProjectSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<UserSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub role_assignments: Vec<RoleAssignmentSpec>,
    #[serde(flatten)]
    pub extra: AttributeMap,
}

impl DomainSpec {
    /// Recognized attributes plus extra bag
    #[must_use]
    pub fn attributes(&self) -> AttributeMap {
        FieldMapping::new()
            .field("name", self.name.as_str())
            .optional("description", self.description.as_deref())
            .optional("enabled", self.enabled)
            .with_extra(&self.extra)
    }

    /// Check the domain and everything nested in it
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("domain", "name", &self.name)?;
        for group in &self.groups {
            require("group", "name", &group.name)?;
        }
        for project in &self.projects {
            require("project", "name", &project.name)?;
        }
        for user in &self.users {
            user.validate()?;
        }
        self.role_assignments
            .iter()
            .try_for_each(RoleAssignmentSpec::validate)
    }
}

/// Group within a domain
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupSpec {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: AttributeMap,
}

impl GroupSpec {
    /// Recognized attributes plus extra bag
    #[must_use]
    pub fn attributes(&self, domain_id: &str) -> AttributeMap {
        FieldMapping::new()
            .field("name", self.name.as_str())
            .field("domain_id", domain_id)
            .optional("description", self.description.as_deref())
            .with_extra(&self.extra)
    }
}

/// Project within a domain
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSpec {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Parent project name in the same domain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(flatten)]
    pub extra: AttributeMap,
}

/// User within a domain
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSpec {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Default project as `domain@project`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_project: Option<String>,
    #[serde(flatten)]
    pub extra: AttributeMap,
}

impl UserSpec {
    /// Check name and default project reference
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("user", "name", &self.name)?;
        if let Some(project) = &self.default_project {
            CompoundRef::parse(project)?;
        }
        Ok(())
    }
}

/// Grant of a role to a user or group on a project or domain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleAssignmentSpec {
    /// Role name
    pub role: String,
    /// User as `domain@name`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Group as `domain@name`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Project as `domain@name`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Project by id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Domain name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub inherited: bool,
}

/// Who receives a role assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentActor {
    User(CompoundRef),
    Group(CompoundRef),
}

/// Where a role assignment applies
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentScope {
    Project(CompoundRef),
    ProjectId(String),
    Domain(String),
}

impl RoleAssignmentSpec {
    /// Parse the actor reference
    ///
    /// # Errors
    /// - `ValidationError::Conflict` unless exactly one of user/group is set
    /// - `ValidationError::MalformedReference` for a malformed reference
    pub fn actor(&self) -> Result<AssignmentActor, ValidationError> {
        match (&self.user, &self.group) {
            (Some(user), None) => Ok(AssignmentActor::User(CompoundRef::parse(user)?)),
            (None, Some(group)) => Ok(AssignmentActor::Group(CompoundRef::parse(group)?)),
            _ => Err(ValidationError::conflict(
                "role_assignment",
                format!("role '{}' needs exactly one of user or group", self.role),
            )),
        }
    }

    /// Parse the scope reference
    ///
    /// # Errors
    /// - `ValidationError::Conflict` unless exactly one of project/project_id/domain is set
    /// - `ValidationError::MalformedReference` for a malformed project reference
    pub fn scope(&self) -> Result<AssignmentScope, ValidationError> {
        match (&self.project, &self.project_id, &self.domain) {
            (Some(project), None, None) => {
                Ok(AssignmentScope::Project(CompoundRef::parse(project)?))
            }
            (None, Some(id), None) if !id.is_empty() => Ok(AssignmentScope::ProjectId(id.clone())),
            (None, None, Some(domain)) if !domain.is_empty() => {
                Ok(AssignmentScope::Domain(domain.clone()))
            }
            _ => Err(ValidationError::conflict(
                "role_assignment",
                format!(
                    "role '{}' needs exactly one of project, project_id or domain",
                    self.role
                ),
            )),
        }
    }

    /// Check role, actor and scope
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("role_assignment", "role", &self.role)?;
        self.actor()?;
        self.scope()?;
        Ok(())
    }
}

/// Neutron RBAC policy sharing an object with a project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RbacPolicySpec {
    /// Only `network` is supported
    pub object_type: String,
    /// Id of the shared object
    pub object_id: String,
    /// e.g. `access_as_shared`
    pub action: String,
    /// Target project as `domain@project`
    pub target: String,
}

impl RbacPolicySpec {
    /// Check object type, keys and target reference
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.object_type != "network" {
            return Err(ValidationError::Unsupported {
                field: "rbac object_type".to_string(),
                value: self.object_type.clone(),
            });
        }
        require("rbac_policy", "object_id", &self.object_id)?;
        require("rbac_policy", "action", &self.action)?;
        CompoundRef::parse(&self.target)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn unknown_keys_land_in_extra() {
        let role: RoleSpec =
            serde_yaml::from_str("name: admin\ndescription: Admin\nimmutable: true\n").unwrap();

        assert_eq!(role.name, "admin");
        assert_eq!(role.extra.get("immutable"), Some(&json!(true)));

        let attrs = role.attributes();
        assert_eq!(attrs["description"], json!("Admin"));
        assert_eq!(attrs["immutable"], json!(true));
        assert!(!attrs.contains_key("domain_id"));
    }

    #[test]
    fn flavor_maps_to_remote_attribute_names() {
        let flavor = FlavorSpec {
            name: "m1.small".to_string(),
            vcpus: 1,
            ram: 2048,
            disk: 20,
            ephemeral: Some(0),
            is_public: Some(true),
            ..FlavorSpec::default()
        };
        let attrs = flavor.attributes();

        assert_eq!(attrs["OS-FLV-EXT-DATA:ephemeral"], json!(0));
        assert_eq!(attrs["os-flavor-access:is_public"], json!(true));
        assert!(!attrs.contains_key("is_public"));
        assert!(!attrs.contains_key("swap"));
    }

    #[test]
    fn present_categories_follow_processing_order() {
        let spec = SeedSpec {
            domains: vec![DomainSpec {
                name: "alpha".to_string(),
                ..DomainSpec::default()
            }],
            roles: vec![RoleSpec {
                name: "admin".to_string(),
                ..RoleSpec::default()
            }],
            ..SeedSpec::default()
        };

        assert_eq!(
            spec.present_categories(),
            vec![Category::Roles, Category::Domains]
        );
    }

    #[test]
    fn assignment_requires_exactly_one_actor() {
        let spec = RoleAssignmentSpec {
            role: "member".to_string(),
            user: Some("acme@alice".to_string()),
            group: Some("acme@ops".to_string()),
            domain: Some("acme".to_string()),
            ..RoleAssignmentSpec::default()
        };
        assert!(matches!(
            spec.validate(),
            Err(ValidationError::Conflict { .. })
        ));
    }

    #[test]
    fn assignment_scope_by_project_id() {
        let spec = RoleAssignmentSpec {
            role: "member".to_string(),
            group: Some("acme@ops".to_string()),
            project_id: Some("p-1".to_string()),
            ..RoleAssignmentSpec::default()
        };
        assert_eq!(spec.scope().unwrap(), AssignmentScope::ProjectId("p-1".to_string()));
        assert!(matches!(spec.actor().unwrap(), AssignmentActor::Group(_)));
    }

    #[test]
    fn endpoint_url_must_parse() {
        let endpoint = EndpointSpec {
            interface: "public".to_string(),
            region: "eu-1".to_string(),
            url: "not a url".to_string(),
            ..EndpointSpec::default()
        };
        assert!(matches!(
            endpoint.validate(),
            Err(ValidationError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn validate_collects_problems_per_category() {
        let spec = SeedSpec {
            regions: vec![RegionSpec::default()],
            rbac_policies: vec![RbacPolicySpec {
                object_type: "network".to_string(),
                object_id: "net-1".to_string(),
                action: "access_as_shared".to_string(),
                target: "no-separator".to_string(),
            }],
            ..SeedSpec::default()
        };

        let problems = spec.validate();
        assert_eq!(problems.len(), 2);
        assert_eq!(problems[0].0, Category::Regions);
        assert_eq!(problems[1].0, Category::RbacPolicies);
    }
}
