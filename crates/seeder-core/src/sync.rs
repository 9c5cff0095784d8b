//! Per-category diff-and-upsert synchronizers
//!
//! Every declared entity goes through the same cycle:
//!
//! ```text
//! natural key ──► lookup ──┬── none ─────────────► create
//!                          ├── one, differs ─────► update (declared fields only)
//!                          ├── one, satisfied ───► nothing
//!                          └── several ──────────► AmbiguousMatch
//! ```
//!
//! Processing inside a category stops at the first failing entity; entities
//! already applied stay applied.

use crate::compare::mismatched_attributes;
use crate::error::{SeedError, SeedResult};
use crate::remote::{DeadlineApi, Entity, Filter};
use crate::resolve::Resolver;
use seeder_types::{
    AssignmentActor, AssignmentScope, AttributeMap, Category, CompoundRef, DomainSpec,
    EndpointSpec, FieldMapping, FlavorSpec, ProjectSpec, RbacPolicySpec, RegionSpec,
    ResourceKind, RoleAssignmentSpec, RoleInferenceSpec, RoleSpec, SeedSpec, ServiceSpec,
    ShareTypeSpec, UserSpec, ValidationError, VolumeTypeSpec,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

/// Counts of what one category pass changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    /// Entities that did not exist remotely
    pub created: usize,
    /// Entities whose declared attributes differed
    pub updated: usize,
    /// Entities already satisfying the seed
    pub unchanged: usize,
}

impl SyncSummary {
    /// Record one applied entity
    pub fn record(&mut self, applied: &Applied) {
        match applied {
            Applied::Created(_) => self.created += 1,
            Applied::Updated(_) => self.updated += 1,
            Applied::Unchanged(_) => self.unchanged += 1,
        }
    }

    /// Entities looked at
    #[inline]
    #[must_use]
    pub fn total(&self) -> usize {
        self.created + self.updated + self.unchanged
    }

    /// Check if nothing was written
    #[inline]
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.created == 0 && self.updated == 0
    }
}

/// What an upsert did
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    /// Created by this upsert
    Created(Entity),
    /// Updated by this upsert
    Updated(Entity),
    /// Left as found
    Unchanged(Entity),
}

impl Applied {
    /// Remote entity after the upsert
    #[must_use]
    pub fn into_entity(self) -> Entity {
        match self {
            Self::Created(e) | Self::Updated(e) | Self::Unchanged(e) => e,
        }
    }
}

/// How the existing remote entity is found
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// List with a filter; zero or one match expected
    Filter(Filter),
    /// Get by a declared id
    Id(String),
}

/// Entity as the seed wants it
#[derive(Debug, Clone, PartialEq)]
pub struct Desired {
    /// Remote resource type
    pub kind: ResourceKind,
    /// Natural key, used in logs and errors
    pub key: String,
    /// How to find the existing entity
    pub lookup: Lookup,
    /// Declared remote attributes
    pub attributes: AttributeMap,
}

impl Desired {
    /// Entity found by a filter
    #[must_use]
    pub fn by_filter(
        kind: ResourceKind,
        key: impl Into<String>,
        filter: Filter,
        attributes: AttributeMap,
    ) -> Self {
        Self {
            kind,
            key: key.into(),
            lookup: Lookup::Filter(filter),
            attributes,
        }
    }

    /// Entity found by its declared id
    #[must_use]
    pub fn by_id(kind: ResourceKind, id: impl Into<String>, attributes: AttributeMap) -> Self {
        let id = id.into();
        Self {
            kind,
            key: id.clone(),
            lookup: Lookup::Id(id),
            attributes,
        }
    }
}

/// Applies seed categories against the remote API
#[derive(Debug, Clone, Copy)]
pub struct Synchronizer<'s> {
    api: &'s DeadlineApi,
    resolver: Resolver<'s>,
}

impl<'s> Synchronizer<'s> {
    /// Create synchronizer
    #[inline]
    #[must_use]
    pub fn new(api: &'s DeadlineApi, resolver: Resolver<'s>) -> Self {
        Self { api, resolver }
    }

    /// Apply one category of a seed
    ///
    /// # Errors
    /// - the first error of any entity in the category
    pub async fn sync_category(&self, category: Category, spec: &SeedSpec) -> SeedResult<SyncSummary> {
        let mut summary = SyncSummary::default();
        match category {
            Category::Roles => {
                for role in &spec.roles {
                    self.seed_role(role, &mut summary).await?;
                }
            }
            Category::RoleInferences => {
                for inference in &spec.role_inferences {
                    self.seed_role_inference(inference, &mut summary).await?;
                }
            }
            Category::Regions => {
                for region in &spec.regions {
                    self.seed_region(region, &mut summary).await?;
                }
            }
            Category::Services => {
                for service in &spec.services {
                    self.seed_service(service, &mut summary).await?;
                }
            }
            Category::Flavors => {
                for flavor in &spec.flavors {
                    self.seed_flavor(flavor, &mut summary).await?;
                }
            }
            Category::ShareTypes => {
                for share_type in &spec.share_types {
                    self.seed_share_type(share_type, &mut summary).await?;
                }
            }
            Category::ResourceClasses => {
                for class in &spec.resource_classes {
                    self.seed_resource_class(class, &mut summary).await?;
                }
            }
            Category::Domains => {
                for domain in &spec.domains {
                    self.seed_domain(domain, &mut summary).await?;
                }
            }
            Category::RbacPolicies => {
                for policy in &spec.rbac_policies {
                    self.seed_rbac_policy(policy, &mut summary).await?;
                }
            }
            Category::VolumeTypes => {
                for volume_type in &spec.volume_types {
                    self.seed_volume_type(volume_type, &mut summary).await?;
                }
            }
        }
        Ok(summary)
    }

    /// Find, then create or update one entity
    ///
    /// Updates carry every declared attribute except the identity ones.
    ///
    /// # Errors
    /// - `SeedError::AmbiguousMatch` if the lookup finds more than one entity
    /// - `SeedError::Remote` on API failure
    pub async fn upsert(&self, desired: Desired, summary: &mut SyncSummary) -> SeedResult<Entity> {
        let Desired {
            kind,
            key,
            lookup,
            mut attributes,
        } = desired;

        let existing = match &lookup {
            Lookup::Filter(filter) => {
                let mut found = self.api.list(kind, filter).await?;
                match found.len() {
                    0 | 1 => found.pop(),
                    n => return Err(SeedError::ambiguous(kind, key, n)),
                }
            }
            Lookup::Id(id) => self.api.get(kind, id).await?,
        };

        let applied = match existing {
            None => {
                let created = self.api.create(kind, attributes).await?;
                info!(%kind, key = %key, id = %created.id, "created");
                Applied::Created(created)
            }
            Some(current) => {
                let changed = mismatched_attributes(&attributes, &current.attributes);
                if changed.is_empty() {
                    debug!(%kind, key = %key, id = %current.id, "unchanged");
                    Applied::Unchanged(current)
                } else {
                    info!(%kind, key = %key, id = %current.id, fields = ?changed, "updating");
                    attributes.remove("id");
                    let updated = self.api.update(kind, &current.id, attributes).await?;
                    Applied::Updated(updated)
                }
            }
        };
        summary.record(&applied);
        Ok(applied.into_entity())
    }

    async fn seed_role(&self, role: &RoleSpec, summary: &mut SyncSummary) -> SeedResult<Entity> {
        role.validate()?;
        let filter = Filter::new()
            .eq("name", role.name.as_str())
            .eq("domain_id", role.domain_id.as_deref().map_or(Value::Null, Value::from));
        let desired = Desired::by_filter(ResourceKind::Role, &role.name, filter, role.attributes());
        self.upsert(desired, summary).await
    }

    async fn seed_role_inference(
        &self,
        inference: &RoleInferenceSpec,
        summary: &mut SyncSummary,
    ) -> SeedResult<Entity> {
        inference.validate()?;
        let prior_id = self.resolver.role_id(&inference.prior_role).await?;
        let implied_id = self.resolver.role_id(&inference.implied_role).await?;
        let attributes = FieldMapping::new()
            .field("prior_role_id", prior_id)
            .field("implied_role_id", implied_id)
            .finish();
        let desired = Desired::by_filter(
            ResourceKind::RoleInference,
            format!("{}->{}", inference.prior_role, inference.implied_role),
            Filter::from_attributes(attributes.clone()),
            attributes,
        );
        self.upsert(desired, summary).await
    }

    async fn seed_region(&self, region: &RegionSpec, summary: &mut SyncSummary) -> SeedResult<Entity> {
        region.validate()?;
        let desired = Desired::by_id(ResourceKind::Region, &region.id, region.attributes());
        self.upsert(desired, summary).await
    }

    async fn seed_service(
        &self,
        service: &ServiceSpec,
        summary: &mut SyncSummary,
    ) -> SeedResult<Entity> {
        service.validate()?;
        let filter = Filter::new()
            .eq("name", service.name.as_str())
            .eq("type", service.service_type.as_str());
        let desired = Desired::by_filter(
            ResourceKind::Service,
            &service.name,
            filter,
            service.attributes(),
        );
        let entity = self.upsert(desired, summary).await?;

        for endpoint in &service.endpoints {
            self.seed_endpoint(&service.name, &entity.id, endpoint, summary)
                .await?;
        }
        Ok(entity)
    }

    async fn seed_endpoint(
        &self,
        service_name: &str,
        service_id: &str,
        endpoint: &EndpointSpec,
        summary: &mut SyncSummary,
    ) -> SeedResult<Entity> {
        endpoint.validate()?;
        let filter = Filter::new()
            .eq("service_id", service_id)
            .eq("region_id", endpoint.region.as_str())
            .eq("interface", endpoint.interface.as_str());
        let desired = Desired::by_filter(
            ResourceKind::Endpoint,
            format!("{service_name}/{}/{}", endpoint.region, endpoint.interface),
            filter,
            endpoint.attributes(service_id),
        );
        self.upsert(desired, summary).await
    }

    async fn seed_flavor(&self, flavor: &FlavorSpec, summary: &mut SyncSummary) -> SeedResult<Entity> {
        flavor.validate()?;
        self.upsert(
            named(ResourceKind::Flavor, &flavor.name, flavor.attributes()),
            summary,
        )
        .await
    }

    async fn seed_share_type(
        &self,
        share_type: &ShareTypeSpec,
        summary: &mut SyncSummary,
    ) -> SeedResult<Entity> {
        share_type.validate()?;
        self.upsert(
            named(ResourceKind::ShareType, &share_type.name, share_type.attributes()),
            summary,
        )
        .await
    }

    async fn seed_resource_class(&self, class: &str, summary: &mut SyncSummary) -> SeedResult<Entity> {
        if class.trim().is_empty() {
            return Err(ValidationError::missing("resource_class", "name").into());
        }
        let attributes = FieldMapping::new().field("name", class).finish();
        self.upsert(named(ResourceKind::ResourceClass, class, attributes), summary)
            .await
    }

    async fn seed_volume_type(
        &self,
        volume_type: &VolumeTypeSpec,
        summary: &mut SyncSummary,
    ) -> SeedResult<Entity> {
        volume_type.validate()?;
        self.upsert(
            named(ResourceKind::VolumeType, &volume_type.name, volume_type.attributes()),
            summary,
        )
        .await
    }

    /// Domain first, then its groups, projects, users and role assignments
    async fn seed_domain(&self, domain: &DomainSpec, summary: &mut SyncSummary) -> SeedResult<Entity> {
        domain.validate()?;
        let entity = self
            .upsert(
                named(ResourceKind::Domain, &domain.name, domain.attributes()),
                summary,
            )
            .await?;

        for group in &domain.groups {
            let desired = Desired::by_filter(
                ResourceKind::Group,
                CompoundRef::new(&domain.name, &group.name).to_string(),
                scoped_filter(&group.name, &entity.id),
                group.attributes(&entity.id),
            );
            self.upsert(desired, summary).await?;
        }
        for project in &domain.projects {
            self.seed_project(&domain.name, &entity.id, project, summary)
                .await?;
        }
        for user in &domain.users {
            self.seed_user(&domain.name, &entity.id, user, summary)
                .await?;
        }
        for assignment in &domain.role_assignments {
            self.seed_role_assignment(assignment, summary).await?;
        }
        Ok(entity)
    }

    async fn seed_project(
        &self,
        domain_name: &str,
        domain_id: &str,
        project: &ProjectSpec,
        summary: &mut SyncSummary,
    ) -> SeedResult<Entity> {
        let parent_id = match &project.parent {
            Some(parent) => Some(
                self.resolver
                    .project_id(&CompoundRef::new(domain_name, parent))
                    .await?,
            ),
            None => None,
        };
        let attributes = FieldMapping::new()
            .field("name", project.name.as_str())
            .field("domain_id", domain_id)
            .optional("description", project.description.as_deref())
            .optional("enabled", project.enabled)
            .optional("parent_id", parent_id)
            .with_extra(&project.extra);
        let desired = Desired::by_filter(
            ResourceKind::Project,
            CompoundRef::new(domain_name, &project.name).to_string(),
            scoped_filter(&project.name, domain_id),
            attributes,
        );
        self.upsert(desired, summary).await
    }

    async fn seed_user(
        &self,
        domain_name: &str,
        domain_id: &str,
        user: &UserSpec,
        summary: &mut SyncSummary,
    ) -> SeedResult<Entity> {
        let default_project_id = match &user.default_project {
            Some(reference) => Some(
                self.resolver
                    .project_id(&CompoundRef::parse(reference)?)
                    .await?,
            ),
            None => None,
        };
        let attributes = FieldMapping::new()
            .field("name", user.name.as_str())
            .field("domain_id", domain_id)
            .optional("description", user.description.as_deref())
            .optional("email", user.email.as_deref())
            .optional("enabled", user.enabled)
            .optional("default_project_id", default_project_id)
            .with_extra(&user.extra);
        let desired = Desired::by_filter(
            ResourceKind::User,
            CompoundRef::new(domain_name, &user.name).to_string(),
            scoped_filter(&user.name, domain_id),
            attributes,
        );
        self.upsert(desired, summary).await
    }

    /// Grants are matched on every resolved id; an existing grant is left alone
    async fn seed_role_assignment(
        &self,
        assignment: &RoleAssignmentSpec,
        summary: &mut SyncSummary,
    ) -> SeedResult<Entity> {
        assignment.validate()?;
        let actor = assignment.actor()?;
        let scope = assignment.scope()?;

        let role_id = self.resolver.role_id(&assignment.role).await?;
        let mut mapping = FieldMapping::new().field("role_id", role_id);
        mapping = match &actor {
            AssignmentActor::User(user) => mapping.field("user_id", self.resolver.user_id(user).await?),
            AssignmentActor::Group(group) => {
                mapping.field("group_id", self.resolver.group_id(group).await?)
            }
        };
        mapping = match &scope {
            AssignmentScope::Project(project) => {
                mapping.field("project_id", self.resolver.project_id(project).await?)
            }
            AssignmentScope::ProjectId(id) => mapping.field(
                "project_id",
                self.resolver
                    .require_existing(ResourceKind::Project, id)
                    .await?,
            ),
            AssignmentScope::Domain(name) => {
                mapping.field("domain_id", self.resolver.domain_id(name).await?)
            }
        };
        let attributes = mapping.field("inherited", assignment.inherited).finish();

        let desired = Desired::by_filter(
            ResourceKind::RoleAssignment,
            describe_assignment(assignment),
            Filter::from_attributes(attributes.clone()),
            attributes,
        );
        self.upsert(desired, summary).await
    }

    async fn seed_rbac_policy(
        &self,
        policy: &RbacPolicySpec,
        summary: &mut SyncSummary,
    ) -> SeedResult<Entity> {
        policy.validate()?;
        self.resolver
            .require_existing(ResourceKind::Network, &policy.object_id)
            .await?;
        let target_id = self
            .resolver
            .parse_compound(ResourceKind::Project, &policy.target)
            .await?;

        let attributes = FieldMapping::new()
            .field("object_type", policy.object_type.as_str())
            .field("object_id", policy.object_id.as_str())
            .field("action", policy.action.as_str())
            .field("target_tenant", target_id)
            .finish();
        let desired = Desired::by_filter(
            ResourceKind::RbacPolicy,
            format!("{}:{}->{}", policy.action, policy.object_id, policy.target),
            Filter::from_attributes(attributes.clone()),
            attributes,
        );
        self.upsert(desired, summary).await
    }
}

fn named(kind: ResourceKind, name: &str, attributes: AttributeMap) -> Desired {
    Desired::by_filter(kind, name, Filter::new().eq("name", name), attributes)
}

fn scoped_filter(name: &str, domain_id: &str) -> Filter {
    Filter::new().eq("name", name).eq("domain_id", domain_id)
}

fn describe_assignment(assignment: &RoleAssignmentSpec) -> String {
    let actor = assignment
        .user
        .as_deref()
        .or(assignment.group.as_deref())
        .unwrap_or_default();
    let scope = assignment
        .project
        .as_deref()
        .or(assignment.project_id.as_deref())
        .or(assignment.domain.as_deref())
        .unwrap_or_default();
    format!("{}:{actor}:{scope}", assignment.role)
}
