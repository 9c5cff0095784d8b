//! Testing utilities for the seeder workspace
//!
//! Shared seed fixtures and in-memory session helpers.

#![allow(missing_docs)]

use seeder_core::{MemoryApi, SeedOrchestrator, SeedSession, SeederConfig};
use seeder_types::{ResourceKind, SeedDocument, SeedSpec};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Seed touching every category
pub const FULL_SEED: &str = r#"
roles:
  - name: admin
  - name: member
    description: Project member
role_inferences:
  - prior_role: admin
    implied_role: member
regions:
  - id: eu-de-1
    description: Frankfurt
services:
  - name: nova
    type: compute
    enabled: true
    endpoints:
      - interface: public
        region: eu-de-1
        url: https://compute.eu-de-1.example.com/v2.1
      - interface: internal
        region: eu-de-1
        url: http://nova-api.svc:8774/v2.1
flavors:
  - name: m1.small
    vcpus: 1
    ram: 2048
    disk: 20
    is_public: true
    extra_specs:
      "hw:cpu_policy": shared
share_types:
  - name: default
    is_public: true
    specs:
      driver_handles_share_servers: "true"
resource_classes:
  - CUSTOM_BAREMETAL_LARGE
domains:
  - name: acme
    description: Acme Corp
    enabled: true
    groups:
      - name: admins
    projects:
      - name: base
      - name: web
        parent: base
    users:
      - name: alice
        email: alice@acme.example.com
        default_project: acme@web
    role_assignments:
      - role: admin
        group: acme@admins
        domain: acme
      - role: member
        user: acme@alice
        project: acme@web
rbac_policies:
  - object_type: network
    object_id: net-shared
    action: access_as_shared
    target: acme@web
volume_types:
  - name: ssd
    description: Solid state
    extra_specs:
      volume_backend_name: ssd
"#;

pub fn spec(yaml: &str) -> SeedSpec {
    serde_yaml::from_str(yaml).unwrap()
}

pub fn document(name: &str, yaml: &str) -> SeedDocument {
    SeedDocument::new(name, spec(yaml)).with_resource_version("1")
}

pub fn full_document() -> SeedDocument {
    document("full-seed", FULL_SEED)
}

/// Remote state every fixture seed expects to pre-exist
pub fn seed_prerequisites(api: &MemoryApi) {
    api.insert(
        ResourceKind::Network,
        json!({"id": "net-shared", "name": "shared"}),
    );
}

pub fn memory_api() -> Arc<MemoryApi> {
    let api = Arc::new(MemoryApi::new());
    seed_prerequisites(&api);
    api
}

pub fn orchestrator(api: &Arc<MemoryApi>) -> SeedOrchestrator {
    orchestrator_with(api, SeederConfig::default())
}

pub fn orchestrator_with(api: &Arc<MemoryApi>, config: SeederConfig) -> SeedOrchestrator {
    SeedOrchestrator::new(SeedSession::start(api.clone(), config))
}

pub fn short_timeout_config(timeout: Duration) -> SeederConfig {
    SeederConfig::default().with_call_timeout(timeout)
}
