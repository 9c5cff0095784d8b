//! Seed documents as stored by the desired-state store
//!
//! ```yaml
//! name: base-seed
//! resource_version: "42"
//! spec:
//!   requires: [monsoon3/domain-default-seed]
//!   domains:
//!     - name: alpha
//!       enabled: true
//! ```

use crate::error::DocumentError;
use crate::spec::SeedSpec;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Named, versioned seed specification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedDocument {
    /// Document name, unique within the store
    pub name: String,
    /// Opaque version marker of the stored document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    /// Desired state
    pub spec: SeedSpec,
}

impl SeedDocument {
    /// Create document from a spec
    #[must_use]
    pub fn new(name: impl Into<String>, spec: SeedSpec) -> Self {
        Self {
            name: name.into(),
            resource_version: None,
            spec,
        }
    }

    /// With resource version
    #[must_use]
    pub fn with_resource_version(mut self, version: impl Into<String>) -> Self {
        self.resource_version = Some(version.into());
        self
    }

    /// Parse YAML document
    ///
    /// # Errors
    /// - `DocumentError::Yaml` on syntax or shape errors
    pub fn from_yaml_str(content: &str) -> Result<Self, DocumentError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parse JSON document
    ///
    /// # Errors
    /// - `DocumentError::Json` on syntax or shape errors
    pub fn from_json_str(content: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a document, JSON for `.json` files and YAML otherwise
    ///
    /// # Errors
    /// - `DocumentError::Io` if the file cannot be read
    /// - `DocumentError::Yaml` / `DocumentError::Json` on parse errors
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| DocumentError::io_error(path, e))?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_yaml_str(&content),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use std::io::Write;

    const DOC: &str = r#"
name: base-seed
resource_version: "7"
spec:
  requires:
    - other-seed
  roles:
    - name: admin
  domains:
    - name: acme
      enabled: true
      users:
        - name: alice
          email: alice@acme.test
      role_assignments:
        - role: admin
          user: acme@alice
          domain: acme
"#;

    #[test]
    fn parses_yaml_document() {
        let doc = SeedDocument::from_yaml_str(DOC).unwrap();

        assert_eq!(doc.name, "base-seed");
        assert_eq!(doc.resource_version.as_deref(), Some("7"));
        assert_eq!(doc.spec.dependencies, vec!["other-seed".to_string()]);
        assert_eq!(doc.spec.count(Category::Domains), 1);
        assert_eq!(doc.spec.domains[0].users[0].email.as_deref(), Some("alice@acme.test"));
        assert!(doc.spec.validate().is_empty());
    }

    #[test]
    fn load_picks_format_by_extension() {
        let doc = SeedDocument::from_yaml_str(DOC).unwrap();

        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(serde_json::to_string(&doc).unwrap().as_bytes())
            .unwrap();

        let loaded = SeedDocument::load(file.path()).unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = SeedDocument::load("/nonexistent/seed.yaml").unwrap_err();
        assert!(matches!(err, DocumentError::Io { .. }));
    }
}
