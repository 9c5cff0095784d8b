//! Attribute maps and the spec-to-remote field mapping
//!
//! Every resource spec projects its typed fields onto remote attribute names
//! through a [`FieldMapping`], one explicit `field(remote_name, value)` call per
//! recognized field. The open `extra` bag is merged in afterwards and never
//! overrides a recognized field.

use serde_json::Value;
use std::collections::BTreeMap;

/// Flat attribute map as accepted by the remote API
pub type AttributeMap = serde_json::Map<String, Value>;

/// Builder for the recognized attributes of one spec entity
#[derive(Debug, Default, Clone)]
pub struct FieldMapping {
    attributes: AttributeMap,
}

impl FieldMapping {
    /// Create empty mapping
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a required field onto `remote_name`
    #[must_use]
    pub fn field(mut self, remote_name: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(remote_name.to_string(), value.into());
        self
    }

    /// Map an optional field; `None` leaves the attribute out entirely
    #[must_use]
    pub fn optional<V: Into<Value>>(self, remote_name: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.field(remote_name, v),
            None => self,
        }
    }

    /// Map a string dictionary; an empty dictionary leaves the attribute out
    #[must_use]
    pub fn dictionary(self, remote_name: &str, value: &BTreeMap<String, String>) -> Self {
        if value.is_empty() {
            return self;
        }
        let object: AttributeMap = value
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        self.field(remote_name, Value::Object(object))
    }

    /// Finish with the recognized attributes plus the extra bag
    ///
    /// Recognized attributes win over extra attributes of the same name.
    #[must_use]
    pub fn with_extra(mut self, extra: &AttributeMap) -> AttributeMap {
        for (name, value) in extra {
            self.attributes
                .entry(name.clone())
                .or_insert_with(|| value.clone());
        }
        self.attributes
    }

    /// Finish without extra attributes
    #[inline]
    #[must_use]
    pub fn finish(self) -> AttributeMap {
        self.attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn optional_none_is_omitted() {
        let attrs = FieldMapping::new()
            .field("name", "alpha")
            .optional::<bool>("enabled", None)
            .finish();

        assert_eq!(attrs.len(), 1);
        assert!(!attrs.contains_key("enabled"));
    }

    #[test]
    fn recognized_wins_over_extra() {
        let mut extra = AttributeMap::new();
        extra.insert("name".to_string(), json!("shadow"));
        extra.insert("color".to_string(), json!("blue"));

        let attrs = FieldMapping::new().field("name", "alpha").with_extra(&extra);

        assert_eq!(attrs["name"], json!("alpha"));
        assert_eq!(attrs["color"], json!("blue"));
    }

    #[test]
    fn dictionary_maps_to_object() {
        let mut specs = BTreeMap::new();
        specs.insert("hw:cpu_policy".to_string(), "dedicated".to_string());

        let attrs = FieldMapping::new()
            .dictionary("extra_specs", &specs)
            .dictionary("empty", &BTreeMap::new())
            .finish();

        assert_eq!(attrs["extra_specs"], json!({"hw:cpu_policy": "dedicated"}));
        assert!(!attrs.contains_key("empty"));
    }
}
