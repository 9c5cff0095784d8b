//! Compound references of the form `scope@name`
//!
//! Used wherever a seed entity points at a domain-scoped entity by name, e.g.
//! a role assignment's user `acme@alice` (user `alice` in domain `acme`).

use crate::error::ValidationError;
use std::fmt;

/// Separator between scope and name
pub const REFERENCE_SEPARATOR: char = '@';

/// Parsed `scope@name` reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompoundRef {
    /// Scope, e.g. the domain name
    pub scope: String,
    /// Name within the scope
    pub name: String,
}

impl CompoundRef {
    /// Create reference from its parts
    #[inline]
    #[must_use]
    pub fn new(scope: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            name: name.into(),
        }
    }

    /// Parse a compound reference
    ///
    /// # Errors
    /// - `ValidationError::MalformedReference` unless the input splits into
    ///   exactly two non-empty parts
    pub fn parse(reference: &str) -> Result<Self, ValidationError> {
        let parts: Vec<&str> = reference.split(REFERENCE_SEPARATOR).collect();
        match parts.as_slice() {
            [scope, name] if !scope.is_empty() && !name.is_empty() => Ok(Self {
                scope: (*scope).to_string(),
                name: (*name).to_string(),
            }),
            _ => Err(ValidationError::MalformedReference {
                reference: reference.to_string(),
            }),
        }
    }
}

impl fmt::Display for CompoundRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.scope, REFERENCE_SEPARATOR, self.name)
    }
}
