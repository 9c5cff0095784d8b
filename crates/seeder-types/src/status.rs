//! Reconciliation status of a seed document
//!
//! Only failed categories appear in `unfinished_seeds`. Each entry keeps the
//! structured [`FailureKind`] next to the message so a caller can tell a
//! transient remote failure from a document that will never apply.

use crate::category::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Classification of a category failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A lookup expected to find exactly one entity found none
    NotFound,
    /// A lookup expected to find exactly one entity found several
    AmbiguousMatch,
    /// The document itself is malformed
    Validation,
    /// Transport, authentication or remote-side failure
    Remote,
}

impl FailureKind {
    /// Check if a later pass may succeed without changing the document
    #[inline]
    #[must_use]
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Remote | Self::NotFound)
    }
}

/// Last failure observed for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl CategoryFailure {
    /// Create failure record
    #[inline]
    #[must_use]
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Observed state of a seed document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedStatus {
    /// Failed categories and their last error
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub unfinished_seeds: BTreeMap<Category, CategoryFailure>,
    /// Resource version of the last document applied completely
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconciled_resource_version: Option<String>,
}

impl SeedStatus {
    /// Check if every category succeeded in its latest attempt
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unfinished_seeds.is_empty()
    }

    /// Record a failed category
    pub fn mark_failed(&mut self, category: Category, failure: CategoryFailure) {
        self.unfinished_seeds.insert(category, failure);
    }

    /// Remove a category that succeeded
    pub fn mark_finished(&mut self, category: Category) {
        self.unfinished_seeds.remove(&category);
    }

    /// Failure recorded for a category
    #[inline]
    #[must_use]
    pub fn failure(&self, category: Category) -> Option<&CategoryFailure> {
        self.unfinished_seeds.get(&category)
    }

    /// Check if every unfinished category can still succeed on retry
    #[must_use]
    pub fn all_retryable(&self) -> bool {
        self.unfinished_seeds.values().all(|f| f.kind.is_retryable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn mark_failed_then_finished() {
        let mut status = SeedStatus::default();
        status.mark_failed(
            Category::Domains,
            CategoryFailure::new(FailureKind::Remote, "connection refused"),
        );
        assert!(!status.is_complete());
        assert_eq!(
            status.failure(Category::Domains).map(|f| f.kind),
            Some(FailureKind::Remote)
        );

        status.mark_finished(Category::Domains);
        assert!(status.is_complete());
    }

    #[test]
    fn retryable_kinds() {
        assert!(FailureKind::Remote.is_retryable());
        assert!(FailureKind::NotFound.is_retryable());
        assert!(!FailureKind::Validation.is_retryable());
        assert!(!FailureKind::AmbiguousMatch.is_retryable());
    }

    #[test]
    fn status_serializes_category_keys() {
        let mut status = SeedStatus::default();
        status.mark_failed(
            Category::ShareTypes,
            CategoryFailure::new(FailureKind::Validation, "bad"),
        );
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "unfinished_seeds": {
                    "share_types": {"kind": "validation", "message": "bad"}
                }
            })
        );

        let back: SeedStatus = serde_json::from_value(json).unwrap();
        assert_eq!(back, status);
    }
}
