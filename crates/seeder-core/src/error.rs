//! Error types for the seeder core
//!
//! Every failure while applying one category ends up as a [`SeedError`]:
//! - Lookups that found nothing or too much
//! - Malformed seed documents
//! - Remote API failures, including deadlines

use seeder_types::{FailureKind, ResourceKind, ValidationError};
use std::fmt;
use std::time::Duration;

/// Main seeding error type
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    /// A lookup expected to find exactly one entity found none
    #[error("{kind} '{key}' not found")]
    NotFound { kind: ResourceKind, key: String },

    /// A lookup expected to find exactly one entity found several
    #[error("{kind} '{key}' is ambiguous: {count} remote matches")]
    AmbiguousMatch {
        kind: ResourceKind,
        key: String,
        count: usize,
    },

    /// The seed document is malformed
    #[error("invalid seed: {0}")]
    Validation(#[from] ValidationError),

    /// Remote API failure
    #[error("remote api error: {0}")]
    Remote(#[from] RemoteError),
}

impl SeedError {
    /// Create not found error
    #[inline]
    pub fn not_found(kind: ResourceKind, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            key: key.into(),
        }
    }

    /// Create ambiguous match error
    #[inline]
    pub fn ambiguous(kind: ResourceKind, key: impl Into<String>, count: usize) -> Self {
        Self::AmbiguousMatch {
            kind,
            key: key.into(),
            count,
        }
    }

    /// Classification stored in the seed status
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NotFound { .. } => FailureKind::NotFound,
            Self::AmbiguousMatch { .. } => FailureKind::AmbiguousMatch,
            Self::Validation(_) => FailureKind::Validation,
            Self::Remote(_) => FailureKind::Remote,
        }
    }

    /// Check if a later pass may succeed without changing the document
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

/// Result type for seeding operations
pub type SeedResult<T> = Result<T, SeedError>;

/// Failure class of a remote call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// Connection, DNS or protocol failure
    Transport,
    /// Credentials rejected or expired
    Unauthorized,
    /// The remote side refused the request
    Rejected { status: u16 },
    /// The call did not finish within its deadline
    Timeout { after: Duration },
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => write!(f, "transport"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::Rejected { status } => write!(f, "rejected ({status})"),
            Self::Timeout { after } => write!(f, "timeout after {}ms", after.as_millis()),
        }
    }
}

/// Error reported by a [`crate::remote::ResourceApi`] call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub message: String,
}

impl RemoteError {
    /// Create remote error
    #[inline]
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Create transport error
    #[inline]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Transport, message)
    }

    /// Create unauthorized error
    #[inline]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Unauthorized, message)
    }

    /// Create rejection with the remote status code
    #[inline]
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Rejected { status }, message)
    }

    /// Create deadline error
    #[inline]
    #[must_use]
    pub fn timeout(after: Duration) -> Self {
        Self::new(
            RemoteErrorKind::Timeout { after },
            "call exceeded its deadline",
        )
    }

    /// Check if the call hit its deadline
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, RemoteErrorKind::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_failure_kinds() {
        assert_eq!(
            SeedError::not_found(ResourceKind::Domain, "acme").kind(),
            FailureKind::NotFound
        );
        assert_eq!(
            SeedError::ambiguous(ResourceKind::Role, "admin", 2).kind(),
            FailureKind::AmbiguousMatch
        );
        assert_eq!(
            SeedError::from(ValidationError::missing("role", "name")).kind(),
            FailureKind::Validation
        );
        assert_eq!(
            SeedError::from(RemoteError::transport("refused")).kind(),
            FailureKind::Remote
        );
    }

    #[test]
    fn retryable_classification() {
        assert!(SeedError::from(RemoteError::timeout(Duration::from_secs(1))).is_retryable());
        assert!(SeedError::not_found(ResourceKind::Project, "acme@p").is_retryable());
        assert!(!SeedError::ambiguous(ResourceKind::Project, "acme@p", 3).is_retryable());
        assert!(!SeedError::from(ValidationError::UnknownCategory("x".into())).is_retryable());
    }

    #[test]
    fn messages_name_the_entity() {
        let err = SeedError::ambiguous(ResourceKind::Project, "acme@p", 3);
        assert_eq!(
            err.to_string(),
            "project 'acme@p' is ambiguous: 3 remote matches"
        );

        let err = SeedError::from(RemoteError::rejected(409, "conflict"));
        assert_eq!(err.to_string(), "remote api error: rejected (409): conflict");
    }
}
