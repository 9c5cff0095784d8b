//! Error types for the seed data model
//!
//! - [`ValidationError`]: a seed document is syntactically valid but describes
//!   something that can never be applied (malformed references, missing keys)
//! - [`DocumentError`]: a seed document could not be read or parsed

use std::path::PathBuf;

/// Configuration mistakes in a seed document
///
/// These never resolve on retry; the document has to be fixed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Compound reference is not of the form `scope@name`
    #[error("malformed reference '{reference}': expected scope@name")]
    MalformedReference { reference: String },

    /// Natural key field is empty
    #[error("{kind} is missing its required field '{field}'")]
    MissingField { kind: String, field: String },

    /// Category name not known to the seeder
    #[error("unknown seed category: '{0}'")]
    UnknownCategory(String),

    /// Endpoint URL does not parse as an absolute URL
    #[error("invalid endpoint url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Fields that must be mutually exclusive (or exactly one present)
    #[error("{kind}: {message}")]
    Conflict { kind: String, message: String },

    /// Value not supported by the seeder
    #[error("unsupported {field} '{value}'")]
    Unsupported { field: String, value: String },
}

impl ValidationError {
    /// Create missing field error
    pub fn missing(kind: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            kind: kind.into(),
            field: field.into(),
        }
    }

    /// Create conflict error
    pub fn conflict(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conflict {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// Errors reading a seed document
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML syntax or shape error
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON syntax or shape error
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DocumentError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
