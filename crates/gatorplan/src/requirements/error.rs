//! Error types for loading requirement data.

use thiserror::Error;

/// Errors raised while loading or parsing the requirement catalog and the
/// prerequisite map. Lookups never fail; only loading does.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Reading a data file failed
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A data file is not valid JSON for its schema
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// An obligation or prerequisite entry has an invalid shape
    #[error("Malformed entry in {location}: {message}")]
    Malformed { location: String, message: String },

    /// Two files declare the same college code or alias
    #[error("Duplicate college key: {key}")]
    DuplicateCollege { key: String },
}

impl CatalogError {
    pub(crate) fn malformed(location: impl Into<String>, message: impl Into<String>) -> Self {
        CatalogError::Malformed {
            location: location.into(),
            message: message.into(),
        }
    }
}
