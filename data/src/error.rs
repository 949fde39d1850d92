//! Error types for definition loading and conversion.
//!
//! Covers I/O, serialization, structural validation of a definition, and
//! failures raised by the core builders while converting it into a tree.

use cmdtree_core::BuildError;
use thiserror::Error;

use crate::validate::DefinitionError;

/// Errors that can occur while loading, saving or converting definitions.
#[derive(Debug, Error)]
pub enum DataError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// The definition is structurally invalid.
    #[error("invalid definition: {0}")]
    InvalidDefinition(#[from] DefinitionError),

    /// A command, option or parameter was rejected by its builder.
    #[error("build error: {0}")]
    BuildError(#[from] BuildError),
}

/// Convenience alias for results with [`DataError`].
pub type Result<T> = std::result::Result<T, DataError>;
