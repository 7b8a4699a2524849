//! Registry error types

use arbor_types::AppDeploymentId;
use thiserror::Error;

/// Registry errors
///
/// Every lifecycle operation returns one of these as a structured result so
/// the producer-facing API layer can render field-level messages. None is
/// fatal to the process.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    #[error("App deployment already exists: {0}")]
    Conflict(AppDeploymentId),

    #[error("Document hash {hash} is already bound to different content")]
    HashConflict { hash: String },

    #[error("Invalid state: deployment is {current}, operation requires {expected}")]
    InvalidState { current: String, expected: String },

    #[error("App deployment not found: {0}")]
    NotFound(AppDeploymentId),

    #[error("No app deployment matches target {target} and name {name}")]
    TargetNotFound { target: String, name: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;
