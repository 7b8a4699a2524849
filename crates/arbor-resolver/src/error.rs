//! Resolution error types

use thiserror::Error;

/// Errors returned to the GraphQL request pipeline
///
/// The pipeline translates these into HTTP-level failures
/// (missing-document vs. service-unavailable); none is fatal to the
/// serving process.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// The upstream store does not know this reference
    #[error("persisted document not found")]
    NotFound,

    /// Transient upstream failure; the request may be retried
    #[error("persisted document store unavailable: {reason}")]
    Unavailable { reason: String },

    /// The reference does not parse into a known shape
    #[error("invalid document reference: {0}")]
    InvalidReference(String),

    /// Persisted-document resolution is not configured for this server
    #[error("persisted documents are not configured")]
    Disabled,
}
