//! Arbor Types - Core types for the persisted-document registry
//!
//! An app deployment is a named, versioned bundle of persisted GraphQL
//! operation documents. Documents are content-addressed: each is identified
//! by a deterministic hash of its canonicalized source, so the same hash
//! always denotes the same text.
//!
//! ## Key Concepts
//!
//! - **AppDeployment**: a `(name, version)` bundle moving through
//!   `Created -> Active -> Retired`
//! - **PersistedDocument**: one content-addressed operation document
//! - **Target**: the consuming environment a deployment is activated for
//!   or retired from
//! - **Events**: unified observability stream emitted by the lifecycle
//!   manager

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod deployment;
pub mod document;
pub mod events;

// Re-export main types
pub use deployment::{
    AppDeployment, AppDeploymentId, AppDeploymentState, AppDeploymentStatus, TargetId,
};
pub use document::{canonicalize_document, compute_document_hash, PersistedDocument};
pub use events::{AppDeploymentEvent, AppDeploymentEventEnvelope};
