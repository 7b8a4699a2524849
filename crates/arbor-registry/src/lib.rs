//! Arbor Registry - App-deployment lifecycle management
//!
//! This crate owns every write to app deployments and their persisted
//! documents:
//!
//! - **AppDeploymentStore**: narrow repository interface consumed by the
//!   manager; durable backends implement it
//! - **InMemoryAppDeploymentStore**: DashMap-backed implementation for
//!   development and testing
//! - **AppDeploymentManager**: the lifecycle state machine
//!   (`Created -> Active -> Retired`) with per-key mutation serialization
//!
//! ## In-Memory vs Persistent
//!
//! The in-memory store is suitable for development and testing. Production
//! deployments should use a persistent backend (PostgreSQL, etcd, etc.)
//! that implements the same trait.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod error;
pub mod manager;
pub mod memory;
pub mod store;

// Re-exports
pub use error::{RegistryError, Result};
pub use manager::AppDeploymentManager;
pub use memory::InMemoryAppDeploymentStore;
pub use store::AppDeploymentStore;
