//! Repository interface for app-deployment metadata
//!
//! The manager consumes deployment and document storage through this narrow
//! trait. Updates replace whole records, so concurrent readers observe
//! either the old or the new document set, never a partial one.

use crate::error::Result;
use arbor_types::{AppDeployment, AppDeploymentId, PersistedDocument, TargetId};
use async_trait::async_trait;

/// Durable storage for app deployments and their documents
#[async_trait]
pub trait AppDeploymentStore: Send + Sync {
    /// Insert a new deployment record
    async fn insert_deployment(&self, deployment: AppDeployment) -> Result<()>;

    /// Get a deployment by its `(name, version)` identity
    async fn get_deployment(&self, id: &AppDeploymentId) -> Result<Option<AppDeployment>>;

    /// Replace an existing deployment record as a single atomic swap
    async fn update_deployment(&self, deployment: AppDeployment) -> Result<()>;

    /// List all deployments belonging to a target
    async fn list_for_target(&self, target: &TargetId) -> Result<Vec<AppDeployment>>;

    /// Get a document by content hash
    async fn get_document(&self, hash: &str) -> Result<Option<PersistedDocument>>;

    /// Insert documents. Hashes already present are left untouched; the
    /// manager guarantees their content is identical before calling
    async fn insert_documents(&self, documents: Vec<PersistedDocument>) -> Result<()>;
}
