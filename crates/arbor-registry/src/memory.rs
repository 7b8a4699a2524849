//! In-memory implementation of the deployment store
//!
//! Suitable for development and testing. Production deployments should use
//! a persistent backend implementing the same trait.

use crate::error::{RegistryError, Result};
use crate::store::AppDeploymentStore;
use arbor_types::{AppDeployment, AppDeploymentId, PersistedDocument, TargetId};
use async_trait::async_trait;
use dashmap::DashMap;

/// DashMap-backed deployment store
pub struct InMemoryAppDeploymentStore {
    deployments: DashMap<AppDeploymentId, AppDeployment>,
    documents: DashMap<String, PersistedDocument>,
}

impl InMemoryAppDeploymentStore {
    pub fn new() -> Self {
        Self {
            deployments: DashMap::new(),
            documents: DashMap::new(),
        }
    }
}

impl Default for InMemoryAppDeploymentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AppDeploymentStore for InMemoryAppDeploymentStore {
    async fn insert_deployment(&self, deployment: AppDeployment) -> Result<()> {
        let id = deployment.id.clone();
        if self.deployments.contains_key(&id) {
            return Err(RegistryError::Conflict(id));
        }
        self.deployments.insert(id, deployment);
        Ok(())
    }

    async fn get_deployment(&self, id: &AppDeploymentId) -> Result<Option<AppDeployment>> {
        Ok(self.deployments.get(id).map(|d| d.clone()))
    }

    async fn update_deployment(&self, deployment: AppDeployment) -> Result<()> {
        let id = deployment.id.clone();
        if !self.deployments.contains_key(&id) {
            return Err(RegistryError::NotFound(id));
        }
        self.deployments.insert(id, deployment);
        Ok(())
    }

    async fn list_for_target(&self, target: &TargetId) -> Result<Vec<AppDeployment>> {
        Ok(self
            .deployments
            .iter()
            .filter(|d| &d.target_id == target)
            .map(|d| d.value().clone())
            .collect())
    }

    async fn get_document(&self, hash: &str) -> Result<Option<PersistedDocument>> {
        Ok(self.documents.get(hash).map(|d| d.clone()))
    }

    async fn insert_documents(&self, documents: Vec<PersistedDocument>) -> Result<()> {
        for document in documents {
            self.documents
                .entry(document.hash.clone())
                .or_insert(document);
        }
        Ok(())
    }
}
