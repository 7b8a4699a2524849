//! App Deployment Manager - the lifecycle state machine
//!
//! The AppDeploymentManager is the sole writer of deployments and persisted
//! documents. Every mutation is serialized per `(name, version)` key, so no
//! interleaving of two mutations on the same deployment produces a state
//! unreachable by some serial ordering of those operations.

use crate::error::{RegistryError, Result};
use crate::store::AppDeploymentStore;
use arbor_types::{
    AppDeployment, AppDeploymentEvent, AppDeploymentEventEnvelope, AppDeploymentId,
    AppDeploymentState, AppDeploymentStatus, PersistedDocument, TargetId,
};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{info, instrument};

const MAX_NAME_LENGTH: usize = 256;

/// App Deployment Manager orchestrates the deployment lifecycle
pub struct AppDeploymentManager {
    /// Repository for deployment metadata and documents
    store: Arc<dyn AppDeploymentStore>,
    /// Per-key mutation locks
    locks: DashMap<AppDeploymentId, Arc<Mutex<()>>>,
    /// Event channel
    event_tx: broadcast::Sender<AppDeploymentEventEnvelope>,
}

impl AppDeploymentManager {
    /// Create a new manager backed by the given store
    pub fn new(store: Arc<dyn AppDeploymentStore>) -> Self {
        let (event_tx, _) = broadcast::channel(1024);
        Self {
            store,
            locks: DashMap::new(),
            event_tx,
        }
    }

    /// Create a new app deployment in the `Created` state
    #[instrument(skip(self), fields(name = %name, version = %version))]
    pub async fn create_app_deployment(
        &self,
        target_id: TargetId,
        name: &str,
        version: &str,
    ) -> Result<AppDeployment> {
        validate_identity_part("name", name)?;
        validate_identity_part("version", version)?;

        let id = AppDeploymentId::new(name, version);
        let lock = self.lock_for(&id);
        let _guard = lock.lock().await;

        // (name, version) pairs are never reused, even after retirement
        if self.store.get_deployment(&id).await?.is_some() {
            return Err(RegistryError::Conflict(id));
        }

        let deployment = AppDeployment::new(id.clone(), target_id.clone());
        self.store.insert_deployment(deployment.clone()).await?;

        self.emit_event(AppDeploymentEvent::Created { id, target_id });
        info!("App deployment created");

        Ok(deployment)
    }

    /// Attach documents to a pending deployment
    ///
    /// Hashes are computed here from the canonicalized document text; the
    /// caller never supplies them. The call is all-or-nothing: every
    /// document is validated against the store before any is attached, and
    /// the first hash conflict aborts the whole operation. Re-adding an
    /// already-attached identical document is a no-op.
    #[instrument(skip(self, documents), fields(name = %name, version = %version, count = documents.len()))]
    pub async fn add_documents_to_app_deployment(
        &self,
        name: &str,
        version: &str,
        documents: Vec<String>,
    ) -> Result<AppDeployment> {
        let id = AppDeploymentId::new(name, version);
        let lock = self.lock_for(&id);
        let _guard = lock.lock().await;

        // 1. Deployment must exist and still accept documents
        let mut deployment = self
            .store
            .get_deployment(&id)
            .await?
            .ok_or_else(|| RegistryError::NotFound(id.clone()))?;
        self.require_state(&deployment, AppDeploymentState::Created)?;

        // 2. Canonicalize, hash, and validate every document up front
        let mut incoming: Vec<PersistedDocument> = Vec::with_capacity(documents.len());
        for source in &documents {
            let document = PersistedDocument::from_source(source);
            if let Some(existing) = self.store.get_document(&document.hash).await? {
                if existing.body != document.body {
                    return Err(RegistryError::HashConflict {
                        hash: document.hash,
                    });
                }
            }
            incoming.push(document);
        }

        // 3. Attach hashes not already on the deployment, in input order
        let mut added = 0;
        let mut to_insert = Vec::new();
        for document in incoming {
            if !deployment.document_hashes.contains(&document.hash) {
                deployment.document_hashes.push(document.hash.clone());
                added += 1;
            }
            to_insert.push(document);
        }

        self.store.insert_documents(to_insert).await?;
        self.store.update_deployment(deployment.clone()).await?;

        self.emit_event(AppDeploymentEvent::DocumentsAdded {
            id,
            added,
            total: deployment.document_hashes.len(),
        });
        info!(added, total = deployment.document_hashes.len(), "Documents attached");

        Ok(deployment)
    }

    /// Activate a deployment, freezing its document set
    ///
    /// From this point the external publish step is expected to make the
    /// documents fetchable through the CDN; the manager guarantees the set
    /// can never change afterward.
    #[instrument(skip(self), fields(name = %name, version = %version))]
    pub async fn activate_app_deployment(
        &self,
        name: &str,
        version: &str,
    ) -> Result<AppDeployment> {
        let id = AppDeploymentId::new(name, version);
        let lock = self.lock_for(&id);
        let _guard = lock.lock().await;

        let mut deployment = self
            .store
            .get_deployment(&id)
            .await?
            .ok_or_else(|| RegistryError::NotFound(id.clone()))?;
        self.require_state(&deployment, AppDeploymentState::Created)?;

        // Empty deployments cannot activate
        if deployment.document_hashes.is_empty() {
            return Err(RegistryError::InvalidState {
                current: "created with no documents".into(),
                expected: "created with at least one document".into(),
            });
        }

        deployment.state = AppDeploymentState::Active;
        deployment.activated_at = Some(chrono::Utc::now());
        self.store.update_deployment(deployment.clone()).await?;

        self.emit_event(AppDeploymentEvent::Activated { id });
        info!(
            documents = deployment.document_hashes.len(),
            "App deployment activated"
        );

        Ok(deployment)
    }

    /// Retire an active deployment from a target
    ///
    /// The documents stay resolvable (content-addressed, never deleted);
    /// the deployment simply stops being the current one for its target.
    #[instrument(skip(self), fields(name = %name, version = %version, target = %target_id))]
    pub async fn retire_app_deployment(
        &self,
        target_id: TargetId,
        name: &str,
        version: &str,
    ) -> Result<AppDeployment> {
        let id = AppDeploymentId::new(name, version);
        let lock = self.lock_for(&id);
        let _guard = lock.lock().await;

        let mut deployment = self
            .store
            .get_deployment(&id)
            .await?
            .ok_or_else(|| RegistryError::NotFound(id.clone()))?;
        self.require_state(&deployment, AppDeploymentState::Active)?;

        deployment.state = AppDeploymentState::Retired;
        deployment.retired_at = Some(chrono::Utc::now());
        deployment.retired_from_target = Some(target_id.clone());
        self.store.update_deployment(deployment.clone()).await?;

        self.emit_event(AppDeploymentEvent::Retired { id, target_id });
        info!("App deployment retired");

        Ok(deployment)
    }

    /// Fetch a deployment by its `(name, version)` identity
    pub async fn get_app_deployment(&self, name: &str, version: &str) -> Result<AppDeployment> {
        let id = AppDeploymentId::new(name, version);
        self.store
            .get_deployment(&id)
            .await?
            .ok_or_else(|| RegistryError::NotFound(id))
    }

    /// Project the status of a deployment. Pure; no store access
    pub fn get_status_for_app_deployment(
        &self,
        deployment: &AppDeployment,
    ) -> AppDeploymentStatus {
        deployment.status()
    }

    /// Look up the deployment for a target by name and optional version
    ///
    /// With a version, the exact `(name, version)` record is returned in
    /// whatever state it is in. Without one, the latest `Active` deployment
    /// (by activation time) wins.
    pub async fn get_app_deployment_for_target(
        &self,
        target_id: &TargetId,
        name: &str,
        version: Option<&str>,
    ) -> Result<AppDeployment> {
        let not_found = || RegistryError::TargetNotFound {
            target: target_id.to_string(),
            name: name.to_string(),
        };

        let candidates = self.store.list_for_target(target_id).await?;
        let mut matching = candidates.into_iter().filter(|d| d.id.name == name);

        match version {
            Some(version) => matching
                .find(|d| d.id.version == version)
                .ok_or_else(not_found),
            None => matching
                .filter(|d| d.state == AppDeploymentState::Active)
                .max_by_key(|d| d.activated_at)
                .ok_or_else(not_found),
        }
    }

    /// Subscribe to lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<AppDeploymentEventEnvelope> {
        self.event_tx.subscribe()
    }

    // --- Internal helpers ---

    fn lock_for(&self, id: &AppDeploymentId) -> Arc<Mutex<()>> {
        self.locks
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn require_state(
        &self,
        deployment: &AppDeployment,
        expected: AppDeploymentState,
    ) -> Result<()> {
        if deployment.state != expected {
            return Err(RegistryError::InvalidState {
                current: deployment.state.to_string(),
                expected: expected.to_string(),
            });
        }
        Ok(())
    }

    fn emit_event(&self, event: AppDeploymentEvent) {
        let _ = self.event_tx.send(AppDeploymentEventEnvelope::new(event));
    }
}

fn validate_identity_part(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RegistryError::InvalidInput(format!(
            "{field} must not be empty"
        )));
    }
    if value.len() > MAX_NAME_LENGTH {
        return Err(RegistryError::InvalidInput(format!(
            "{field} must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryAppDeploymentStore;
    use arbor_types::compute_document_hash;

    fn manager() -> (AppDeploymentManager, Arc<InMemoryAppDeploymentStore>) {
        let store = Arc::new(InMemoryAppDeploymentStore::new());
        (AppDeploymentManager::new(store.clone()), store)
    }

    fn staging() -> TargetId {
        TargetId::new("staging")
    }

    #[tokio::test]
    async fn test_create_then_duplicate_create_conflicts() {
        let (manager, _) = manager();

        manager
            .create_app_deployment(staging(), "app", "1.0.0")
            .await
            .unwrap();

        let err = manager
            .create_app_deployment(staging(), "app", "1.0.0")
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_name() {
        let (manager, _) = manager();
        let err = manager
            .create_app_deployment(staging(), "  ", "1.0.0")
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_add_documents_to_missing_deployment() {
        let (manager, _) = manager();
        let err = manager
            .add_documents_to_app_deployment("app", "1.0.0", vec!["query { hi }".into()])
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_add_documents_is_idempotent() {
        let (manager, _) = manager();
        manager
            .create_app_deployment(staging(), "app", "1.0.0")
            .await
            .unwrap();

        let first = manager
            .add_documents_to_app_deployment("app", "1.0.0", vec!["query { hi }".into()])
            .await
            .unwrap();
        assert_eq!(first.document_hashes.len(), 1);

        // Same document again, differently formatted
        let second = manager
            .add_documents_to_app_deployment("app", "1.0.0", vec!["query {\n  hi\n}".into()])
            .await
            .unwrap();
        assert_eq!(second.document_hashes.len(), 1);
    }

    #[tokio::test]
    async fn test_hash_conflict_aborts_whole_call() {
        let (manager, store) = manager();
        manager
            .create_app_deployment(staging(), "app", "1.0.0")
            .await
            .unwrap();

        // Simulate a store where the hash is bound to different content
        let hash = compute_document_hash("query { hi }");
        store
            .insert_documents(vec![PersistedDocument {
                hash,
                body: "query { other }".into(),
            }])
            .await
            .unwrap();

        let err = manager
            .add_documents_to_app_deployment(
                "app",
                "1.0.0",
                vec!["query { fine }".into(), "query { hi }".into()],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::HashConflict { .. }));

        // Nothing was attached
        let deployment = store
            .get_deployment(&AppDeploymentId::new("app", "1.0.0"))
            .await
            .unwrap()
            .unwrap();
        assert!(deployment.document_hashes.is_empty());
    }

    #[tokio::test]
    async fn test_activate_empty_deployment_fails() {
        let (manager, _) = manager();
        manager
            .create_app_deployment(staging(), "app", "1.0.0")
            .await
            .unwrap();

        let err = manager
            .activate_app_deployment("app", "1.0.0")
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn test_document_set_frozen_after_activation() {
        let (manager, store) = manager();
        manager
            .create_app_deployment(staging(), "app", "1.0.0")
            .await
            .unwrap();
        manager
            .add_documents_to_app_deployment("app", "1.0.0", vec!["query { hi }".into()])
            .await
            .unwrap();
        let activated = manager
            .activate_app_deployment("app", "1.0.0")
            .await
            .unwrap();
        assert_eq!(activated.state, AppDeploymentState::Active);
        assert!(activated.activated_at.is_some());

        let err = manager
            .add_documents_to_app_deployment("app", "1.0.0", vec!["query { bye }".into()])
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidState { .. }));

        // Byte-identical document set before and after the attempt
        let current = store
            .get_deployment(&AppDeploymentId::new("app", "1.0.0"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.document_hashes, activated.document_hashes);
    }

    #[tokio::test]
    async fn test_double_activation_fails() {
        let (manager, _) = manager();
        manager
            .create_app_deployment(staging(), "app", "1.0.0")
            .await
            .unwrap();
        manager
            .add_documents_to_app_deployment("app", "1.0.0", vec!["query { hi }".into()])
            .await
            .unwrap();
        manager
            .activate_app_deployment("app", "1.0.0")
            .await
            .unwrap();

        let err = manager
            .activate_app_deployment("app", "1.0.0")
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_activation_has_one_winner() {
        let store = Arc::new(InMemoryAppDeploymentStore::new());
        let manager = Arc::new(AppDeploymentManager::new(store));
        manager
            .create_app_deployment(staging(), "app", "1.0.0")
            .await
            .unwrap();
        manager
            .add_documents_to_app_deployment("app", "1.0.0", vec!["query { hi }".into()])
            .await
            .unwrap();

        let a = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.activate_app_deployment("app", "1.0.0").await })
        };
        let b = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.activate_app_deployment("app", "1.0.0").await })
        };

        let results = [a.await.unwrap(), b.await.unwrap()];
        let wins = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(wins, 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, RegistryError::InvalidState { .. })));
    }

    #[tokio::test]
    async fn test_retire_flow() {
        let (manager, _) = manager();
        manager
            .create_app_deployment(staging(), "app", "1.0.0")
            .await
            .unwrap();
        manager
            .add_documents_to_app_deployment("app", "1.0.0", vec!["query { hi }".into()])
            .await
            .unwrap();
        manager
            .activate_app_deployment("app", "1.0.0")
            .await
            .unwrap();

        let retired = manager
            .retire_app_deployment(staging(), "app", "1.0.0")
            .await
            .unwrap();
        assert_eq!(retired.state, AppDeploymentState::Retired);
        assert_eq!(retired.retired_from_target, Some(staging()));

        let status = manager.get_status_for_app_deployment(&retired);
        assert_eq!(status.state, AppDeploymentState::Retired);
        assert!(status.retired_at.is_some());

        // Retiring again is an invalid transition
        let err = manager
            .retire_app_deployment(staging(), "app", "1.0.0")
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn test_retire_requires_active() {
        let (manager, _) = manager();
        manager
            .create_app_deployment(staging(), "app", "1.0.0")
            .await
            .unwrap();

        let err = manager
            .retire_app_deployment(staging(), "app", "1.0.0")
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn test_target_lookup_exact_version() {
        let (manager, _) = manager();
        manager
            .create_app_deployment(staging(), "app", "1.0.0")
            .await
            .unwrap();

        let found = manager
            .get_app_deployment_for_target(&staging(), "app", Some("1.0.0"))
            .await
            .unwrap();
        assert_eq!(found.id.version, "1.0.0");

        let err = manager
            .get_app_deployment_for_target(&staging(), "app", Some("9.9.9"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::TargetNotFound { .. }));
    }

    #[tokio::test]
    async fn test_target_lookup_latest_active() {
        let (manager, _) = manager();
        for version in ["1.0.0", "2.0.0"] {
            manager
                .create_app_deployment(staging(), "app", version)
                .await
                .unwrap();
            manager
                .add_documents_to_app_deployment("app", version, vec!["query { hi }".into()])
                .await
                .unwrap();
            manager.activate_app_deployment("app", version).await.unwrap();
        }

        let found = manager
            .get_app_deployment_for_target(&staging(), "app", None)
            .await
            .unwrap();
        assert_eq!(found.id.version, "2.0.0");

        // No active deployment for an unknown name
        let err = manager
            .get_app_deployment_for_target(&staging(), "other", None)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::TargetNotFound { .. }));
    }

    #[tokio::test]
    async fn test_events_are_emitted() {
        let (manager, _) = manager();
        let mut events = manager.subscribe();

        manager
            .create_app_deployment(staging(), "app", "1.0.0")
            .await
            .unwrap();

        let envelope = events.recv().await.unwrap();
        assert!(matches!(
            envelope.event,
            AppDeploymentEvent::Created { .. }
        ));
    }
}
