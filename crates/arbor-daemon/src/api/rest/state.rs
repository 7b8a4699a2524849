//! Application state for API handlers

use arbor_registry::AppDeploymentManager;
use arbor_resolver::PersistedDocuments;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Deployment lifecycle manager
    pub manager: Arc<AppDeploymentManager>,

    /// Persisted-document resolver
    pub resolver: Arc<PersistedDocuments>,

    /// Daemon version
    pub version: String,

    /// Daemon start time
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(manager: Arc<AppDeploymentManager>, resolver: Arc<PersistedDocuments>) -> Self {
        Self {
            manager,
            resolver,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: chrono::Utc::now(),
        }
    }

    /// Get uptime in whole seconds
    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }
}
