//! Server setup and lifecycle management

use crate::api::create_router;
use crate::api::rest::state::AppState;
use crate::config::DaemonConfig;
use crate::error::{DaemonError, DaemonResult};
use arbor_registry::{AppDeploymentManager, InMemoryAppDeploymentStore};
use arbor_resolver::PersistedDocuments;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Arbor daemon server
pub struct Server {
    config: DaemonConfig,
    manager: Arc<AppDeploymentManager>,
    resolver: Arc<PersistedDocuments>,
}

impl Server {
    /// Create a new server with the given configuration
    pub fn new(config: DaemonConfig) -> DaemonResult<Self> {
        let store = Arc::new(InMemoryAppDeploymentStore::new());
        let manager = Arc::new(AppDeploymentManager::new(store));

        let resolver = PersistedDocuments::new(config.persisted_documents.clone().into())
            .map_err(|e| DaemonError::Config(e.to_string()))?;

        Ok(Self {
            config,
            manager,
            resolver: Arc::new(resolver),
        })
    }

    /// Run the server until shutdown
    pub async fn run(self) -> DaemonResult<()> {
        let addr = self.config.server.listen_addr;

        let state = AppState::new(self.manager, self.resolver.clone());
        let app = create_router(state);

        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Arbor daemon listening on {}", addr);
        tracing::info!(
            "Persisted-document resolution: {}",
            if self.resolver.is_enabled() {
                "enabled"
            } else {
                "disabled"
            }
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| DaemonError::Server(e.to_string()))?;

        tracing::info!("Arbor daemon shutting down");
        Ok(())
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
