//! Event types for lifecycle observability
//!
//! Events provide a unified stream of app-deployment lifecycle activities.

use crate::{AppDeploymentId, TargetId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope wrapping all app-deployment events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppDeploymentEventEnvelope {
    /// Unique event ID
    pub id: Uuid,

    /// Event timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,

    /// The actual event
    pub event: AppDeploymentEvent,
}

impl AppDeploymentEventEnvelope {
    pub fn new(event: AppDeploymentEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: chrono::Utc::now(),
            event,
        }
    }
}

/// App-deployment lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AppDeploymentEvent {
    /// Deployment created in the `Created` state
    Created {
        id: AppDeploymentId,
        target_id: TargetId,
    },

    /// Documents attached to a pending deployment
    DocumentsAdded {
        id: AppDeploymentId,
        /// Hashes newly attached by this operation (idempotent re-adds
        /// excluded)
        added: usize,
        total: usize,
    },

    /// Deployment activated; document set frozen
    Activated { id: AppDeploymentId },

    /// Deployment retired from a target
    Retired {
        id: AppDeploymentId,
        target_id: TargetId,
    },
}
