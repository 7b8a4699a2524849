//! App deployment records and lifecycle state
//!
//! An AppDeployment is identified by its `(name, version)` pair. The pair is
//! unique for the lifetime of the store, even after retirement.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an app deployment: a unique, immutable `(name, version)` pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppDeploymentId {
    /// Deployment name, e.g. `ios-app`
    pub name: String,
    /// Deployment version, e.g. `1.2.0`. Opaque, not interpreted
    pub version: String,
}

impl AppDeploymentId {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for AppDeploymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// Identity of a consuming environment (the binding a deployment is
/// activated for or retired from)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetId(String);

impl TargetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of an app deployment
///
/// Transitions are linear: `Created -> Active -> Retired`. There are no
/// cycles and `Active` cannot be skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppDeploymentState {
    /// Freshly created; documents may still be attached
    Created,
    /// Activated; the document set is frozen
    Active,
    /// Retired from its target; documents remain resolvable
    Retired,
}

impl fmt::Display for AppDeploymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppDeploymentState::Created => f.write_str("created"),
            AppDeploymentState::Active => f.write_str("active"),
            AppDeploymentState::Retired => f.write_str("retired"),
        }
    }
}

/// A named, versioned bundle of persisted operation documents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppDeployment {
    /// Unique `(name, version)` identity
    pub id: AppDeploymentId,

    /// Target this deployment belongs to
    pub target_id: TargetId,

    /// Current lifecycle state
    pub state: AppDeploymentState,

    /// Hashes of attached documents, in attachment order.
    /// Append-only while `Created`, frozen once `Active`.
    pub document_hashes: Vec<String>,

    /// Created timestamp
    pub created_at: chrono::DateTime<chrono::Utc>,

    /// Activation timestamp, set on transition to `Active`
    pub activated_at: Option<chrono::DateTime<chrono::Utc>>,

    /// Retirement timestamp, set on transition to `Retired`
    pub retired_at: Option<chrono::DateTime<chrono::Utc>>,

    /// Target the deployment was retired from, recorded for audit
    pub retired_from_target: Option<TargetId>,
}

impl AppDeployment {
    /// Create a fresh deployment in the `Created` state with no documents
    pub fn new(id: AppDeploymentId, target_id: TargetId) -> Self {
        Self {
            id,
            target_id,
            state: AppDeploymentState::Created,
            document_hashes: Vec::new(),
            created_at: chrono::Utc::now(),
            activated_at: None,
            retired_at: None,
            retired_from_target: None,
        }
    }

    /// Project the current status. Pure; no side effects
    pub fn status(&self) -> AppDeploymentStatus {
        AppDeploymentStatus {
            state: self.state,
            document_count: self.document_hashes.len(),
            created_at: self.created_at,
            activated_at: self.activated_at,
            retired_at: self.retired_at,
        }
    }
}

/// Derived status of an app deployment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppDeploymentStatus {
    pub state: AppDeploymentState,
    pub document_count: usize,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub activated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub retired_at: Option<chrono::DateTime<chrono::Utc>>,
}
