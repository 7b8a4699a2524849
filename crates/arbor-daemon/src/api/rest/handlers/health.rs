//! Health and status handlers

use crate::api::rest::state::AppState;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

/// Daemon status response
#[derive(Debug, Serialize)]
pub struct DaemonStatus {
    pub version: String,
    pub uptime_secs: i64,
    pub persisted_documents_enabled: bool,
}

/// Liveness and configuration summary
pub async fn health_check(State(state): State<AppState>) -> Json<DaemonStatus> {
    Json(DaemonStatus {
        version: state.version.clone(),
        uptime_secs: state.uptime_secs(),
        persisted_documents_enabled: state.resolver.is_enabled(),
    })
}
