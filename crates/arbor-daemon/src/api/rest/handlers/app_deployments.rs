//! App-deployment mutation and query handlers
//!
//! The producer-facing surface: create, attach documents, activate,
//! retire, status, and target lookup. Lifecycle errors come back as
//! structured `{message}` bodies with 404/409 status codes.

use crate::api::rest::state::AppState;
use crate::error::ApiResult;
use arbor_types::{AppDeployment, AppDeploymentStatus, TargetId};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

/// Create app deployment request
#[derive(Debug, Deserialize)]
pub struct CreateAppDeploymentRequest {
    pub target: String,
    pub app_name: String,
    pub app_version: String,
}

/// Add documents request
#[derive(Debug, Deserialize)]
pub struct AddDocumentsRequest {
    pub app_name: String,
    pub app_version: String,
    pub documents: Vec<String>,
}

/// Activate request
#[derive(Debug, Deserialize)]
pub struct ActivateAppDeploymentRequest {
    pub app_name: String,
    pub app_version: String,
}

/// Retire request
#[derive(Debug, Deserialize)]
pub struct RetireAppDeploymentRequest {
    pub target_id: String,
    pub app_name: String,
    pub app_version: String,
}

/// Target lookup query string
#[derive(Debug, Deserialize)]
pub struct TargetLookupQuery {
    pub name: String,
    pub version: Option<String>,
}

/// Deployment response payload
#[derive(Debug, Serialize)]
pub struct AppDeploymentResponse {
    #[serde(flatten)]
    pub deployment: AppDeployment,
}

/// Create a new app deployment
pub async fn create_app_deployment(
    State(state): State<AppState>,
    Json(request): Json<CreateAppDeploymentRequest>,
) -> ApiResult<Json<AppDeploymentResponse>> {
    let deployment = state
        .manager
        .create_app_deployment(
            TargetId::new(request.target),
            &request.app_name,
            &request.app_version,
        )
        .await?;
    Ok(Json(AppDeploymentResponse { deployment }))
}

/// Attach documents to a pending deployment
pub async fn add_documents_to_app_deployment(
    State(state): State<AppState>,
    Json(request): Json<AddDocumentsRequest>,
) -> ApiResult<Json<AppDeploymentResponse>> {
    let deployment = state
        .manager
        .add_documents_to_app_deployment(
            &request.app_name,
            &request.app_version,
            request.documents,
        )
        .await?;
    Ok(Json(AppDeploymentResponse { deployment }))
}

/// Activate a deployment, freezing its document set
pub async fn activate_app_deployment(
    State(state): State<AppState>,
    Json(request): Json<ActivateAppDeploymentRequest>,
) -> ApiResult<Json<AppDeploymentResponse>> {
    let deployment = state
        .manager
        .activate_app_deployment(&request.app_name, &request.app_version)
        .await?;
    Ok(Json(AppDeploymentResponse { deployment }))
}

/// Retire an active deployment from a target
pub async fn retire_app_deployment(
    State(state): State<AppState>,
    Json(request): Json<RetireAppDeploymentRequest>,
) -> ApiResult<Json<AppDeploymentResponse>> {
    let deployment = state
        .manager
        .retire_app_deployment(
            TargetId::new(request.target_id),
            &request.app_name,
            &request.app_version,
        )
        .await?;
    Ok(Json(AppDeploymentResponse { deployment }))
}

/// Get the derived status of a deployment
pub async fn get_app_deployment_status(
    State(state): State<AppState>,
    Path((name, version)): Path<(String, String)>,
) -> ApiResult<Json<AppDeploymentStatus>> {
    let deployment = state.manager.get_app_deployment(&name, &version).await?;
    Ok(Json(state.manager.get_status_for_app_deployment(&deployment)))
}

/// Look up the deployment for a target by name and optional version
pub async fn get_app_deployment_for_target(
    State(state): State<AppState>,
    Path(target): Path<String>,
    Query(query): Query<TargetLookupQuery>,
) -> ApiResult<Json<AppDeploymentResponse>> {
    let deployment = state
        .manager
        .get_app_deployment_for_target(
            &TargetId::new(target),
            &query.name,
            query.version.as_deref(),
        )
        .await?;
    Ok(Json(AppDeploymentResponse { deployment }))
}
