//! Persisted-document resolution handlers
//!
//! The request-time entry points a GraphQL server plugin would hook into.
//! Both the GraphQL-over-HTTP `documentId` body field and the REST-style
//! `client-name/client-version/hash` path normalize into the same
//! resolver call. Execution stays out of scope: the handlers return the
//! resolved document text, mapping resolver failures to 404 or 503.

use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};
use arbor_resolver::DocumentReference;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

/// GraphQL-over-HTTP request body carrying a document reference
#[derive(Debug, Deserialize)]
pub struct GraphQlRequest {
    #[serde(rename = "documentId")]
    pub document_id: Option<String>,
}

/// Resolved document response
#[derive(Debug, Serialize)]
pub struct ResolvedDocumentResponse {
    pub document: String,
}

/// Resolve a `documentId` from the request body
pub async fn resolve_document_id(
    State(state): State<AppState>,
    Json(request): Json<GraphQlRequest>,
) -> ApiResult<Json<ResolvedDocumentResponse>> {
    let document_id = request
        .document_id
        .ok_or_else(|| ApiError::BadRequest("documentId is required".into()))?;

    let document = state
        .resolver
        .resolve(&DocumentReference::ByDocumentId(document_id))
        .await?;
    Ok(Json(ResolvedDocumentResponse { document }))
}

/// Resolve a REST-style `client-name/client-version/hash` path
pub async fn resolve_document_path(
    State(state): State<AppState>,
    Path((client_name, client_version, hash)): Path<(String, String, String)>,
) -> ApiResult<Json<ResolvedDocumentResponse>> {
    let document = state
        .resolver
        .resolve(&DocumentReference::ByPath {
            client_name,
            client_version,
            hash,
        })
        .await?;
    Ok(Json(ResolvedDocumentResponse { document }))
}
