//! Document reference shapes
//!
//! Requests carry a document reference in one of two forms: a `documentId`
//! field in the GraphQL-over-HTTP body, or a REST-style
//! `client-name/client-version/hash` URL path. Both normalize into one
//! canonical reference string before the cache is consulted.

use crate::error::ResolveError;

/// Source of a persisted-document reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentReference {
    /// `{"documentId": "..."}` from the request body; either a bare
    /// content hash or a three-segment path
    ByDocumentId(String),
    /// REST-style path segments from the request URL
    ByPath {
        client_name: String,
        client_version: String,
        hash: String,
    },
}

impl DocumentReference {
    /// Normalize into the canonical reference string appended to the CDN
    /// endpoint
    pub fn normalize(&self) -> Result<String, ResolveError> {
        match self {
            DocumentReference::ByDocumentId(id) => {
                let segments: Vec<&str> = id.split('/').collect();
                let well_formed = (segments.len() == 1 || segments.len() == 3)
                    && segments.iter().all(|s| is_valid_segment(s));
                if !well_formed {
                    return Err(ResolveError::InvalidReference(id.clone()));
                }
                Ok(id.clone())
            }
            DocumentReference::ByPath {
                client_name,
                client_version,
                hash,
            } => {
                for segment in [client_name, client_version, hash] {
                    if !is_valid_segment(segment) || segment.contains('/') {
                        return Err(ResolveError::InvalidReference(format!(
                            "{client_name}/{client_version}/{hash}"
                        )));
                    }
                }
                Ok(format!("{client_name}/{client_version}/{hash}"))
            }
        }
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty() && !segment.chars().any(char::is_whitespace)
}
