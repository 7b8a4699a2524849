//! Persisted-document resolver
//!
//! The request-facing entry point: takes a normalized document reference,
//! consults the resolution cache, and falls through to the content store
//! on miss. When resolution is not configured the resolver is a no-op fast
//! path: no cache, no HTTP client, no network calls.

use crate::cache::{access_scope, CacheConfig, CacheKey, Cached, ResolutionCache};
use crate::cdn::{CdnClient, CdnError};
use crate::error::ResolveError;
use crate::reference::DocumentReference;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Configuration surface for persisted-document resolution
#[derive(Debug, Clone)]
pub struct PersistedDocumentsConfig {
    /// CDN base URL
    pub endpoint: String,
    /// Credential forwarded on every CDN fetch
    pub access_key: String,
    /// When false, the resolver is fully bypassed
    pub enabled: bool,
    /// Per-fetch timeout; expiry counts as a transient failure
    pub timeout: Duration,
    /// Cache tuning
    pub cache: CacheConfig,
}

impl Default for PersistedDocumentsConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            access_key: String::new(),
            enabled: false,
            timeout: Duration::from_secs(10),
            cache: CacheConfig::default(),
        }
    }
}

/// Resolves opaque document references into executable GraphQL source
///
/// The resolved text is handed to the execution engine as if the client had
/// submitted it literally; this type neither validates nor executes it.
pub struct PersistedDocuments {
    inner: Option<Arc<Inner>>,
}

struct Inner {
    client: CdnClient,
    cache: ResolutionCache,
    scope: String,
}

impl PersistedDocuments {
    /// Build a resolver from configuration. A disabled configuration
    /// allocates nothing.
    pub fn new(config: PersistedDocumentsConfig) -> Result<Self, ResolveError> {
        if !config.enabled {
            return Ok(Self { inner: None });
        }

        let client = CdnClient::new(&config.endpoint, &config.access_key, config.timeout)
            .map_err(|e| ResolveError::Unavailable {
                reason: e.to_string(),
            })?;
        let scope = access_scope(&config.access_key);

        Ok(Self {
            inner: Some(Arc::new(Inner {
                client,
                cache: ResolutionCache::new(config.cache),
                scope,
            })),
        })
    }

    /// Whether resolution is configured for this server
    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Resolve a reference into document text
    #[instrument(skip(self))]
    pub async fn resolve(&self, reference: &DocumentReference) -> Result<String, ResolveError> {
        let inner = self.inner.as_ref().ok_or(ResolveError::Disabled)?;

        let normalized = reference.normalize()?;
        let key = CacheKey::new(inner.client.endpoint(), &inner.scope, &normalized);

        let client = inner.client.clone();
        let loaded = inner
            .cache
            .get_or_load(key, move || async move { client.fetch(&normalized).await })
            .await
            .map_err(|e| match e {
                CdnError::Upstream { status, body } => ResolveError::Unavailable {
                    reason: format!("status {status}: {body}"),
                },
                CdnError::Transport(reason) => ResolveError::Unavailable { reason },
            })?;

        match loaded {
            Cached::Found(text) => Ok(text),
            Cached::Missing => {
                debug!("Persisted document not found upstream");
                Err(ResolveError::NotFound)
            }
        }
    }
}
