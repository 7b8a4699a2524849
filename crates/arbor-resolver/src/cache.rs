//! Resolution cache
//!
//! Bounded, TTL-aware cache in front of the content store. Keys are scoped
//! by endpoint and credential so entries never cross tenant boundaries.
//! Loads are single-flight: concurrent callers for one key share a single
//! upstream fetch, and the fetch runs detached so one departing caller
//! never cancels it for the other waiters.
//!
//! Not-found results are cached with a shorter TTL than positive results.
//! Transient failures are shared with current waiters but never cached.
//! There is no invalidation API: content addressing makes stale positives
//! safe by construction.

use crate::cdn::CdnError;
use dashmap::DashMap;
use futures::channel::oneshot;
use futures::future::{FutureExt, Shared};
use lru::LruCache;
use sha2::{Digest, Sha256};
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;

/// Cache tuning
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum entry count; least-recently-used entries are evicted
    pub max_entries: usize,
    /// TTL for resolved documents
    pub positive_ttl: Duration,
    /// TTL for not-found results
    pub negative_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            positive_ttl: Duration::from_secs(15 * 60),
            negative_ttl: Duration::from_secs(30),
        }
    }
}

/// Digest of an access credential, safe to hold in cache keys and logs
pub fn access_scope(access_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(access_key.as_bytes());
    hex::encode(&hasher.finalize()[..8])
}

/// Key for one resolution attempt, scoped by endpoint and credential
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    endpoint: String,
    access_scope: String,
    reference: String,
}

impl CacheKey {
    pub fn new(endpoint: &str, access_scope: &str, reference: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            access_scope: access_scope.to_string(),
            reference: reference.to_string(),
        }
    }
}

/// Outcome of a completed load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cached {
    /// Document text as returned by the store
    Found(String),
    /// The store reported not-found (negative entry)
    Missing,
}

struct CacheEntry {
    value: Cached,
    inserted_at: Instant,
}

type FlightResult = Result<Cached, CdnError>;
type InFlight = Shared<oneshot::Receiver<FlightResult>>;

/// Read-through cache with single-flight load de-duplication
pub struct ResolutionCache {
    inner: Arc<CacheInner>,
}

struct CacheInner {
    entries: Mutex<LruCache<CacheKey, CacheEntry>>,
    in_flight: DashMap<CacheKey, InFlight>,
    positive_ttl: Duration,
    negative_ttl: Duration,
}

impl ResolutionCache {
    pub fn new(config: CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Arc::new(CacheInner {
                entries: Mutex::new(LruCache::new(capacity)),
                in_flight: DashMap::new(),
                positive_ttl: config.positive_ttl,
                negative_ttl: config.negative_ttl,
            }),
        }
    }

    /// Return the cached value for `key`, or run `loader` to produce it
    ///
    /// The loader is invoked at most once per key under concurrent load;
    /// callers arriving while a load is in flight await its outcome. The
    /// load itself runs on a spawned task, so it completes and populates
    /// the cache even if every caller is cancelled.
    pub async fn get_or_load<F, Fut>(&self, key: CacheKey, loader: F) -> FlightResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<String>, CdnError>> + Send + 'static,
    {
        if let Some(hit) = self.inner.lookup(&key) {
            return Ok(hit);
        }

        let shared = match self.inner.in_flight.entry(key.clone()) {
            dashmap::mapref::entry::Entry::Occupied(entry) => entry.get().clone(),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                let (tx, rx) = oneshot::channel();
                let shared = rx.shared();
                entry.insert(shared.clone());

                let inner = Arc::clone(&self.inner);
                let load = loader();
                let flight_key = key.clone();
                tokio::spawn(async move {
                    let result = load.await.map(|found| match found {
                        Some(text) => Cached::Found(text),
                        None => Cached::Missing,
                    });
                    if let Ok(value) = &result {
                        inner.insert(flight_key.clone(), value.clone());
                    }
                    inner.in_flight.remove(&flight_key);
                    let _ = tx.send(result);
                });
                debug!(reference = %key.reference, "Started document load");

                shared
            }
        };

        match shared.await {
            Ok(result) => result,
            // The load task was dropped before sending; only possible when
            // the runtime is shutting down
            Err(_) => Err(CdnError::Transport("document load was dropped".into())),
        }
    }
}

impl CacheInner {
    fn lookup(&self, key: &CacheKey) -> Option<Cached> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(key)?;
        let ttl = match entry.value {
            Cached::Found(_) => self.positive_ttl,
            Cached::Missing => self.negative_ttl,
        };
        if entry.inserted_at.elapsed() > ttl {
            entries.pop(key);
            return None;
        }
        Some(entry.value.clone())
    }

    fn insert(&self, key: CacheKey, value: Cached) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.put(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }
}
