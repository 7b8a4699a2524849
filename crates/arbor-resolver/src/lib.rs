//! Arbor Resolver - request-time persisted-document resolution
//!
//! A running GraphQL server hands this crate an opaque document reference
//! (a `documentId` from the request body or a REST-style
//! `client-name/client-version/hash` path segment) and gets back the
//! operation source text, fetched from a CDN-backed content store and
//! cached locally.
//!
//! The cache is derived state only: content addressing guarantees a hash
//! never changes meaning, so it is safe to drop and rebuild at any time.
//! Concurrent lookups for the same key collapse into a single upstream
//! fetch (single-flight).

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod cache;
pub mod cdn;
pub mod error;
pub mod reference;
pub mod resolver;

// Re-exports
pub use cache::{access_scope, CacheConfig, CacheKey, Cached, ResolutionCache};
pub use cdn::{CdnClient, CdnError, CDN_ACCESS_KEY_HEADER};
pub use error::ResolveError;
pub use reference::DocumentReference;
pub use resolver::{PersistedDocuments, PersistedDocumentsConfig};
