//! Content-addressed persisted documents
//!
//! A persisted document is identified by a deterministic hash of its
//! canonicalized GraphQL source. Canonicalization strips comments and
//! collapses insignificant whitespace so that formatting differences never
//! produce distinct hashes, while string literals are preserved byte for
//! byte.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A persisted GraphQL operation document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedDocument {
    /// Content hash of the canonicalized body (sha256, hex)
    pub hash: String,
    /// Canonicalized document text
    pub body: String,
}

impl PersistedDocument {
    /// Canonicalize `source` and derive the content hash
    pub fn from_source(source: &str) -> Self {
        let body = canonicalize_document(source);
        let hash = hash_canonical(&body);
        Self { hash, body }
    }
}

/// Compute the content hash of a raw document source
///
/// Equivalent to `PersistedDocument::from_source(source).hash`.
pub fn compute_document_hash(source: &str) -> String {
    hash_canonical(&canonicalize_document(source))
}

fn hash_canonical(canonical: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}

/// Normalize GraphQL source: drop `#` comments, collapse whitespace runs to
/// a single space, trim the ends. String literals (both `"..."` and block
/// `"""..."""`) pass through untouched.
pub fn canonicalize_document(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut pending_space = false;

    while let Some(c) = chars.next() {
        match c {
            '#' => {
                // Comment runs to end of line
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
                pending_space = true;
            }
            c if c.is_whitespace() => {
                pending_space = true;
            }
            '"' => {
                if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                copy_string_literal(&mut out, &mut chars);
            }
            c => {
                if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.push(c);
            }
        }
    }

    out
}

/// Copy a string literal verbatim. The opening quote has been consumed;
/// decides between `"` and `"""` by lookahead.
fn copy_string_literal(out: &mut String, chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    out.push('"');

    // Detect a block string: two more quotes follow the opener
    let mut probe = chars.clone();
    let block = probe.next() == Some('"') && probe.next() == Some('"');

    if block {
        chars.next();
        chars.next();
        out.push_str("\"\"");
        let mut quotes = 0;
        for c in chars.by_ref() {
            out.push(c);
            if c == '"' {
                quotes += 1;
                if quotes == 3 {
                    return;
                }
            } else {
                quotes = 0;
            }
        }
    } else {
        let mut escaped = false;
        for c in chars.by_ref() {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                return;
            }
        }
    }
}
