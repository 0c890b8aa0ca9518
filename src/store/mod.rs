//! Key-value store clients.
//!
//! The record store is an external collaborator: resume records are
//! persisted by the front end under `resume:*` keys and this tool only
//! ever performs bulk reads against a glob-style key pattern. The store
//! is injected behind the [`KvStore`] trait so the aggregation engine is
//! testable against an in-memory fake.

pub mod http;
pub mod memory;

pub use http::HttpKvStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors raised by a store client.
///
/// The aggregation layer recovers from all of these by publishing an
/// absent snapshot; nothing here is fatal to the host process.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store endpoint could not be reached or returned an error.
    #[error("store request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The store responded with a payload we could not decode.
    #[error("unexpected store response: {0}")]
    Decode(String),

    /// Local fixture file could not be read.
    #[error("failed to read store fixture: {0}")]
    Io(#[from] std::io::Error),
}

/// One entry returned by a bulk read.
///
/// `value` is kept untyped: stores differ on whether they return the
/// serialized payload as a JSON string or as an already-decoded object,
/// and deserialization failures must stay per-record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KvEntry {
    pub key: String,
    #[serde(default)]
    pub value: Value,
}

/// Bulk-read access to the external record store.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// List all entries whose key matches a glob-style pattern
    /// (e.g. `resume:*`).
    ///
    /// Ordering is not guaranteed. When `include_values` is false the
    /// entries carry null values. An empty result is not an error.
    async fn list(&self, pattern: &str, include_values: bool) -> Result<Vec<KvEntry>, StoreError>;
}

/// Match a key against a glob pattern supporting `*` wildcards.
///
/// This is the subset of globbing the record store implements: `*`
/// matches any run of characters, everything else is literal.
pub(crate) fn glob_match(pattern: &str, key: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == key;
    }

    let mut rest = key;
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        if i == 0 {
            match rest.strip_prefix(part) {
                Some(r) => rest = r,
                None => return false,
            }
        } else if i == parts.len() - 1 {
            return rest.ends_with(part);
        } else {
            match rest.find(part) {
                Some(pos) => rest = &rest[pos + part.len()..],
                None => return false,
            }
        }
    }

    // Pattern ended with `*`, which matches any remainder.
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_prefix() {
        assert!(glob_match("resume:*", "resume:abc-123"));
        assert!(glob_match("resume:*", "resume:"));
        assert!(!glob_match("resume:*", "user:abc"));
    }

    #[test]
    fn test_glob_literal() {
        assert!(glob_match("resume:42", "resume:42"));
        assert!(!glob_match("resume:42", "resume:421"));
    }

    #[test]
    fn test_glob_infix_and_suffix() {
        assert!(glob_match("resume:*:draft", "resume:abc:draft"));
        assert!(!glob_match("resume:*:draft", "resume:abc:final"));
        assert!(glob_match("*:draft", "resume:abc:draft"));
    }
}
