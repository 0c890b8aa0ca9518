//! HTTP client for the record store's REST endpoint.
//!
//! Bulk reads go through `GET {base_url}/kv/list?pattern=...` which
//! returns a JSON array of `{key, value}` entries. The endpoint may
//! return `null` instead of an empty array when nothing matches; that is
//! treated as an empty result, not an error.

use crate::store::{KvEntry, KvStore, StoreError};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Default request timeout for store reads.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// reqwest-backed store client.
pub struct HttpKvStore {
    base_url: String,
    client: reqwest::Client,
}

impl HttpKvStore {
    /// Create a client for the store at `base_url`.
    pub fn new(base_url: &str, timeout_seconds: u64) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl KvStore for HttpKvStore {
    async fn list(&self, pattern: &str, include_values: bool) -> Result<Vec<KvEntry>, StoreError> {
        let url = format!("{}/kv/list", self.base_url);
        debug!(pattern, include_values, "listing store entries");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("pattern", pattern),
                ("returnValues", if include_values { "true" } else { "false" }),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response.json().await?;
        match body {
            // A store with no matching entries may answer null.
            Value::Null => Ok(Vec::new()),
            Value::Array(_) => serde_json::from_value(body)
                .map_err(|e| StoreError::Decode(format!("invalid entry list: {e}"))),
            other => Err(StoreError::Decode(format!(
                "expected an entry array, got {other}"
            ))),
        }
    }
}
