//! In-memory store implementation.
//!
//! Backs `--local` runs (records loaded from a JSON file) and the
//! aggregator tests, which need a store they can script without a live
//! endpoint.

use crate::store::{glob_match, KvEntry, KvStore, StoreError};
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;

/// Store over a fixed set of entries.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: Vec<KvEntry>,
}

impl MemoryStore {
    /// Store with no entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Store over the given entries.
    pub fn new(entries: Vec<KvEntry>) -> Self {
        Self { entries }
    }

    /// Store over record payloads, keyed `resume:0`, `resume:1`, ...
    pub fn from_records(records: Vec<Value>) -> Self {
        let entries = records
            .into_iter()
            .enumerate()
            .map(|(i, value)| KvEntry {
                key: format!("resume:{i}"),
                value,
            })
            .collect();
        Self { entries }
    }

    /// Load entries from a JSON file.
    ///
    /// Accepts either an array of `{key, value}` entries or a bare array
    /// of record objects (keyed by position).
    pub fn from_json_file(path: &Path) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path)?;
        let parsed: Value = serde_json::from_str(&content)
            .map_err(|e| StoreError::Decode(format!("{}: {e}", path.display())))?;

        let Value::Array(items) = parsed else {
            return Err(StoreError::Decode(format!(
                "{}: expected a JSON array",
                path.display()
            )));
        };

        let looks_like_entries = items
            .iter()
            .all(|v| v.get("key").map_or(false, Value::is_string) && v.get("value").is_some());

        if looks_like_entries && !items.is_empty() {
            let entries = serde_json::from_value(Value::Array(items))
                .map_err(|e| StoreError::Decode(format!("{}: {e}", path.display())))?;
            Ok(Self::new(entries))
        } else {
            Ok(Self::from_records(items))
        }
    }

    /// Number of entries, regardless of pattern.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn list(&self, pattern: &str, include_values: bool) -> Result<Vec<KvEntry>, StoreError> {
        Ok(self
            .entries
            .iter()
            .filter(|e| glob_match(pattern, &e.key))
            .map(|e| KvEntry {
                key: e.key.clone(),
                value: if include_values {
                    e.value.clone()
                } else {
                    Value::Null
                },
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_list_filters_by_pattern() {
        let store = MemoryStore::new(vec![
            KvEntry {
                key: "resume:1".into(),
                value: json!({"jobTitle": "QA"}),
            },
            KvEntry {
                key: "user:1".into(),
                value: json!({"name": "sam"}),
            },
        ]);

        let entries = store.list("resume:*", true).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, "resume:1");
    }

    #[tokio::test]
    async fn test_list_without_values() {
        let store = MemoryStore::from_records(vec![json!({"jobTitle": "QA"})]);
        let entries = store.list("resume:*", false).await.unwrap();
        assert!(entries[0].value.is_null());
    }

    #[test]
    fn test_from_json_file_bare_records() {
        let dir = std::env::temp_dir();
        let path = dir.join("resumetrics_test_records.json");
        std::fs::write(&path, r#"[{"jobTitle": "Dev"}, {"jobTitle": "Ops"}]"#).unwrap();

        let store = MemoryStore::from_json_file(&path).unwrap();
        assert_eq!(store.len(), 2);
        std::fs::remove_file(&path).ok();
    }
}
