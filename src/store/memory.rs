use crate::core::storage::KeyValueStorage;
use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// In-memory storage backed by a HashMap. Nothing survives the process.
#[derive(Default)]
pub struct MemoryStorage {
    inner: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a storage pre-populated with `entries`.
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            inner: RwLock::new(map),
        }
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let map = self
            .inner
            .read()
            .map_err(|_| anyhow!("Memory storage lock poisoned"))?;
        let value = map.get(key).cloned();
        debug!(key, hit = value.is_some(), "Memory storage GET");
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| anyhow!("Memory storage lock poisoned"))?;
        debug!(key, "Memory storage SET");
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::{load_or_default, persist, read_json};
    use crate::core::Error;

    #[test]
    fn test_get_set() {
        let storage = MemoryStorage::new();

        assert!(storage.get("key1").unwrap().is_none());

        storage.set("key1", "one").unwrap();
        assert_eq!(storage.get("key1").unwrap().as_deref(), Some("one"));

        // Overwrite
        storage.set("key1", "uno").unwrap();
        assert_eq!(storage.get("key1").unwrap().as_deref(), Some("uno"));

        assert!(storage.get("key2").unwrap().is_none());
    }

    #[test]
    fn test_json_helpers_round_trip() {
        let storage = MemoryStorage::new();
        persist(&storage, "list", &vec!["a", "b"]);

        let loaded: Vec<String> = load_or_default(&storage, "list");
        assert_eq!(loaded, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_read_json_reports_parse_errors() {
        let storage = MemoryStorage::with_entries([("list", "{not json")]);
        let result = read_json::<Vec<String>>(&storage, "list");
        assert!(matches!(result, Err(Error::Parse { ref key, .. }) if key == "list"));

        // The lenient loader swallows the same failure
        let loaded: Vec<String> = load_or_default(&storage, "list");
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_load_or_default_for_missing_key() {
        let storage = MemoryStorage::new();
        let loaded: Vec<String> = load_or_default(&storage, "missing");
        assert!(loaded.is_empty());
    }
}
