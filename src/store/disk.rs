use crate::core::storage::KeyValueStorage;
use anyhow::{Context, Result};
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

const PARTITION: &str = "form";

/// Durable storage on top of a fjall keyspace. Every write is synced to disk
/// before returning.
pub struct DiskStorage {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskStorage {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create storage directory: {}", path.display()))?;

        let keyspace = Config::new(path)
            .open()
            .with_context(|| format!("Failed to open storage at {}", path.display()))?;
        let partition = keyspace
            .open_partition(PARTITION, PartitionCreateOptions::default())
            .context("Failed to open storage partition")?;
        debug!("Opened disk storage at {}", path.display());

        Ok(Self {
            keyspace,
            partition,
        })
    }
}

impl KeyValueStorage for DiskStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let Some(value) = self.partition.get(key)? else {
            debug!(key, "Disk storage MISS");
            return Ok(None);
        };
        let text = std::str::from_utf8(&value)
            .with_context(|| format!("Stored value for '{key}' is not UTF-8"))?;
        debug!(key, "Disk storage HIT");
        Ok(Some(text.to_string()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.partition.insert(key, value)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        debug!(key, "Disk storage SET");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_disk_storage_get_set() {
        let dir = tempdir().unwrap();
        let storage = DiskStorage::open(dir.path()).unwrap();

        assert!(storage.get("favorites").unwrap().is_none());

        storage.set("favorites", r#"["inr_usd"]"#).unwrap();
        assert_eq!(
            storage.get("favorites").unwrap().as_deref(),
            Some(r#"["inr_usd"]"#)
        );

        storage.set("favorites", "[]").unwrap();
        assert_eq!(storage.get("favorites").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_disk_storage_survives_reopen() {
        let dir = tempdir().unwrap();
        {
            let storage = DiskStorage::open(dir.path()).unwrap();
            storage.set("history", "[1,2,3]").unwrap();
        }

        let storage = DiskStorage::open(dir.path()).unwrap();
        assert_eq!(storage.get("history").unwrap().as_deref(), Some("[1,2,3]"));
    }
}
