pub mod disk;
pub mod memory;

use crate::core::config::AppConfig;
use crate::core::storage::KeyValueStorage;
use anyhow::Result;
use disk::DiskStorage;
use std::sync::Arc;

/// Opens the durable storage under the configured data directory.
pub fn open_storage(config: &AppConfig) -> Result<Arc<dyn KeyValueStorage>> {
    let path = config.default_data_path()?.join("storage");
    Ok(Arc::new(DiskStorage::open(&path)?))
}
