//! Key-value storage used to persist favorites and history.

use crate::core::error::Error;
use anyhow::Result;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

/// Synchronous string storage keyed by name, in the spirit of browser local
/// storage. Values are overwritten wholesale.
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Reads `key` as JSON. Absent keys yield `Ok(None)`; unreadable or
/// unparsable values yield `Error::Parse`.
pub fn read_json<T: DeserializeOwned>(
    storage: &dyn KeyValueStorage,
    key: &str,
) -> std::result::Result<Option<T>, Error> {
    let raw = storage.get(key).map_err(|e| Error::Parse {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    match raw {
        Some(text) => serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| Error::Parse {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        None => Ok(None),
    }
}

/// Like [`read_json`] but swallows every failure and falls back to the default.
pub fn load_or_default<T: DeserializeOwned + Default>(
    storage: &dyn KeyValueStorage,
    key: &str,
) -> T {
    match read_json(storage, key) {
        Ok(Some(value)) => value,
        Ok(None) => {
            debug!("No stored value for '{key}', using default");
            T::default()
        }
        Err(e) => {
            warn!(error = %e, "Ignoring stored value, using default");
            T::default()
        }
    }
}

/// Serialises `value` and overwrites `key`. Failures are logged, not returned.
pub fn persist<T: Serialize + ?Sized>(storage: &dyn KeyValueStorage, key: &str, value: &T) {
    let res: Result<()> = (|| {
        let text = serde_json::to_string(value)?;
        storage.set(key, &text)?;
        debug!("Persisted '{key}' ({} bytes)", text.len());
        Ok(())
    })();
    if let Err(e) = res {
        warn!(error = %e, "Failed to persist '{key}'");
    }
}
