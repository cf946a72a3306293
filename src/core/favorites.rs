//! Favorite currency pairs, persisted under the `favorites` key.

use crate::core::currency::CurrencyCode;
use crate::core::error::{Error, Result};
use crate::core::storage::{self, KeyValueStorage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

pub const FAVORITES_KEY: &str = "favorites";

/// A remembered `from_to` combination, e.g. `inr_usd`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FavoritePair {
    key: String,
    from: CurrencyCode,
    to: CurrencyCode,
}

impl FavoritePair {
    pub fn new(from: &CurrencyCode, to: &CurrencyCode) -> Self {
        Self {
            key: format!("{}_{}", from.as_str(), to.as_str()),
            from: from.clone(),
            to: to.clone(),
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidPair(s.to_string());
        let (from, to) = s.split_once('_').ok_or_else(invalid)?;
        let from = CurrencyCode::new(from).map_err(|_| invalid())?;
        let to = CurrencyCode::new(to).map_err(|_| invalid())?;
        Ok(Self::new(&from, &to))
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    pub fn from_currency(&self) -> &CurrencyCode {
        &self.from
    }

    pub fn to_currency(&self) -> &CurrencyCode {
        &self.to
    }
}

impl fmt::Display for FavoritePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl TryFrom<String> for FavoritePair {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<FavoritePair> for String {
    fn from(pair: FavoritePair) -> Self {
        pair.key
    }
}

/// The set of favorite pairs. Insertion order is kept for display, but the
/// collection never holds the same pair twice.
pub struct Favorites {
    pairs: Vec<FavoritePair>,
    storage: Arc<dyn KeyValueStorage>,
}

impl Favorites {
    /// Loads favorites from `storage`. Missing or corrupt data yields an empty set.
    pub fn load(storage: Arc<dyn KeyValueStorage>) -> Self {
        let raw: Vec<String> = storage::load_or_default(storage.as_ref(), FAVORITES_KEY);
        let mut pairs: Vec<FavoritePair> = Vec::with_capacity(raw.len());
        for item in raw {
            match FavoritePair::parse(&item) {
                Ok(pair) if !pairs.contains(&pair) => pairs.push(pair),
                Ok(pair) => debug!("Dropping duplicate favorite {pair}"),
                Err(e) => warn!(error = %e, "Dropping stored favorite"),
            }
        }
        debug!("Loaded {} favorites", pairs.len());
        Self { pairs, storage }
    }

    /// Adds `pair` if absent, removes it otherwise, then persists the full set.
    /// Returns whether the pair is a favorite afterwards.
    pub fn toggle(&mut self, pair: FavoritePair) -> bool {
        let now_favorite = if let Some(pos) = self.pairs.iter().position(|p| *p == pair) {
            self.pairs.remove(pos);
            debug!("Removed favorite {pair}");
            false
        } else {
            debug!("Added favorite {pair}");
            self.pairs.push(pair);
            true
        };
        storage::persist(self.storage.as_ref(), FAVORITES_KEY, &self.pairs);
        now_favorite
    }

    pub fn contains(&self, pair: &FavoritePair) -> bool {
        self.pairs.contains(pair)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FavoritePair> {
        self.pairs.iter()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
