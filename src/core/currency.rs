//! Currency codes, rate tables and the rate provider abstraction.

use crate::core::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// A currency identifier such as `usd`.
///
/// Codes are stored lower case so they can be used directly as rate keys;
/// `Display` renders them upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: &str) -> Result<Self> {
        let code = code.trim().to_lowercase();
        if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::InvalidCurrency(code));
        }
        Ok(Self(code))
    }

    /// For lower-case ASCII literals known to be valid.
    pub(crate) fn from_static(code: &'static str) -> Self {
        Self(code.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_uppercase())
    }
}

impl FromStr for CurrencyCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

/// Exchange rates relative to a single base currency.
///
/// A table always holds the identity entry for its own base and only positive,
/// finite rates. Tables are replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    base: CurrencyCode,
    rates: BTreeMap<CurrencyCode, f64>,
}

impl RateTable {
    pub fn new(base: CurrencyCode, rates: impl IntoIterator<Item = (CurrencyCode, f64)>) -> Self {
        let mut table: BTreeMap<CurrencyCode, f64> = BTreeMap::new();
        for (code, rate) in rates {
            if rate.is_finite() && rate > 0.0 {
                table.insert(code, rate);
            } else {
                debug!("Skipping unusable rate {rate} for {code} in {base} table");
            }
        }
        table.insert(base.clone(), 1.0);
        Self { base, rates: table }
    }

    pub fn base(&self) -> &CurrencyCode {
        &self.base
    }

    pub fn rate(&self, code: &CurrencyCode) -> Option<f64> {
        self.rates.get(code).copied()
    }

    /// Currency codes in the table, sorted.
    pub fn codes(&self) -> impl Iterator<Item = &CurrencyCode> {
        self.rates.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CurrencyCode, f64)> {
        self.rates.iter().map(|(code, rate)| (code, *rate))
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetches the full rate table for `base`. One attempt, no retries.
    async fn fetch_rates(&self, base: &CurrencyCode) -> Result<RateTable>;
}
