//! Error taxonomy for the conversion form.
//!
//! None of these are fatal: callers recover locally by keeping stale rates,
//! falling back to empty persisted state, or flagging a single entry.

use crate::core::currency::CurrencyCode;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Failed to fetch rates for {base}: {reason}")]
    Network { base: CurrencyCode, reason: String },
    #[error("Failed to parse stored '{key}': {reason}")]
    Parse { key: String, reason: String },
    #[error("No rate available for {target} in the {base} rate table")]
    RateUnavailable {
        base: CurrencyCode,
        target: CurrencyCode,
    },
    #[error("Rates for {base} have not been loaded")]
    RatesNotLoaded { base: CurrencyCode },
    #[error("The first target currency cannot be removed")]
    PrimaryTarget,
    #[error("No target currency at index {index} (have {len})")]
    TargetIndex { index: usize, len: usize },
    #[error("Invalid amount: '{0}'")]
    InvalidAmount(f64),
    #[error("Invalid currency code: '{0}'")]
    InvalidCurrency(String),
    #[error("Invalid favorite pair: '{0}'")]
    InvalidPair(String),
}

pub type Result<T> = std::result::Result<T, Error>;
