//! The conversion form: one long-lived piece of state that owns the current
//! request, the latest rate table, and the favorites and history stores.
//!
//! Every user action is a plain method call. Rate fetching is split into a
//! ticket (`RateRequest`) and an apply step so that a response arriving after
//! the base currency moved on can be recognised and discarded.

use crate::core::config::FormDefaults;
use crate::core::convert::convert;
use crate::core::currency::{CurrencyCode, RateProvider, RateTable};
use crate::core::error::{Error, Result};
use crate::core::favorites::{FavoritePair, Favorites};
use crate::core::history::{History, HistoryEntry};
use crate::core::storage::KeyValueStorage;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

/// Ticket for one rate fetch. Only the most recently issued ticket can
/// install its response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateRequest {
    pub base: CurrencyCode,
    generation: u64,
}

/// What `apply_rates` did with a fetch response.
#[derive(Debug, Clone, PartialEq)]
pub enum RateUpdate {
    /// The table was installed.
    Applied,
    /// A newer request was issued since; the response was ignored.
    Stale,
    /// The fetch failed; any previous table is kept.
    Failed(Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateStatus {
    Idle,
    Pending,
    Ready,
    Failed,
}

pub struct ConverterForm {
    amount: f64,
    from: CurrencyCode,
    targets: Vec<CurrencyCode>,
    amounts: Vec<Option<f64>>,
    new_target: CurrencyCode,
    rates: Option<RateTable>,
    rate_status: RateStatus,
    generation: u64,
    favorites: Favorites,
    history: History,
}

impl ConverterForm {
    /// Builds a fresh form and loads favorites and history from `storage`.
    pub fn new(defaults: &FormDefaults, storage: Arc<dyn KeyValueStorage>) -> Self {
        let mut targets = defaults.targets.clone();
        if targets.is_empty() {
            targets.push(defaults.new_target.clone());
        }
        let amounts = vec![Some(0.0); targets.len()];
        Self {
            amount: 0.0,
            from: defaults.from.clone(),
            targets,
            amounts,
            new_target: defaults.new_target.clone(),
            rates: None,
            rate_status: RateStatus::Idle,
            generation: 0,
            favorites: Favorites::load(Arc::clone(&storage)),
            history: History::load(storage),
        }
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn from(&self) -> &CurrencyCode {
        &self.from
    }

    pub fn targets(&self) -> &[CurrencyCode] {
        &self.targets
    }

    pub fn amounts(&self) -> &[Option<f64>] {
        &self.amounts
    }

    pub fn rates(&self) -> Option<&RateTable> {
        self.rates.as_ref()
    }

    pub fn rate_status(&self) -> RateStatus {
        self.rate_status
    }

    pub fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Sets the base currency and returns a ticket for fetching its rates.
    /// Existing amounts are left as they are.
    pub fn change_from(&mut self, code: CurrencyCode) -> RateRequest {
        debug!("Base currency changed {} -> {}", self.from, code);
        self.from = code;
        self.request_rates()
    }

    /// Issues a ticket for the current base currency, superseding any
    /// outstanding one.
    pub fn request_rates(&mut self) -> RateRequest {
        self.generation += 1;
        self.rate_status = RateStatus::Pending;
        RateRequest {
            base: self.from.clone(),
            generation: self.generation,
        }
    }

    /// Installs the outcome of the fetch issued for `request`.
    pub fn apply_rates(&mut self, request: &RateRequest, result: Result<RateTable>) -> RateUpdate {
        if request.generation != self.generation || request.base != self.from {
            debug!(
                "Discarding stale rates for {} (generation {}, current {} at {})",
                request.base, request.generation, self.from, self.generation
            );
            return RateUpdate::Stale;
        }

        match result {
            Ok(table) if table.base() == &request.base => {
                debug!("Installed {} rates for {}", table.len(), table.base());
                self.rates = Some(table);
                self.rate_status = RateStatus::Ready;
                RateUpdate::Applied
            }
            Ok(table) => {
                let e = Error::Network {
                    base: request.base.clone(),
                    reason: format!("provider returned a {} table", table.base()),
                };
                warn!(error = %e, "Rejected rate table");
                self.rate_status = RateStatus::Failed;
                RateUpdate::Failed(e)
            }
            Err(e) => {
                warn!(error = %e, "Rate fetch failed, keeping previous rates");
                self.rate_status = RateStatus::Failed;
                RateUpdate::Failed(e)
            }
        }
    }

    /// Requests, fetches and applies rates for the current base in one go.
    pub async fn refresh_rates(&mut self, provider: &dyn RateProvider) -> RateUpdate {
        let request = self.request_rates();
        let result = provider.fetch_rates(&request.base).await;
        self.apply_rates(&request, result)
    }

    /// Currency choices offered for selection. Empty until a fetch succeeds,
    /// and again after a failed fetch.
    pub fn currency_options(&self) -> Vec<CurrencyCode> {
        match (&self.rates, self.rate_status) {
            (_, RateStatus::Failed) | (None, _) => Vec::new(),
            (Some(table), _) => table.codes().cloned().collect(),
        }
    }

    /// Sets the amount to convert. Non-finite values are rejected and the
    /// previous amount is kept.
    pub fn change_amount(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(Error::InvalidAmount(value));
        }
        self.amount = value;
        Ok(())
    }

    pub fn change_target_currency(&mut self, index: usize, code: CurrencyCode) -> Result<()> {
        let len = self.targets.len();
        let slot = self
            .targets
            .get_mut(index)
            .ok_or(Error::TargetIndex { index, len })?;
        *slot = code;
        Ok(())
    }

    /// Appends the default new target with a zero placeholder amount.
    pub fn add_target(&mut self) {
        self.targets.push(self.new_target.clone());
        self.amounts.push(Some(0.0));
    }

    /// Removes the target at `index`. The first target is never removed.
    pub fn remove_target(&mut self, index: usize) -> Result<()> {
        if index == 0 {
            return Err(Error::PrimaryTarget);
        }
        if index >= self.targets.len() {
            return Err(Error::TargetIndex {
                index,
                len: self.targets.len(),
            });
        }
        self.targets.remove(index);
        self.amounts.remove(index);
        Ok(())
    }

    pub fn can_remove(&self, index: usize) -> bool {
        index > 0 && index < self.targets.len()
    }

    /// Exchanges the base with the first target, and the amount with the first
    /// converted amount. Does not fetch or convert; call `request_rates` next.
    pub fn swap(&mut self) {
        let previous_amount = self.amount;
        self.amount = self.amounts[0].unwrap_or(0.0);
        self.amounts[0] = Some(previous_amount);
        std::mem::swap(&mut self.from, &mut self.targets[0]);
        debug!("Swapped to {} -> {}", self.from, self.targets[0]);
    }

    /// Converts the current amount into every target and records the result.
    pub fn submit_convert(&mut self) -> Result<&[Option<f64>]> {
        self.submit_convert_at(Utc::now())
    }

    pub fn submit_convert_at(&mut self, timestamp: DateTime<Utc>) -> Result<&[Option<f64>]> {
        let rates = self
            .rates
            .as_ref()
            .filter(|table| table.base() == &self.from)
            .ok_or_else(|| Error::RatesNotLoaded {
                base: self.from.clone(),
            })?;

        let amounts: Vec<Option<f64>> = convert(self.amount, rates, &self.targets)
            .into_iter()
            .map(|res| match res {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(error = %e, "Target left unconverted");
                    None
                }
            })
            .collect();

        self.amounts = amounts;
        self.history.append(HistoryEntry {
            from: self.from.clone(),
            targets: self.targets.clone(),
            amounts: self.amounts.clone(),
            timestamp,
        });
        Ok(&self.amounts)
    }

    /// Favorite pair for the target at `index`.
    pub fn pair_for(&self, index: usize) -> Result<FavoritePair> {
        self.targets
            .get(index)
            .map(|to| FavoritePair::new(&self.from, to))
            .ok_or(Error::TargetIndex {
                index,
                len: self.targets.len(),
            })
    }

    pub fn is_favorite(&self, index: usize) -> bool {
        self.pair_for(index)
            .map(|pair| self.favorites.contains(&pair))
            .unwrap_or(false)
    }

    /// Returns whether `pair` is a favorite after toggling.
    pub fn toggle_favorite(&mut self, pair: FavoritePair) -> bool {
        self.favorites.toggle(pair)
    }

    pub fn submit_label(&self) -> String {
        if self.targets.len() > 1 {
            format!("Convert {} to Multiple Currencies", self.from)
        } else {
            format!("Convert {} to {}", self.from, self.targets[0])
        }
    }
}
