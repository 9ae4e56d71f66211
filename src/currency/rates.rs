//! Exchange-rate tables and normalization into the base currency

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::*;

/// Snapshot of exchange rates into one base currency.
///
/// Replaced wholesale on refresh, never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub base_currency: String,
    /// Multiplier taking one unit of the keyed currency into the base currency
    pub rates: HashMap<String, BigDecimal>,
    pub fetched_at: DateTime<Utc>,
}

impl RateTable {
    /// Create a new rate table
    pub fn new(
        base_currency: String,
        rates: HashMap<String, BigDecimal>,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            base_currency,
            rates,
            fetched_at,
        }
    }

    /// A table holding only the identity rate for `base_currency`
    pub fn identity(base_currency: String) -> Self {
        Self::new(base_currency, HashMap::new(), Utc::now())
    }
}

/// Result of bringing an expense amount into the base currency
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedAmount {
    pub amount_base: BigDecimal,
    pub rate: BigDecimal,
    pub source: RateSource,
}

/// Converts trip currencies into the base currency
#[derive(Debug, Clone)]
pub struct CurrencyNormalizer {
    stale_after: chrono::Duration,
    money_scale: i64,
}

impl Default for CurrencyNormalizer {
    fn default() -> Self {
        Self::new(
            chrono::Duration::seconds(crate::config::DEFAULT_RATE_STALE_AFTER_SECS),
            crate::config::DEFAULT_MONEY_SCALE,
        )
    }
}

impl CurrencyNormalizer {
    /// Create a normalizer with the given staleness threshold
    pub fn new(stale_after: chrono::Duration, money_scale: i64) -> Self {
        Self {
            stale_after,
            money_scale,
        }
    }

    /// Rate converting one unit of `from` into the table's base currency.
    ///
    /// `None` means the rate is unavailable. It must never be read as 1.
    pub fn rate(&self, table: &RateTable, from: &str) -> Option<BigDecimal> {
        if from == table.base_currency {
            return Some(BigDecimal::from(1));
        }
        table.rates.get(from).cloned()
    }

    /// Convert `amount` from `from` into the base currency, unrounded
    pub fn convert(&self, table: &RateTable, amount: &BigDecimal, from: &str) -> Option<BigDecimal> {
        if from == table.base_currency {
            return Some(amount.clone());
        }
        self.rate(table, from).map(|rate| amount * rate)
    }

    /// Whether the table should be refreshed before the next use.
    ///
    /// Advisory only; normalization keeps using whatever table is held.
    pub fn is_stale(&self, table: &RateTable, requested_base: &str, now: DateTime<Utc>) -> bool {
        table.base_currency != requested_base || now - table.fetched_at > self.stale_after
    }

    /// Convert an expense amount for storage, rounded to the money scale.
    ///
    /// With `allow_parity_fallback`, a missing rate is replaced by 1 and the
    /// result is marked [`RateSource::AssumedParity`] so it can be surfaced.
    pub fn normalize(
        &self,
        table: &RateTable,
        amount: &BigDecimal,
        from: &str,
        allow_parity_fallback: bool,
    ) -> TripResult<NormalizedAmount> {
        if from == table.base_currency {
            return Ok(NormalizedAmount {
                amount_base: amount.clone(),
                rate: BigDecimal::from(1),
                source: RateSource::Base,
            });
        }

        match self.rate(table, from) {
            Some(rate) => Ok(NormalizedAmount {
                amount_base: round_money(&(amount * &rate), self.money_scale),
                rate,
                source: RateSource::Table,
            }),
            None if allow_parity_fallback => {
                tracing::warn!(
                    currency = from,
                    base = %table.base_currency,
                    "exchange rate unavailable, assuming parity"
                );
                Ok(NormalizedAmount {
                    amount_base: amount.clone(),
                    rate: BigDecimal::from(1),
                    source: RateSource::AssumedParity,
                })
            }
            None => Err(TripError::RateUnavailable(from.to_string())),
        }
    }
}
