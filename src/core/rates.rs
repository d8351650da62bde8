//! Rate cache: refreshes USD-anchored rates from the API into the store and
//! serves tables pivoted to any known source currency.

use crate::core::api::ExchangeRateApi;
use crate::core::error::{RatesError, Result};
use crate::core::rate::{BASE_CURRENCY, Rate, pivot, rate_table, split_rate_code};
use crate::core::store::RateStore;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

pub const DEFAULT_REFRESH_COOLDOWN_MINUTES: i64 = 30;

/// One row of a conversion: `amount` of the source currency expressed in `code`.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub code: String,
    pub rate: f64,
    pub amount: f64,
}

pub struct RateCache<A: ExchangeRateApi, S: RateStore> {
    api: A,
    store: S,
    cooldown: Duration,
}

impl<A: ExchangeRateApi, S: RateStore> RateCache<A, S> {
    pub fn new(api: A, store: S) -> Self {
        Self::with_cooldown(api, store, Duration::minutes(DEFAULT_REFRESH_COOLDOWN_MINUTES))
    }

    pub fn with_cooldown(api: A, store: S, cooldown: Duration) -> Self {
        Self {
            api,
            store,
            cooldown,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Lists the currency codes currently known, the base currency included.
    /// Order is unspecified.
    pub fn list_currency_codes(&self) -> Result<Vec<String>> {
        let mut codes: Vec<String> = self
            .store
            .list_all()?
            .into_iter()
            .map(|rate| rate.code)
            .collect();
        codes.push(BASE_CURRENCY.to_string());
        Ok(codes)
    }

    /// Currency codes are derived from the rate data, so this refreshes the rates.
    pub async fn refresh_currency_codes(&self) -> Result<()> {
        self.refresh_rates().await
    }

    /// Returns the stored rates re-expressed relative to `source_currency_code`.
    /// Never touches the network.
    pub fn compute_rates(&self, source_currency_code: &str) -> Result<HashMap<String, f64>> {
        let rates = self.store.list_all()?;
        pivot(&rate_table(&rates), source_currency_code)
    }

    /// Converts `amount` of `source_currency_code` into every known currency,
    /// sorted by currency code.
    pub fn convert(&self, amount: f64, source_currency_code: &str) -> Result<Vec<Conversion>> {
        let mut conversions: Vec<Conversion> = self
            .compute_rates(source_currency_code)?
            .into_iter()
            .map(|(code, rate)| Conversion {
                code,
                rate,
                amount: amount * rate,
            })
            .collect();
        conversions.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(conversions)
    }

    pub fn last_update(&self) -> Result<Option<DateTime<Utc>>> {
        self.store.last_update()
    }

    /// Fetches fresh rates and replaces the stored ones.
    ///
    /// Fails with [`RatesError::TooFrequent`] without any network call while the
    /// cooldown since the last successful refresh is running. On any failure the
    /// stored rates and the last update time are left untouched.
    #[instrument(name = "RefreshRates", skip(self))]
    pub async fn refresh_rates(&self) -> Result<()> {
        let started_at = Utc::now();
        if let Some(last_update) = self.store.last_update()? {
            // A cooldown past the representable range never elapses
            let next_allowed = last_update
                .checked_add_signed(self.cooldown)
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            if started_at < next_allowed {
                debug!(%last_update, %next_allowed, "Skipping refresh, too frequent");
                return Err(RatesError::TooFrequent { next_allowed });
            }
        }

        let quotes = self.api.fetch_rates().await?;
        debug!("Received {} quotes", quotes.len());

        let mut rates = Vec::with_capacity(quotes.len());
        for (rate_code, rate) in quotes {
            match split_rate_code(&rate_code) {
                // The base is implied by the table, the feed quotes it as USDUSD
                Some(BASE_CURRENCY) => continue,
                Some(code) => rates.push(Rate::new(code, rate)),
                None => {
                    return Err(RatesError::UnexpectedData {
                        operation: "refresh_rates",
                        key: rate_code,
                    });
                }
            }
        }

        let count = rates.len();
        self.store.replace_all(rates).await?;
        self.store.set_last_update(started_at).await?;
        info!(count, %started_at, "Stored refreshed rates");
        Ok(())
    }
}
