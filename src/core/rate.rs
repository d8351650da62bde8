//! Exchange rate types and the pure table arithmetic built on them

use crate::core::error::{RatesError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Every stored rate is expressed as units of a currency per one unit of this base.
pub const BASE_CURRENCY: &str = "USD";

/// A USD-anchored rate: 1 USD = `rate` units of `code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rate {
    pub code: String,
    pub rate: f64,
}

impl Rate {
    pub fn new(code: impl Into<String>, rate: f64) -> Self {
        Self {
            code: code.into(),
            rate,
        }
    }

    /// Checks the row can be stored: a 3-letter code other than the base and a
    /// positive finite rate.
    pub fn validate(&self) -> Result<()> {
        let code_ok = self.code.len() == 3
            && self.code.chars().all(|c| c.is_ascii_uppercase())
            && self.code != BASE_CURRENCY;
        if !code_ok || !self.rate.is_finite() || self.rate <= 0.0 {
            return Err(RatesError::InvalidRate {
                code: self.code.clone(),
                rate: self.rate,
            });
        }
        Ok(())
    }
}

/// Returns the target currency of a six character rate code such as `USDJPY`,
/// or `None` when the code is not quoted against the base currency.
pub fn split_rate_code(rate_code: &str) -> Option<&str> {
    if rate_code.chars().count() != 6 {
        return None;
    }
    rate_code.strip_prefix(BASE_CURRENCY)
}

/// Builds the USD-anchored table. The base currency is always present.
pub fn rate_table(rates: &[Rate]) -> HashMap<String, f64> {
    let mut table = HashMap::with_capacity(rates.len() + 1);
    table.insert(BASE_CURRENCY.to_string(), 1.0);
    for rate in rates {
        table.insert(rate.code.clone(), rate.rate);
    }
    table
}

/// Re-expresses a USD-anchored table relative to `source`.
pub fn pivot(table: &HashMap<String, f64>, source: &str) -> Result<HashMap<String, f64>> {
    let usd_to_source = table
        .get(source)
        .copied()
        .ok_or_else(|| RatesError::UnknownCurrencyCode {
            code: source.to_string(),
        })?;
    let source_to_usd = 1.0 / usd_to_source;

    let mut normalized: HashMap<String, f64> = table
        .iter()
        .map(|(code, rate)| (code.clone(), source_to_usd * rate))
        .collect();
    // x * (1/x) is not always exactly 1.0 in floating point
    normalized.insert(source.to_string(), 1.0);
    Ok(normalized)
}
