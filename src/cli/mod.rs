//! Command line front end. Reads from the rate cache and renders tables.

pub mod convert;
pub mod currencies;
pub mod refresh;
pub mod setup;
pub mod ui;

use crate::core::{ExchangeRateApi, RateCache, RateStore};
use tracing::{debug, info, warn};

/// Attempts a refresh before rendering. Failures are logged and the stored
/// rates are used as they are. Returns true when new rates were stored.
pub async fn refresh_quietly<A: ExchangeRateApi, S: RateStore>(rates: &RateCache<A, S>) -> bool {
    let spinner = ui::new_spinner("Refreshing exchange rates...");
    let result = rates.refresh_rates().await;
    spinner.finish_and_clear();

    match result {
        Ok(()) => {
            info!("Exchange rates refreshed");
            true
        }
        Err(e) if e.is_no_updates() => {
            debug!(error = %e, "Stored exchange rates are recent");
            false
        }
        Err(e) => {
            warn!(error = %e, kind = ?e.kind(), "Failed to refresh exchange rates, using stored rates");
            false
        }
    }
}
