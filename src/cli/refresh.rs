use super::ui;
use crate::core::retry::with_retry;
use crate::core::{ExchangeRateApi, RateCache, RateStore};
use anyhow::Result;
use tracing::info;

const RETRY_DELAY_MS: u64 = 1000;

/// Forces a refresh attempt. The cooldown is reported as "up to date", not as a failure.
pub async fn run<A: ExchangeRateApi, S: RateStore>(
    rates: &RateCache<A, S>,
    retries: usize,
) -> Result<()> {
    let spinner = ui::new_spinner("Refreshing exchange rates...");
    let result = with_retry(|| rates.refresh_rates(), retries, RETRY_DELAY_MS).await;
    spinner.finish_and_clear();

    match result {
        Ok(()) => {
            let count = rates.list_currency_codes()?.len();
            info!(count, "Refresh completed");
            println!(
                "{} {count} currencies",
                ui::style_text("Updated", ui::StyleType::Highlight)
            );
        }
        Err(e) if e.is_no_updates() => {
            println!(
                "{} {}",
                ui::style_text("Up to date.", ui::StyleType::Highlight),
                ui::style_text(&e.to_string(), ui::StyleType::Subtle)
            );
        }
        Err(e) => {
            eprintln!(
                "{}",
                ui::style_text("Failed to refresh exchange rates", ui::StyleType::Error)
            );
            return Err(e.into());
        }
    }

    println!("{}", ui::last_update_line(rates.last_update()?));
    Ok(())
}
