pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::RateCache;
use crate::core::config::AppConfig;
use crate::providers::CurrencyLayerProvider;
use crate::store::DiskRateStore;
use anyhow::{Context, Result};
use tracing::{debug, info};

pub enum AppCommand {
    Currencies,
    Convert { amount: f64, from: Option<String> },
    Refresh { retries: usize },
}

/// Builds the rate cache from the configuration and runs `command` against it.
pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxcache starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!(
        base_url = %config.provider.base_url,
        currency = %config.currency,
        cooldown_minutes = config.refresh_cooldown_minutes,
        "Loaded config"
    );

    let data_path = config.default_data_path()?.join("rates");
    let store = DiskRateStore::open(&data_path)
        .with_context(|| format!("Failed to open rate store at {}", data_path.display()))?;
    let api = CurrencyLayerProvider::with_timeout(
        &config.provider.base_url,
        &config.provider.access_key,
        config.provider.timeout(),
    )?;
    let rates = RateCache::with_cooldown(api, store, config.refresh_cooldown()?);

    match command {
        AppCommand::Currencies => cli::currencies::run(&rates).await,
        AppCommand::Convert { amount, from } => {
            let source = from.unwrap_or_else(|| config.currency.clone());
            cli::convert::run(&rates, amount, &source).await
        }
        AppCommand::Refresh { retries } => cli::refresh::run(&rates, retries).await,
    }
}
