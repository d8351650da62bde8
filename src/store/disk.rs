use crate::core::error::{RatesError, Result};
use crate::core::rate::Rate;
use crate::core::store::RateStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::debug;

const RATES_PARTITION: &str = "rates";
const META_PARTITION: &str = "meta";
const LAST_UPDATE_KEY: &str = "last_update_rates";

/// Rate store backed by a fjall keyspace.
///
/// Rates live in their own partition keyed by currency code with the rate as a
/// JSON number. The last refresh time is an RFC 3339 string in the meta partition.
pub struct DiskRateStore {
    keyspace: Keyspace,
    rates: PartitionHandle,
    meta: PartitionHandle,
}

impl DiskRateStore {
    /// Opens (or creates) the store under `path`. Failure here is fatal.
    pub fn open(path: &Path) -> Result<Self> {
        let operation = "open rate store";
        std::fs::create_dir_all(path).map_err(|e| RatesError::fatal(operation, e))?;

        let keyspace = Config::new(path)
            .open()
            .map_err(|e| RatesError::fatal(operation, e))?;
        let rates = keyspace
            .open_partition(RATES_PARTITION, PartitionCreateOptions::default())
            .map_err(|e| RatesError::fatal(operation, e))?;
        let meta = keyspace
            .open_partition(META_PARTITION, PartitionCreateOptions::default())
            .map_err(|e| RatesError::fatal(operation, e))?;
        debug!("Opened rate store at {}", path.display());

        Ok(Self {
            keyspace,
            rates,
            meta,
        })
    }

    /// Runs a write and its `SyncAll` persist on the blocking pool.
    async fn write_durably<T, F>(&self, operation: &'static str, write: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Keyspace) -> Result<T> + Send + 'static,
    {
        let keyspace = self.keyspace.clone();
        tokio::task::spawn_blocking(move || -> Result<T> {
            let written = write(&keyspace)?;
            keyspace
                .persist(PersistMode::SyncAll)
                .map_err(|e| RatesError::store(operation, e))?;
            Ok(written)
        })
        .await
        .map_err(|e| RatesError::store(operation, e))?
    }
}

#[async_trait]
impl RateStore for DiskRateStore {
    fn list_all(&self) -> Result<Vec<Rate>> {
        let operation = "list_all";
        self.rates
            .snapshot()
            .iter()
            .map(|kv| {
                let (key, value) = kv.map_err(|e| RatesError::store(operation, e))?;
                let code = std::str::from_utf8(&key)
                    .map_err(|e| RatesError::store(operation, e))?
                    .to_string();
                let rate: f64 =
                    serde_json::from_slice(&value).map_err(|e| RatesError::store(operation, e))?;
                Ok(Rate { code, rate })
            })
            .collect()
    }

    async fn replace_all(&self, rates: Vec<Rate>) -> Result<()> {
        let operation = "replace_all";
        for rate in &rates {
            rate.validate()?;
        }
        let new_rates: BTreeMap<String, f64> =
            rates.into_iter().map(|r| (r.code, r.rate)).collect();
        let partition = self.rates.clone();
        let count = new_rates.len();
        let removed = self
            .write_durably(operation, move |keyspace| {
                let keep: HashSet<&[u8]> = new_rates.keys().map(|code| code.as_bytes()).collect();
                let mut batch = keyspace.batch();
                let mut removed = 0;
                for kv in partition.snapshot().iter() {
                    let (key, _) = kv.map_err(|e| RatesError::store(operation, e))?;
                    if !keep.contains(&*key) {
                        batch.remove(&partition, key);
                        removed += 1;
                    }
                }
                for (code, rate) in &new_rates {
                    let value =
                        serde_json::to_vec(rate).map_err(|e| RatesError::store(operation, e))?;
                    batch.insert(&partition, code.as_bytes(), value);
                }
                batch
                    .commit()
                    .map_err(|e| RatesError::store(operation, e))?;
                Ok(removed)
            })
            .await?;

        debug!("Committed {} rates, removed {} stale rows", count, removed);
        Ok(())
    }

    fn last_update(&self) -> Result<Option<DateTime<Utc>>> {
        let operation = "last_update";
        let Some(value) = self
            .meta
            .get(LAST_UPDATE_KEY.as_bytes())
            .map_err(|e| RatesError::store(operation, e))?
        else {
            return Ok(None);
        };
        let text = std::str::from_utf8(&value).map_err(|e| RatesError::store(operation, e))?;
        let at = DateTime::parse_from_rfc3339(text)
            .map_err(|e| RatesError::store(operation, e))?
            .with_timezone(&Utc);
        Ok(Some(at))
    }

    async fn set_last_update(&self, at: DateTime<Utc>) -> Result<()> {
        let operation = "set_last_update";
        let meta = self.meta.clone();
        self.write_durably(operation, move |_| {
            meta.insert(LAST_UPDATE_KEY.as_bytes(), at.to_rfc3339().into_bytes())
                .map_err(|e| RatesError::store(operation, e))
        })
        .await
    }
}
