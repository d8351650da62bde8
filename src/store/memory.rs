use crate::core::error::{RatesError, Result};
use crate::core::rate::Rate;
use crate::core::store::RateStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

#[derive(Default)]
struct State {
    rates: HashMap<String, f64>,
    last_update: Option<DateTime<Utc>>,
}

/// In-memory rate store. Replacing the rows swaps the whole map under one
/// write lock, so readers never see a partial refresh.
pub struct MemoryRateStore {
    inner: RwLock<State>,
}

impl MemoryRateStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(State::default()),
        }
    }

    /// Creates a store pre-populated with `rates`. Rows are validated the same
    /// way [`RateStore::replace_all`] validates them.
    pub fn with_rates(rates: Vec<Rate>) -> Result<Self> {
        for rate in &rates {
            rate.validate()?;
        }
        let state = State {
            rates: rates.into_iter().map(|r| (r.code, r.rate)).collect(),
            last_update: None,
        };
        Ok(Self {
            inner: RwLock::new(state),
        })
    }

    fn read(&self, operation: &'static str) -> Result<RwLockReadGuard<'_, State>> {
        self.inner
            .read()
            .map_err(|_| RatesError::store(operation, "rate store lock poisoned"))
    }

    fn write(&self, operation: &'static str) -> Result<RwLockWriteGuard<'_, State>> {
        self.inner
            .write()
            .map_err(|_| RatesError::store(operation, "rate store lock poisoned"))
    }
}

impl Default for MemoryRateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateStore for MemoryRateStore {
    fn list_all(&self) -> Result<Vec<Rate>> {
        let state = self.read("list_all")?;
        Ok(state
            .rates
            .iter()
            .map(|(code, rate)| Rate::new(code.clone(), *rate))
            .collect())
    }

    async fn replace_all(&self, rates: Vec<Rate>) -> Result<()> {
        for rate in &rates {
            rate.validate()?;
        }
        let new_rates: HashMap<String, f64> =
            rates.into_iter().map(|r| (r.code, r.rate)).collect();

        let mut state = self.write("replace_all")?;
        debug!("Replacing {} rates with {}", state.rates.len(), new_rates.len());
        state.rates = new_rates;
        Ok(())
    }

    fn last_update(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.read("last_update")?.last_update)
    }

    async fn set_last_update(&self, at: DateTime<Utc>) -> Result<()> {
        self.write("set_last_update")?.last_update = Some(at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;

    #[tokio::test]
    async fn test_memory_store_replace_all() {
        let store = MemoryRateStore::new();
        assert!(store.list_all().unwrap().is_empty());

        store
            .replace_all(vec![Rate::new("JPY", 110.0), Rate::new("EUR", 0.9)])
            .await
            .unwrap();
        assert_eq!(store.list_all().unwrap().len(), 2);

        store
            .replace_all(vec![Rate::new("GBP", 0.75)])
            .await
            .unwrap();
        assert_eq!(store.list_all().unwrap(), vec![Rate::new("GBP", 0.75)]);
    }

    #[tokio::test]
    async fn test_memory_store_invalid_row_aborts() {
        let store = MemoryRateStore::with_rates(vec![Rate::new("GBP", 0.75)]).unwrap();

        let result = store
            .replace_all(vec![Rate::new("JPY", 110.0), Rate::new("EUR", 0.0)])
            .await;

        assert!(result.is_err());
        assert_eq!(store.list_all().unwrap(), vec![Rate::new("GBP", 0.75)]);
    }

    #[tokio::test]
    async fn test_memory_store_last_update() {
        let store = MemoryRateStore::new();
        assert!(store.last_update().unwrap().is_none());

        let now = Utc::now();
        store.set_last_update(now).await.unwrap();
        assert_eq!(store.last_update().unwrap(), Some(now));
    }

    #[test]
    fn test_memory_store_seed_rows_validated() {
        let err = MemoryRateStore::with_rates(vec![Rate::new("JPY", 110.0), Rate::new("USD", 1.0)])
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::NonFatal);

        assert!(MemoryRateStore::with_rates(vec![Rate::new("EUR", -0.9)]).is_err());
        assert!(MemoryRateStore::with_rates(vec![Rate::new("EUR", 0.9)]).is_ok());
    }
}
