//! Persistence abstractions for the rate cache

use crate::core::error::Result;
use crate::core::rate::Rate;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Durable storage of USD-anchored rates and the last refresh time.
///
/// Implementations must make `replace_all` atomic: readers observe either the
/// old rows or the new rows, never a mix.
#[async_trait]
pub trait RateStore: Send + Sync {
    /// Returns every stored rate, in no particular order.
    fn list_all(&self) -> Result<Vec<Rate>>;

    /// Deletes every stored rate and inserts `rates` in a single transaction.
    /// If any row fails [`Rate::validate`] nothing is written.
    async fn replace_all(&self, rates: Vec<Rate>) -> Result<()>;

    fn last_update(&self) -> Result<Option<DateTime<Utc>>>;

    /// Records the time of the last successful refresh. Durable once it returns.
    async fn set_last_update(&self, at: DateTime<Utc>) -> Result<()>;
}
