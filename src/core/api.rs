//! Exchange rate API abstractions

use crate::core::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

#[async_trait]
pub trait ExchangeRateApi: Send + Sync {
    /// Fetches the live quotes, keyed by six character rate codes like `USDJPY`.
    ///
    /// Exactly one request per call; retry policy belongs to the caller.
    async fn fetch_rates(&self) -> Result<HashMap<String, f64>>;
}
