use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error, instrument};

use crate::core::api::ExchangeRateApi;
use crate::core::error::{RatesError, Result};

pub const DEFAULT_BASE_URL: &str = "http://api.currencylayer.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const OPERATION: &str = "fetch_rates";

/// Client for the currencylayer `live` endpoint, which quotes every currency
/// against USD.
pub struct CurrencyLayerProvider {
    base_url: String,
    access_key: String,
    client: reqwest::Client,
}

impl CurrencyLayerProvider {
    pub fn new(base_url: &str, access_key: &str) -> Result<Self> {
        Self::with_timeout(base_url, access_key, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, access_key: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("fxcache/1.0")
            .timeout(timeout)
            .build()
            .map_err(|e| RatesError::fatal("build HTTP client", e))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_key: access_key.to_string(),
            client,
        })
    }

    fn live_url(&self) -> Result<reqwest::Url> {
        let endpoint = format!("{}/live", self.base_url);
        reqwest::Url::parse_with_params(&endpoint, &[("access_key", self.access_key.as_str())])
            .map_err(|e| RatesError::fatal("build live rates URL", e))
    }
}

fn bad_response(body: Value) -> RatesError {
    RatesError::BadResponse {
        operation: OPERATION,
        body,
    }
}

/// Extracts the `quotes` mapping from a `live` response envelope.
fn parse_quotes(body: Value) -> Result<HashMap<String, f64>> {
    if !body.get("success").and_then(Value::as_bool).unwrap_or(false) {
        return Err(bad_response(body));
    }

    let quotes: Option<HashMap<String, f64>> = body
        .get("quotes")
        .and_then(Value::as_object)
        .and_then(|quotes| {
            quotes
                .iter()
                .map(|(code, rate)| rate.as_f64().map(|rate| (code.clone(), rate)))
                .collect()
        });
    quotes.ok_or_else(|| bad_response(body))
}

#[async_trait]
impl ExchangeRateApi for CurrencyLayerProvider {
    #[instrument(name = "CurrencyLayerFetch", skip(self), fields(base_url = %self.base_url))]
    async fn fetch_rates(&self) -> Result<HashMap<String, f64>> {
        let url = self.live_url()?;
        debug!("Requesting live rates");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RatesError::RequestFailed {
                operation: OPERATION,
                status: None,
                cause: Some(e.into()),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RatesError::RequestFailed {
                operation: OPERATION,
                status: Some(status.as_u16()),
                cause: None,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| RatesError::RequestFailed {
                operation: OPERATION,
                status: Some(status.as_u16()),
                cause: Some(e.into()),
            })?;

        let body: Value = match serde_json::from_str(&text) {
            Ok(body) => body,
            Err(e) => {
                error!(error = ?e, response = %text, "Failed to parse live rates response");
                return Err(bad_response(Value::String(text)));
            }
        };

        parse_quotes(body)
    }
}
