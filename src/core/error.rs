//! Error taxonomy shared by the rate cache, its stores and the API client.

use chrono::{DateTime, Utc};
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Coarse classification callers use to decide how to react to a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unrecoverable, e.g. the store could not be opened. Do not retry.
    Fatal,
    /// Transient failure, the whole refresh may be retried later.
    NonFatal,
    /// Nothing was done because the cooldown is still running.
    NoUpdates,
    /// The requested source currency is not in the rate table.
    UnknownCurrencyCode,
    /// The server answered with a payload we could not use.
    BadResponse,
    /// The server payload parsed but failed validation.
    UnexpectedData,
}

#[derive(Error, Debug)]
pub enum RatesError {
    #[error("{operation}: fatal error")]
    Fatal {
        operation: &'static str,
        #[source]
        cause: Option<BoxError>,
    },

    #[error("{operation}: request failed{}", status_suffix(.status))]
    RequestFailed {
        operation: &'static str,
        status: Option<u16>,
        #[source]
        cause: Option<BoxError>,
    },

    #[error("{operation}: bad response: {body}")]
    BadResponse {
        operation: &'static str,
        body: serde_json::Value,
    },

    #[error("Too frequent: next refresh allowed after {next_allowed}")]
    TooFrequent { next_allowed: DateTime<Utc> },

    #[error("Unknown currency code: {code}")]
    UnknownCurrencyCode { code: String },

    #[error("{operation}: unexpected data for key {key:?}")]
    UnexpectedData { operation: &'static str, key: String },

    #[error("{operation}: store error: {cause}")]
    Store {
        operation: &'static str,
        #[source]
        cause: BoxError,
    },

    #[error("Invalid rate {rate} for currency code {code:?}")]
    InvalidRate { code: String, rate: f64 },
}

impl RatesError {
    pub fn fatal(operation: &'static str, cause: impl Into<BoxError>) -> Self {
        RatesError::Fatal {
            operation,
            cause: Some(cause.into()),
        }
    }

    pub fn store(operation: &'static str, cause: impl Into<BoxError>) -> Self {
        RatesError::Store {
            operation,
            cause: cause.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RatesError::Fatal { .. } => ErrorKind::Fatal,
            RatesError::RequestFailed { .. }
            | RatesError::Store { .. }
            | RatesError::InvalidRate { .. } => ErrorKind::NonFatal,
            RatesError::BadResponse { .. } => ErrorKind::BadResponse,
            RatesError::TooFrequent { .. } => ErrorKind::NoUpdates,
            RatesError::UnknownCurrencyCode { .. } => ErrorKind::UnknownCurrencyCode,
            RatesError::UnexpectedData { .. } => ErrorKind::UnexpectedData,
        }
    }

    /// True when retrying the whole refresh later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::NonFatal | ErrorKind::BadResponse | ErrorKind::UnexpectedData
        )
    }

    pub fn is_no_updates(&self) -> bool {
        self.kind() == ErrorKind::NoUpdates
    }
}

pub type Result<T> = std::result::Result<T, RatesError>;

fn status_suffix(status: &Option<u16>) -> String {
    status
        .map(|s| format!(" with HTTP status {s}"))
        .unwrap_or_default()
}
