//! Core rate cache logic and the abstractions it depends on

pub mod api;
pub mod config;
pub mod error;
pub mod log;
pub mod rate;
pub mod rates;
pub mod retry;
pub mod store;

// Re-export main types for cleaner imports
pub use api::ExchangeRateApi;
pub use error::{ErrorKind, RatesError};
pub use rate::{BASE_CURRENCY, Rate};
pub use rates::{Conversion, RateCache};
pub use store::RateStore;
