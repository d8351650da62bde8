pub mod currency_layer;

pub use currency_layer::CurrencyLayerProvider;
