//! Core business logic abstractions

pub mod cache;
pub mod clock;
pub mod config;
pub mod currency;
pub mod error;
pub mod log;

// Re-export main types for cleaner imports
pub use cache::Cache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use currency::{ConversionResult, CurrencyCode, RateProvider, RateTable};
pub use error::ConversionError;
