//! Kursbot Rates Engine
//!
//! Rate resolution and conversion between fiat currencies and crypto
//! assets. Prices come from two upstream feeds (crypto quoted in USD,
//! fiat quoted against USD), pass through a short-lived snapshot cache,
//! and every cross-rate is computed through the USD pivot.
//!
//! # Example
//!
//! ```rust,ignore
//! use kursbot_rates::{ConversionEngine, EngineConfig};
//!
//! let engine = ConversionEngine::with_http_feed(EngineConfig::default())?;
//!
//! let result = engine.convert(2.0, "BTC", "EUR").await?;
//! println!("1 BTC = {} EUR", result.rate);
//! ```

pub mod cache;
pub mod client;
pub mod conversion;
pub mod engine;
pub mod error;
pub mod feed;
pub mod snapshot;

pub use cache::{RateCache, RateCacheConfig};
pub use conversion::ConversionResult;
pub use engine::{ConversionEngine, EngineConfig};
pub use error::{ConvertError, ConvertResult, FetchError};
pub use feed::{FeedConfig, HttpPriceFeed, PriceFeed};
pub use snapshot::PriceSnapshot;

#[cfg(any(test, feature = "test-utils"))]
pub use feed::MockPriceFeed;
