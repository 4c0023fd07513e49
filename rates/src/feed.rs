//! Price feed trait and implementations.

use async_trait::async_trait;
use kursbot_common::{CurrencyCatalog, CurrencyCode, SourceKind};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::client::SourceClient;
use crate::error::FetchError;
use crate::snapshot::PriceSnapshot;

/// A source of price snapshots.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Feed name for logging.
    fn name(&self) -> &str;

    /// Fetch a complete snapshot for one source kind.
    async fn fetch(&self, kind: SourceKind) -> Result<PriceSnapshot, FetchError>;
}

/// Configuration for the HTTP price feed.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Base URL of the crypto price source.
    pub crypto_base: String,
    /// Base URL of the fiat exchange-rate source.
    pub fiat_base: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            crypto_base: "https://api.coingecko.com/api/v3".to_string(),
            fiat_base: "https://api.frankfurter.app".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl FeedConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(base) = std::env::var("KURSBOT_CRYPTO_API") {
            config.crypto_base = base;
        }

        if let Ok(base) = std::env::var("KURSBOT_FIAT_API") {
            config.fiat_base = base;
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.crypto_base.is_empty() {
            return Err("Crypto API base URL cannot be empty".to_string());
        }

        if self.fiat_base.is_empty() {
            return Err("Fiat API base URL cannot be empty".to_string());
        }

        if self.timeout.is_zero() {
            return Err("Fetch timeout cannot be zero".to_string());
        }

        Ok(())
    }
}

/// One crypto price entry as quoted by the source.
#[derive(Debug, Deserialize)]
struct CryptoPrice {
    usd: Option<f64>,
}

/// Fiat rates response shape.
#[derive(Debug, Deserialize)]
struct FiatRates {
    rates: HashMap<String, f64>,
}

/// Live feed over the CoinGecko-shaped crypto source and the
/// Frankfurter-shaped fiat source.
pub struct HttpPriceFeed {
    client: SourceClient,
    catalog: CurrencyCatalog,
    config: FeedConfig,
}

impl HttpPriceFeed {
    /// Create a feed with the given configuration.
    pub fn new(config: FeedConfig) -> Result<Self, FetchError> {
        let client = SourceClient::with_timeout(config.timeout)?;
        Ok(Self {
            client,
            catalog: CurrencyCatalog::new(),
            config,
        })
    }

    async fn fetch_crypto(&self) -> Result<PriceSnapshot, FetchError> {
        let ids = self.catalog.source_keys(SourceKind::Crypto).join(",");
        let url = format!(
            "{}/simple/price?ids={}&vs_currencies=usd",
            self.config.crypto_base, ids
        );

        let data: HashMap<String, CryptoPrice> = self.client.fetch_json(&url).await?;
        let prices = map_crypto_prices(&self.catalog, &data);

        Ok(PriceSnapshot::new(SourceKind::Crypto, prices))
    }

    async fn fetch_fiat(&self) -> Result<PriceSnapshot, FetchError> {
        let url = format!("{}/latest?from=USD", self.config.fiat_base);

        let data: FiatRates = self.client.fetch_json(&url).await?;
        let prices = map_fiat_rates(&self.catalog, &data);

        Ok(PriceSnapshot::new(SourceKind::Fiat, prices))
    }
}

#[async_trait]
impl PriceFeed for HttpPriceFeed {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, kind: SourceKind) -> Result<PriceSnapshot, FetchError> {
        match kind {
            SourceKind::Crypto => self.fetch_crypto().await,
            SourceKind::Fiat => self.fetch_fiat().await,
        }
    }
}

/// Map a crypto response onto catalog codes. Slugs the catalog does not
/// know and entries without a USD quote are dropped.
fn map_crypto_prices(
    catalog: &CurrencyCatalog,
    data: &HashMap<String, CryptoPrice>,
) -> HashMap<CurrencyCode, f64> {
    let mut prices = HashMap::new();

    for descriptor in catalog.descriptors(SourceKind::Crypto) {
        if let Some(price) = data.get(&descriptor.source_key).and_then(|p| p.usd) {
            prices.insert(descriptor.code.clone(), price);
        }
    }

    prices
}

/// Map a fiat response onto catalog codes. The source quotes against USD
/// and omits USD itself, so USD is inserted at 1.0.
fn map_fiat_rates(catalog: &CurrencyCatalog, data: &FiatRates) -> HashMap<CurrencyCode, f64> {
    let mut prices = HashMap::new();

    for descriptor in catalog.descriptors(SourceKind::Fiat) {
        if let Some(&rate) = data.rates.get(&descriptor.source_key) {
            prices.insert(descriptor.code.clone(), rate);
        }
    }

    prices.insert(CurrencyCode::usd(), 1.0);
    prices
}

/// Mock feed for testing. Serves whatever prices were set, fails sources
/// marked down, and counts every fetch attempt.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockPriceFeed {
    prices: dashmap::DashMap<SourceKind, HashMap<CurrencyCode, f64>>,
    down: dashmap::DashMap<SourceKind, ()>,
    fetch_counts: dashmap::DashMap<SourceKind, usize>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockPriceFeed {
    /// Create an empty mock feed.
    pub fn new() -> Self {
        Self {
            prices: dashmap::DashMap::new(),
            down: dashmap::DashMap::new(),
            fetch_counts: dashmap::DashMap::new(),
        }
    }

    /// Quote a price in the feed's native orientation.
    pub fn set_price(&self, kind: SourceKind, code: &str, price: f64) {
        self.prices
            .entry(kind)
            .or_default()
            .insert(CurrencyCode::new(code), price);
    }

    /// Make one source fail every fetch.
    pub fn set_down(&self, kind: SourceKind) {
        self.down.insert(kind, ());
    }

    /// Bring a downed source back.
    pub fn set_up(&self, kind: SourceKind) {
        self.down.remove(&kind);
    }

    /// Number of fetch attempts served for a source.
    pub fn fetch_count(&self, kind: SourceKind) -> usize {
        self.fetch_counts.get(&kind).map(|c| *c).unwrap_or(0)
    }

    /// Total fetch attempts across both sources.
    pub fn total_fetches(&self) -> usize {
        self.fetch_counts.iter().map(|e| *e.value()).sum()
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Default for MockPriceFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl PriceFeed for MockPriceFeed {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, kind: SourceKind) -> Result<PriceSnapshot, FetchError> {
        *self.fetch_counts.entry(kind).or_insert(0) += 1;

        if self.down.contains_key(&kind) {
            return Err(FetchError::Status(503));
        }

        let prices = self
            .prices
            .get(&kind)
            .map(|p| p.value().clone())
            .unwrap_or_default();

        Ok(PriceSnapshot::new(kind, prices))
    }
}
