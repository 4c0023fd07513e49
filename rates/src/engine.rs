//! Conversion engine orchestration.

use std::sync::Arc;

use kursbot_common::{CurrencyCatalog, CurrencyCode, CurrencyDescriptor, SourceKind};
use tracing::{debug, error, info, instrument};

use crate::cache::{CacheStats, RateCache, RateCacheConfig};
use crate::conversion::ConversionResult;
use crate::error::{ConvertError, ConvertResult, FetchError};
use crate::feed::{FeedConfig, HttpPriceFeed, PriceFeed};
use crate::snapshot::PriceSnapshot;

/// Configuration for the conversion engine.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// HTTP feed configuration.
    pub feed: FeedConfig,
    /// Snapshot cache configuration.
    pub cache: RateCacheConfig,
}

impl EngineConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            feed: FeedConfig::from_env(),
            cache: RateCacheConfig::default(),
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.feed.validate()
    }
}

/// The conversion engine: catalog validation, snapshot caching, and
/// USD-pivot cross-rate computation.
///
/// Resolution is lazy per code. A conversion touching only one source
/// kind fetches only that source, and USD resolves to a constant 1.0
/// without consulting any snapshot at all.
pub struct ConversionEngine {
    feed: Arc<dyn PriceFeed>,
    catalog: CurrencyCatalog,
    cache: RateCache,
}

impl ConversionEngine {
    /// Create an engine over the given feed.
    pub fn new(feed: Arc<dyn PriceFeed>, config: EngineConfig) -> Self {
        Self {
            feed,
            catalog: CurrencyCatalog::new(),
            cache: RateCache::with_config(config.cache),
        }
    }

    /// Create an engine backed by the live HTTP feeds.
    pub fn with_http_feed(config: EngineConfig) -> Result<Self, FetchError> {
        let feed = HttpPriceFeed::new(config.feed.clone())?;
        Ok(Self::new(Arc::new(feed), config))
    }

    /// Convert an amount between two supported currencies.
    ///
    /// The amount is taken as-is; input validation is the caller's concern.
    #[instrument(skip(self))]
    pub async fn convert(
        &self,
        amount: f64,
        from: &str,
        to: &str,
    ) -> ConvertResult<ConversionResult> {
        let from_code = CurrencyCode::new(from);
        let to_code = CurrencyCode::new(to);

        let from_unit_usd = self.resolve_unit_usd(&from_code).await?;
        let to_unit_usd = self.resolve_unit_usd(&to_code).await?;

        let result = ConversionResult::from_unit_prices(
            amount,
            from_code,
            to_code,
            from_unit_usd,
            to_unit_usd,
        );

        info!(
            from = %result.from_code,
            to = %result.to_code,
            rate = result.rate,
            "Conversion completed"
        );

        Ok(result)
    }

    /// Current snapshot for one source, from cache or freshly fetched.
    ///
    /// A fresh snapshot replaces the cached one wholesale; a failed fetch
    /// caches nothing.
    pub async fn snapshot(&self, kind: SourceKind) -> Result<PriceSnapshot, FetchError> {
        if let Some(cached) = self.cache.get(kind) {
            return Ok(cached);
        }

        let snapshot = match self.feed.fetch(kind).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!(source = %kind, feed = self.feed.name(), error = %e, "Feed fetch failed");
                return Err(e);
            }
        };

        debug!(source = %kind, prices = snapshot.len(), "Snapshot refreshed");
        self.cache.insert(snapshot.clone());

        Ok(snapshot)
    }

    /// All supported codes for one source, in catalog order.
    pub fn supported_codes(&self, kind: SourceKind) -> Vec<CurrencyCode> {
        self.catalog.codes(kind)
    }

    /// Descriptor for a code, if supported.
    pub fn describe(&self, code: &CurrencyCode) -> Option<&CurrencyDescriptor> {
        self.catalog.describe(code)
    }

    /// Cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// USD price of one unit of the given code.
    ///
    /// USD itself is the pivot and resolves to 1.0 without touching any
    /// snapshot. Crypto codes read the snapshot price directly; other fiat
    /// codes invert the quoted units-per-USD rate.
    async fn resolve_unit_usd(&self, code: &CurrencyCode) -> ConvertResult<f64> {
        let descriptor = self
            .catalog
            .describe(code)
            .ok_or_else(|| ConvertError::UnsupportedCurrency(code.clone()))?;

        if descriptor.code.is_usd() {
            return Ok(1.0);
        }

        let kind = descriptor.source_kind;
        let snapshot = self
            .snapshot(kind)
            .await
            .map_err(|cause| ConvertError::RateUnavailable {
                code: code.clone(),
                cause: Some(cause),
            })?;

        let quoted = snapshot
            .price(code)
            .ok_or_else(|| ConvertError::RateUnavailable {
                code: code.clone(),
                cause: None,
            })?;

        let unit_usd = match kind {
            SourceKind::Crypto => quoted,
            SourceKind::Fiat => 1.0 / quoted,
        };

        Ok(unit_usd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::MockPriceFeed;
    use chrono::Duration;

    const EPS: f64 = 1e-9;

    fn setup_feed() -> Arc<MockPriceFeed> {
        let feed = Arc::new(MockPriceFeed::new());
        feed.set_price(SourceKind::Crypto, "BTC", 65000.0);
        feed.set_price(SourceKind::Crypto, "ETH", 3200.0);
        feed.set_price(SourceKind::Fiat, "EUR", 0.92);
        feed.set_price(SourceKind::Fiat, "RUB", 90.0);
        feed.set_price(SourceKind::Fiat, "USD", 1.0);
        feed
    }

    fn setup_engine(feed: Arc<MockPriceFeed>) -> ConversionEngine {
        ConversionEngine::new(feed, EngineConfig::default())
    }

    #[tokio::test]
    async fn test_identity_conversion() {
        let engine = setup_engine(setup_feed());

        let result = engine.convert(42.0, "BTC", "BTC").await.unwrap();

        assert!((result.rate - 1.0).abs() < EPS);
        assert!((result.result_amount - 42.0).abs() < EPS);
    }

    #[tokio::test]
    async fn test_reciprocal_rates() {
        let engine = setup_engine(setup_feed());

        let forward = engine.convert(1.0, "BTC", "EUR").await.unwrap();
        let back = engine.convert(1.0, "EUR", "BTC").await.unwrap();

        assert!((forward.rate * back.rate - 1.0).abs() < EPS);
    }

    #[tokio::test]
    async fn test_usd_to_usd_never_fetches() {
        let feed = Arc::new(MockPriceFeed::new());
        feed.set_down(SourceKind::Crypto);
        feed.set_down(SourceKind::Fiat);
        let engine = setup_engine(feed.clone());

        // Succeeds with empty caches and both sources down
        let result = engine.convert(5.0, "USD", "USD").await.unwrap();

        assert!((result.rate - 1.0).abs() < EPS);
        assert!((result.result_amount - 5.0).abs() < EPS);
        assert_eq!(feed.total_fetches(), 0);
    }

    #[tokio::test]
    async fn test_snapshot_cached_within_ttl() {
        let feed = setup_feed();
        let engine = setup_engine(feed.clone());

        engine.convert(1.0, "BTC", "USD").await.unwrap();
        engine.convert(1.0, "ETH", "USD").await.unwrap();

        // Both conversions resolved off one crypto fetch; USD cost nothing
        assert_eq!(feed.fetch_count(SourceKind::Crypto), 1);
        assert_eq!(feed.fetch_count(SourceKind::Fiat), 0);
    }

    #[tokio::test]
    async fn test_snapshot_refetched_after_expiry() {
        let feed = setup_feed();
        let config = EngineConfig {
            cache: RateCacheConfig {
                ttl: Duration::milliseconds(50),
                ..Default::default()
            },
            ..Default::default()
        };
        let engine = ConversionEngine::new(feed.clone(), config);

        engine.convert(1.0, "BTC", "USD").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(60)).await;
        engine.convert(1.0, "BTC", "USD").await.unwrap();

        assert_eq!(feed.fetch_count(SourceKind::Crypto), 2);
    }

    #[tokio::test]
    async fn test_unsupported_currency() {
        let feed = setup_feed();
        let engine = setup_engine(feed.clone());

        let result = engine.convert(10.0, "XYZ", "USD").await;

        assert!(matches!(result, Err(ConvertError::UnsupportedCurrency(_))));
        // Rejected before any upstream call
        assert_eq!(feed.total_fetches(), 0);
    }

    #[tokio::test]
    async fn test_source_down_is_rate_unavailable() {
        let feed = setup_feed();
        let engine = setup_engine(feed.clone());

        // Warm the fiat cache, then take the crypto source down
        engine.convert(1.0, "EUR", "USD").await.unwrap();
        feed.set_down(SourceKind::Crypto);

        let result = engine.convert(1.0, "BTC", "USD").await;
        assert!(matches!(
            result,
            Err(ConvertError::RateUnavailable { cause: Some(_), .. })
        ));

        // Fiat-backed conversions keep working off the fresh cache
        let eur = engine.convert(100.0, "EUR", "USD").await.unwrap();
        assert!((eur.rate - 1.0 / 0.92).abs() < EPS);
        assert_eq!(feed.fetch_count(SourceKind::Fiat), 1);
    }

    #[tokio::test]
    async fn test_missing_code_in_fresh_snapshot() {
        let feed = Arc::new(MockPriceFeed::new());
        // The fiat source answers but quotes no GEL
        feed.set_price(SourceKind::Fiat, "EUR", 0.92);
        let engine = setup_engine(feed);

        let result = engine.convert(1.0, "GEL", "USD").await;

        assert!(matches!(
            result,
            Err(ConvertError::RateUnavailable { cause: None, .. })
        ));
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let feed = setup_feed();
        let engine = setup_engine(feed.clone());

        feed.set_down(SourceKind::Crypto);
        assert!(engine.convert(1.0, "BTC", "USD").await.is_err());

        feed.set_up(SourceKind::Crypto);
        let result = engine.convert(1.0, "BTC", "USD").await.unwrap();

        assert!((result.rate - 65000.0).abs() < EPS);
        assert_eq!(feed.fetch_count(SourceKind::Crypto), 2);
    }

    #[tokio::test]
    async fn test_crypto_to_fiat_cross_rate() {
        let engine = setup_engine(setup_feed());

        let result = engine.convert(2.0, "BTC", "EUR").await.unwrap();

        assert!((result.rate - 59_800.0).abs() < EPS);
        assert!((result.result_amount - 119_600.0).abs() < EPS);
        assert!((result.from_unit_usd - 65_000.0).abs() < EPS);
        assert!((result.to_unit_usd - 1.0 / 0.92).abs() < EPS);
    }

    #[tokio::test]
    async fn test_lowercase_codes_accepted() {
        let engine = setup_engine(setup_feed());

        let result = engine.convert(1.0, "btc", "eur").await.unwrap();

        assert_eq!(result.from_code.as_str(), "BTC");
        assert_eq!(result.to_code.as_str(), "EUR");
    }

    #[tokio::test]
    async fn test_snapshot_accessor_uses_cache() {
        let feed = setup_feed();
        let engine = setup_engine(feed.clone());

        let first = engine.snapshot(SourceKind::Fiat).await.unwrap();
        let second = engine.snapshot(SourceKind::Fiat).await.unwrap();

        assert_eq!(first.fetched_at, second.fetched_at);
        assert_eq!(feed.fetch_count(SourceKind::Fiat), 1);
    }

    #[tokio::test]
    async fn test_supported_codes_and_describe() {
        let engine = setup_engine(setup_feed());

        assert_eq!(engine.supported_codes(SourceKind::Fiat).len(), 12);
        assert_eq!(engine.supported_codes(SourceKind::Crypto).len(), 12);
        assert!(engine.describe(&CurrencyCode::new("TON")).is_some());
        assert!(engine.describe(&CurrencyCode::new("XYZ")).is_none());
    }
}
