//! Price snapshots fetched from upstream sources.

use chrono::{DateTime, Utc};
use kursbot_common::{CurrencyCode, SourceKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One source's complete price map at a point in time.
///
/// Prices keep the feed's native orientation: the crypto snapshot stores
/// USD per unit of the asset, the fiat snapshot stores units of foreign
/// currency per 1 USD (with USD itself present at 1.0). The engine turns
/// both into USD unit prices at resolve time.
///
/// Snapshots are replaced wholesale on refetch, never patched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSnapshot {
    /// Which source produced this snapshot.
    pub kind: SourceKind,
    /// Quoted prices keyed by catalog code.
    pub prices: HashMap<CurrencyCode, f64>,
    /// When the snapshot was fetched.
    pub fetched_at: DateTime<Utc>,
}

impl PriceSnapshot {
    /// Create a snapshot fetched just now.
    pub fn new(kind: SourceKind, prices: HashMap<CurrencyCode, f64>) -> Self {
        Self {
            kind,
            prices,
            fetched_at: Utc::now(),
        }
    }

    /// Quoted price for a code, in the feed's native orientation.
    pub fn price(&self, code: &CurrencyCode) -> Option<f64> {
        self.prices.get(code).copied()
    }

    /// Number of quoted codes.
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Whether the snapshot carries no prices.
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_lookup() {
        let mut prices = HashMap::new();
        prices.insert(CurrencyCode::new("BTC"), 65000.0);
        let snapshot = PriceSnapshot::new(SourceKind::Crypto, prices);

        assert_eq!(snapshot.price(&CurrencyCode::new("BTC")), Some(65000.0));
        assert_eq!(snapshot.price(&CurrencyCode::new("ETH")), None);
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = PriceSnapshot::new(SourceKind::Fiat, HashMap::new());
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.price(&CurrencyCode::usd()), None);
    }
}
