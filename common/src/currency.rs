//! Currency identifiers and descriptors for the kursbot engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Short uppercase currency identifier ("BTC", "USD").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Create a new code, normalizing to uppercase.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    /// Get the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The US dollar, the pivot every price is normalized through.
    pub fn usd() -> Self {
        Self::new("USD")
    }

    /// Check whether this is the USD pivot.
    pub fn is_usd(&self) -> bool {
        self.0 == "USD"
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Which upstream source prices a currency.
///
/// The kind determines both the feed endpoint and the orientation of the
/// quoted price (crypto: USD per unit; fiat: units per USD).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Fiat currencies from the fiat exchange-rate feed.
    Fiat,
    /// Crypto assets from the crypto price feed.
    Crypto,
}

impl SourceKind {
    /// Stable lowercase name, also used as the cache key label.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Fiat => "fiat",
            SourceKind::Crypto => "crypto",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Static description of one supported currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyDescriptor {
    /// Canonical uppercase code.
    pub code: CurrencyCode,
    /// Human-readable name ("Bitcoin", "Euro").
    pub display_name: String,
    /// Symbol or flag emoji for rendering.
    pub symbol: String,
    /// Which feed prices this currency.
    pub source_kind: SourceKind,
    /// Identifier the upstream source keys this currency by
    /// (CoinGecko slug for crypto, the code itself for fiat).
    pub source_key: String,
}
