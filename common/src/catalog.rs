//! Fixed registry of supported currencies.
//!
//! The catalog is built once at startup from two static tables and never
//! mutated afterwards, so lookups need no synchronization. A code that is
//! not in the catalog is simply unsupported; the engine refuses it before
//! touching any upstream source.

use std::collections::HashMap;

use crate::currency::{CurrencyCode, CurrencyDescriptor, SourceKind};

/// One catalog row: (code, display name, symbol, upstream source key).
type CatalogRow = (&'static str, &'static str, &'static str, &'static str);

/// Fiat currencies, quoted by the fiat feed as units per 1 USD.
/// The source key for fiat is the code itself.
const FIAT_TABLE: &[CatalogRow] = &[
    ("USD", "US Dollar", "\u{1F1FA}\u{1F1F8}", "USD"),
    ("EUR", "Euro", "\u{1F1EA}\u{1F1FA}", "EUR"),
    ("RUB", "Russian Ruble", "\u{1F1F7}\u{1F1FA}", "RUB"),
    ("UAH", "Ukrainian Hryvnia", "\u{1F1FA}\u{1F1E6}", "UAH"),
    ("KZT", "Kazakhstani Tenge", "\u{1F1F0}\u{1F1FF}", "KZT"),
    ("BYN", "Belarusian Ruble", "\u{1F1E7}\u{1F1FE}", "BYN"),
    ("GBP", "British Pound", "\u{1F1EC}\u{1F1E7}", "GBP"),
    ("CNY", "Chinese Yuan", "\u{1F1E8}\u{1F1F3}", "CNY"),
    ("TRY", "Turkish Lira", "\u{1F1F9}\u{1F1F7}", "TRY"),
    ("GEL", "Georgian Lari", "\u{1F1EC}\u{1F1EA}", "GEL"),
    ("PLN", "Polish Zloty", "\u{1F1F5}\u{1F1F1}", "PLN"),
    ("CHF", "Swiss Franc", "\u{1F1E8}\u{1F1ED}", "CHF"),
];

/// Crypto assets, quoted by the crypto feed in USD per unit and keyed
/// upstream by slug.
const CRYPTO_TABLE: &[CatalogRow] = &[
    ("BTC", "Bitcoin", "\u{20BF}", "bitcoin"),
    ("ETH", "Ethereum", "\u{27E0}", "ethereum"),
    ("USDT", "Tether", "\u{1F4B2}", "tether"),
    ("BNB", "BNB", "\u{1F536}", "binancecoin"),
    ("SOL", "Solana", "\u{25CE}", "solana"),
    ("XRP", "Ripple", "\u{1F4A7}", "ripple"),
    ("TON", "Toncoin", "\u{1F48E}", "the-open-network"),
    ("DOGE", "Dogecoin", "\u{1F415}", "dogecoin"),
    ("ADA", "Cardano", "\u{1F535}", "cardano"),
    ("TRX", "TRON", "\u{26A1}", "tron"),
    ("LTC", "Litecoin", "\u{141}", "litecoin"),
    ("MATIC", "Polygon", "\u{1F7E3}", "matic-network"),
];

/// Lookup table over the supported currency set.
#[derive(Debug, Clone)]
pub struct CurrencyCatalog {
    descriptors: Vec<CurrencyDescriptor>,
    index: HashMap<CurrencyCode, usize>,
}

impl CurrencyCatalog {
    /// Build the catalog from the fixed fiat and crypto tables.
    pub fn new() -> Self {
        let mut descriptors = Vec::with_capacity(FIAT_TABLE.len() + CRYPTO_TABLE.len());

        for &(code, name, symbol, key) in FIAT_TABLE {
            descriptors.push(Self::row_descriptor(code, name, symbol, key, SourceKind::Fiat));
        }
        for &(code, name, symbol, key) in CRYPTO_TABLE {
            descriptors.push(Self::row_descriptor(code, name, symbol, key, SourceKind::Crypto));
        }

        let index = descriptors
            .iter()
            .enumerate()
            .map(|(i, d)| (d.code.clone(), i))
            .collect();

        Self { descriptors, index }
    }

    /// Look up the descriptor for a code, if supported.
    pub fn describe(&self, code: &CurrencyCode) -> Option<&CurrencyDescriptor> {
        self.index.get(code).map(|&i| &self.descriptors[i])
    }

    /// Check whether a code is in the supported set.
    pub fn supports(&self, code: &CurrencyCode) -> bool {
        self.index.contains_key(code)
    }

    /// All codes priced by the given source, in table order.
    pub fn codes(&self, kind: SourceKind) -> Vec<CurrencyCode> {
        self.descriptors(kind).map(|d| d.code.clone()).collect()
    }

    /// Upstream identifiers for every currency of the given source, in
    /// table order. Used to build batch feed queries.
    pub fn source_keys(&self, kind: SourceKind) -> Vec<&str> {
        self.descriptors(kind).map(|d| d.source_key.as_str()).collect()
    }

    /// Descriptors of the given source, in table order.
    pub fn descriptors(&self, kind: SourceKind) -> impl Iterator<Item = &CurrencyDescriptor> {
        self.descriptors.iter().filter(move |d| d.source_kind == kind)
    }

    /// Total number of supported currencies.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    fn row_descriptor(
        code: &str,
        name: &str,
        symbol: &str,
        key: &str,
        kind: SourceKind,
    ) -> CurrencyDescriptor {
        CurrencyDescriptor {
            code: CurrencyCode::new(code),
            display_name: name.to_string(),
            symbol: symbol.to_string(),
            source_kind: kind,
            source_key: key.to_string(),
        }
    }
}

impl Default for CurrencyCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_known_codes() {
        let catalog = CurrencyCatalog::new();

        let btc = catalog.describe(&CurrencyCode::new("BTC")).unwrap();
        assert_eq!(btc.source_kind, SourceKind::Crypto);
        assert_eq!(btc.source_key, "bitcoin");
        assert_eq!(btc.display_name, "Bitcoin");

        let eur = catalog.describe(&CurrencyCode::new("eur")).unwrap();
        assert_eq!(eur.source_kind, SourceKind::Fiat);
        assert_eq!(eur.source_key, "EUR");
    }

    #[test]
    fn test_unknown_code_is_absent() {
        let catalog = CurrencyCatalog::new();
        assert!(catalog.describe(&CurrencyCode::new("XYZ")).is_none());
        assert!(!catalog.supports(&CurrencyCode::new("XYZ")));
    }

    #[test]
    fn test_usd_is_fiat() {
        let catalog = CurrencyCatalog::new();
        let usd = catalog.describe(&CurrencyCode::usd()).unwrap();
        assert_eq!(usd.source_kind, SourceKind::Fiat);
        assert_eq!(usd.source_key, "USD");
    }

    #[test]
    fn test_no_code_in_both_registries() {
        let catalog = CurrencyCatalog::new();
        let fiat = catalog.codes(SourceKind::Fiat);
        let crypto = catalog.codes(SourceKind::Crypto);

        assert_eq!(fiat.len(), 12);
        assert_eq!(crypto.len(), 12);
        assert_eq!(catalog.len(), 24);
        assert!(fiat.iter().all(|c| !crypto.contains(c)));
    }

    #[test]
    fn test_table_order_preserved() {
        let catalog = CurrencyCatalog::new();
        let fiat = catalog.codes(SourceKind::Fiat);
        assert_eq!(fiat[0], CurrencyCode::usd());
        assert_eq!(fiat[1], CurrencyCode::new("EUR"));

        let keys = catalog.source_keys(SourceKind::Crypto);
        assert_eq!(keys[0], "bitcoin");
        assert!(keys.contains(&"the-open-network"));
    }
}
