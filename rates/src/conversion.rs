//! Conversion result types and cross-rate math.

use kursbot_common::CurrencyCode;
use serde::{Deserialize, Serialize};

/// A completed currency conversion.
///
/// Produced fresh per request and handed back to the caller; nothing is
/// stored. All numerics are `f64`, matching what the upstream feeds quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResult {
    /// Input amount, as given by the caller.
    pub amount: f64,
    /// Source currency code.
    pub from_code: CurrencyCode,
    /// Target currency code.
    pub to_code: CurrencyCode,
    /// Converted amount.
    pub result_amount: f64,
    /// Cross rate: target units per one source unit.
    pub rate: f64,
    /// USD price of one source unit.
    pub from_unit_usd: f64,
    /// USD price of one target unit.
    pub to_unit_usd: f64,
}

impl ConversionResult {
    /// Compute a conversion from the two USD unit prices.
    pub fn from_unit_prices(
        amount: f64,
        from_code: CurrencyCode,
        to_code: CurrencyCode,
        from_unit_usd: f64,
        to_unit_usd: f64,
    ) -> Self {
        let rate = cross_rate(from_unit_usd, to_unit_usd);

        Self {
            amount,
            from_code,
            to_code,
            result_amount: amount * rate,
            rate,
            from_unit_usd,
            to_unit_usd,
        }
    }
}

/// Target units per one source unit, given both USD unit prices.
pub fn cross_rate(from_unit_usd: f64, to_unit_usd: f64) -> f64 {
    from_unit_usd / to_unit_usd
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_identity_rate() {
        assert_eq!(cross_rate(65000.0, 65000.0), 1.0);
    }

    #[test]
    fn test_crypto_to_fiat_fixture() {
        // 1 BTC = 65000 USD, 1 EUR = 1/0.92 USD
        let result = ConversionResult::from_unit_prices(
            2.0,
            CurrencyCode::new("BTC"),
            CurrencyCode::new("EUR"),
            65000.0,
            1.0 / 0.92,
        );

        assert!((result.rate - 59_800.0).abs() < EPS);
        assert!((result.result_amount - 119_600.0).abs() < EPS);
    }

    #[test]
    fn test_result_carries_inputs() {
        let result = ConversionResult::from_unit_prices(
            10.0,
            CurrencyCode::new("EUR"),
            CurrencyCode::new("RUB"),
            1.0 / 0.92,
            1.0 / 90.0,
        );

        assert_eq!(result.amount, 10.0);
        assert_eq!(result.from_code.as_str(), "EUR");
        assert_eq!(result.to_code.as_str(), "RUB");
        assert!((result.from_unit_usd - 1.0 / 0.92).abs() < EPS);
    }

    proptest! {
        #[test]
        fn prop_reciprocal_rates_cancel(
            a in 1e-6f64..1e6,
            b in 1e-6f64..1e6,
        ) {
            let forward = cross_rate(a, b);
            let back = cross_rate(b, a);
            prop_assert!((forward * back - 1.0).abs() < 1e-9);
        }

        #[test]
        fn prop_identity_rate_is_one(a in 1e-6f64..1e6) {
            prop_assert!((cross_rate(a, a) - 1.0).abs() < 1e-12);
        }

        #[test]
        fn prop_result_scales_with_amount(
            amount in 1e-3f64..1e6,
            a in 1e-3f64..1e6,
            b in 1e-3f64..1e6,
        ) {
            let one = ConversionResult::from_unit_prices(
                1.0,
                CurrencyCode::new("A"),
                CurrencyCode::new("B"),
                a,
                b,
            );
            let many = ConversionResult::from_unit_prices(
                amount,
                CurrencyCode::new("A"),
                CurrencyCode::new("B"),
                a,
                b,
            );
            let expected = one.result_amount * amount;
            prop_assert!((many.result_amount - expected).abs() <= expected.abs() * 1e-12);
        }
    }
}
