//! Conversion engine error types.

use kursbot_common::CurrencyCode;
use thiserror::Error;

/// Errors raised while fetching a price snapshot from an upstream source.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (connection, DNS, timeout).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The source answered with a non-success status.
    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    /// The body did not match the expected shape.
    #[error("Malformed response body: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors returned by the conversion engine.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Code not in the currency catalog. No fetch is attempted.
    #[error("Currency not supported: {0}")]
    UnsupportedCurrency(CurrencyCode),

    /// A rate needed for the conversion could not be resolved, either
    /// because the fetch failed or because a fresh snapshot lacks the code.
    #[error("Rate unavailable for {code}")]
    RateUnavailable {
        code: CurrencyCode,
        #[source]
        cause: Option<FetchError>,
    },
}

/// Result type for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;
