//! Kursbot Common Types
//!
//! Shared currency vocabulary used across the kursbot engine and its
//! collaborators: currency codes, source kinds, descriptors, and the fixed
//! catalog of supported currencies.

pub mod catalog;
pub mod currency;

pub use catalog::*;
pub use currency::*;
