//! Kursbot Telegram Bot
//!
//! Command and plain-text frontends over the conversion engine,
//! served through Telegram long polling.

pub mod config;
pub mod format;
pub mod handlers;

pub use config::BotConfig;
