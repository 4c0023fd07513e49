//! Bot configuration.

/// Telegram transport configuration.
#[derive(Debug, Clone, Default)]
pub struct BotConfig {
    /// Bot API token issued by @BotFather.
    pub token: String,
}

impl BotConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            token: std::env::var("TELOXIDE_TOKEN").unwrap_or_default(),
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.token.is_empty() {
            return Err("TELOXIDE_TOKEN is not set".to_string());
        }

        Ok(())
    }
}
