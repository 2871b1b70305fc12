//! Configuration and constants

use crate::error::{Error, Result};
use std::time::Duration;

/// Bot API host used unless overridden
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Maximum updates requested per getUpdates call
pub const BATCH_LIMIT: u32 = 100;

/// Text shown for messages that carry no text (stickers, photos, ...)
pub const NO_TEXT: &str = "[no text]";

/// Sender shown when the update has no `from.first_name`
pub const UNKNOWN_SENDER: &str = "Unknown";

/// All configurable values
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub bot_token: String,
    pub target_chat_id: String,
    pub poll_interval: Duration,
    pub batch_limit: u32,
    pub fetch_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            bot_token: String::new(),
            target_chat_id: String::new(),
            poll_interval: Duration::from_secs(5),
            batch_limit: BATCH_LIMIT,
            fetch_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    /// Build config from `TELEGRAM_*` environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(token) = std::env::var("TELEGRAM_BOT_TOKEN") {
            config.bot_token = token.trim().to_string();
        }
        if let Ok(chat_id) = std::env::var("TELEGRAM_CHAT_ID") {
            config.target_chat_id = chat_id.trim().to_string();
        }
        if let Ok(base) = std::env::var("TELEGRAM_API_BASE") {
            config.api_base = base.trim().to_string();
        }
        if let Ok(secs) = std::env::var("TELEGRAM_POLL_SECS") {
            config.poll_interval = Duration::from_secs(parse_secs("TELEGRAM_POLL_SECS", &secs)?);
        }
        if let Ok(secs) = std::env::var("TELEGRAM_FETCH_TIMEOUT_SECS") {
            config.fetch_timeout =
                Duration::from_secs(parse_secs("TELEGRAM_FETCH_TIMEOUT_SECS", &secs)?);
        }

        Ok(config)
    }

    /// Create config for testing against a local or fake endpoint
    pub fn for_test(target_chat_id: &str) -> Self {
        Self {
            api_base: "http://127.0.0.1:9".to_string(),
            bot_token: "123456:TEST-token".to_string(),
            target_chat_id: target_chat_id.to_string(),
            poll_interval: Duration::from_millis(50),
            batch_limit: BATCH_LIMIT,
            fetch_timeout: Duration::from_millis(500),
        }
    }

    /// Reject configs the poller cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.bot_token.is_empty() {
            return Err(Error::Config(
                "bot token missing (set TELEGRAM_BOT_TOKEN or --token)".to_string(),
            ));
        }
        if self.target_chat_id.is_empty() {
            return Err(Error::Config(
                "target chat id missing (set TELEGRAM_CHAT_ID or --chat-id)".to_string(),
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(Error::Config("poll interval must be non-zero".to_string()));
        }
        if self.fetch_timeout.is_zero() {
            return Err(Error::Config("fetch timeout must be non-zero".to_string()));
        }
        if self.batch_limit == 0 || self.batch_limit > BATCH_LIMIT {
            return Err(Error::Config(format!(
                "batch limit must be between 1 and {}",
                BATCH_LIMIT
            )));
        }
        Ok(())
    }

    /// getUpdates endpoint for this bot
    pub fn updates_url(&self) -> String {
        format!(
            "{}/bot{}/getUpdates",
            self.api_base.trim_end_matches('/'),
            self.bot_token
        )
    }
}

fn parse_secs(name: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} must be a whole number of seconds, got {:?}", name, value)))
}
