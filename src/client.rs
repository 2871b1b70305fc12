//! Bot API client
//!
//! `UpdateSource` is the seam the poller fetches through; `TelegramClient`
//! is the reqwest-backed implementation used by the binary.

use crate::api::{RawUpdate, UpdatesResponse};
use crate::config::Config;
use crate::error::{Error, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

/// Result of a fetch that reached the server and was understood
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// `ok: true` with zero or more updates
    Updates(Vec<RawUpdate>),
    /// `ok: false`; treated as an empty batch
    Rejected { description: Option<String> },
}

/// Something that can answer a getUpdates request
#[async_trait]
pub trait UpdateSource: Send + Sync {
    async fn fetch(&self, offset: i64, limit: u32) -> Result<FetchOutcome>;
}

/// Bot tokens look like `<digits>:<35ish url-safe chars>` and show up in
/// request URLs, so in reqwest error messages too.
static BOT_TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"bot\d+:[A-Za-z0-9_-]+").expect("Invalid bot token regex"));

/// Replace any bot token in `text` with a placeholder
pub fn redact_token(text: &str) -> String {
    BOT_TOKEN_PATTERN.replace_all(text, "bot<redacted>").into_owned()
}

/// Offset to request given the highest update id already incorporated
pub fn next_offset(cursor: i64) -> i64 {
    if cursor > 0 {
        cursor.saturating_add(1)
    } else {
        0
    }
}

/// Decode a getUpdates body
pub fn parse_updates(body: &str) -> Result<FetchOutcome> {
    let resp: UpdatesResponse = serde_json::from_str(body)?;
    if resp.ok {
        Ok(FetchOutcome::Updates(resp.result))
    } else {
        Ok(FetchOutcome::Rejected {
            description: resp.description,
        })
    }
}

/// reqwest-backed Bot API client
#[derive(Clone)]
pub struct TelegramClient {
    client: reqwest::Client,
    updates_url: String,
}

impl TelegramClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .build()?;

        Ok(Self {
            client,
            updates_url: config.updates_url(),
        })
    }
}

#[async_trait]
impl UpdateSource for TelegramClient {
    async fn fetch(&self, offset: i64, limit: u32) -> Result<FetchOutcome> {
        debug!(offset, limit, "getUpdates");

        let response = self
            .client
            .get(&self.updates_url)
            .query(&[("limit", limit as i64), ("offset", offset)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        // 401/409/... still carry an `ok: false` body; keep its description
        // for the log but surface the status as an error.
        if !status.is_success() {
            let description = match parse_updates(&body) {
                Ok(FetchOutcome::Rejected { description }) => description,
                _ => None,
            };
            warn!(status = status.as_u16(), description = ?description, "getUpdates failed");
            return Err(Error::Status(status.as_u16()));
        }

        parse_updates(&body)
    }
}
