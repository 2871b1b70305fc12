//! Telegram Viewer - incremental chat viewer over the Bot API
//!
//! Polls `getUpdates` with an advancing offset, keeps a deduplicated,
//! time-ordered list of one chat's messages, and tracks which message the
//! user is looking at.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod navigation;
pub mod poller;
pub mod session;
pub mod store;

pub use error::{Error, Result};
