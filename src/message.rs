//! Viewer message model

use crate::api::RawUpdate;
use crate::config::{NO_TEXT, UNKNOWN_SENDER};
use chrono::{Local, TimeZone};

/// Display format for message dates, e.g. `19.10.2026 14:05`
pub const DISPLAY_DATE_FORMAT: &str = "%d.%m.%Y %H:%M";

/// A chat message as shown by the viewer. Built once during a merge and
/// never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: i64,
    pub text: String,
    pub sender: String,
    /// Unix seconds
    pub timestamp: i64,
    pub display_date: String,
}

impl Message {
    /// Build a message from an update, if it carries one
    pub fn from_update(update: &RawUpdate) -> Option<Self> {
        let raw = update.message.as_ref()?;

        let sender = raw
            .from
            .as_ref()
            .and_then(|u| u.first_name.clone())
            .unwrap_or_else(|| UNKNOWN_SENDER.to_string());

        Some(Self {
            id: update.update_id,
            text: raw.text.clone().unwrap_or_else(|| NO_TEXT.to_string()),
            sender,
            timestamp: raw.date,
            display_date: format_display_date(raw.date),
        })
    }

    /// Ordering key within the store
    pub fn sort_key(&self) -> (i64, i64) {
        (self.timestamp, self.id)
    }

    /// Time-of-day part of the display date (`HH:MM`)
    pub fn display_time(&self) -> &str {
        self.display_date
            .split_once(' ')
            .map(|(_, time)| time)
            .unwrap_or(&self.display_date)
    }
}

/// Format unix seconds in the local timezone
pub fn format_display_date(timestamp: i64) -> String {
    format_display_date_in(timestamp, &Local)
}

/// Format unix seconds in the given timezone
pub fn format_display_date_in<Tz: TimeZone>(timestamp: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match tz.timestamp_opt(timestamp, 0).single() {
        Some(dt) => dt.format(DISPLAY_DATE_FORMAT).to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{RawChat, RawMessage, RawUser};
    use chrono::Utc;

    fn update(id: i64, first_name: Option<&str>, text: Option<&str>) -> RawUpdate {
        RawUpdate {
            update_id: id,
            message: Some(RawMessage {
                chat: RawChat { id: "1".to_string() },
                from: Some(RawUser {
                    first_name: first_name.map(String::from),
                }),
                date: 1_700_000_000,
                text: text.map(String::from),
            }),
        }
    }

    #[test]
    fn test_from_update() {
        let msg = Message::from_update(&update(4, Some("Ayse"), Some("selam"))).unwrap();
        assert_eq!(msg.id, 4);
        assert_eq!(msg.sender, "Ayse");
        assert_eq!(msg.text, "selam");
        assert_eq!(msg.timestamp, 1_700_000_000);
        assert!(!msg.display_date.is_empty());
    }

    #[test]
    fn test_sentinels() {
        let msg = Message::from_update(&update(4, None, None)).unwrap();
        assert_eq!(msg.sender, UNKNOWN_SENDER);
        assert_eq!(msg.text, NO_TEXT);
    }

    #[test]
    fn test_missing_from_uses_unknown() {
        let mut u = update(4, Some("x"), Some("y"));
        u.message.as_mut().unwrap().from = None;
        assert_eq!(Message::from_update(&u).unwrap().sender, UNKNOWN_SENDER);
    }

    #[test]
    fn test_update_without_message() {
        let u = RawUpdate {
            update_id: 9,
            message: None,
        };
        assert!(Message::from_update(&u).is_none());
    }

    #[test]
    fn test_format_display_date_utc() {
        // 2023-11-14 22:13:20 UTC
        assert_eq!(format_display_date_in(1_700_000_000, &Utc), "14.11.2023 22:13");
        assert_eq!(format_display_date_in(0, &Utc), "01.01.1970 00:00");
    }

    #[test]
    fn test_display_time() {
        let mut msg = Message::from_update(&update(1, None, None)).unwrap();
        msg.display_date = "14.11.2023 22:13".to_string();
        assert_eq!(msg.display_time(), "22:13");
    }
}
