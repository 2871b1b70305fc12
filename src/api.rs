//! Bot API wire types for `getUpdates`
//!
//! Only the fields the viewer reads are modelled; everything else in the
//! payload is ignored by serde.

use serde::{Deserialize, Deserializer};

/// Top-level `getUpdates` response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatesResponse {
    pub ok: bool,
    #[serde(default)]
    pub result: Vec<RawUpdate>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A single update as returned by the server
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawUpdate {
    pub update_id: i64,
    /// Absent for edited messages, channel posts, callbacks, ...
    #[serde(default)]
    pub message: Option<RawMessage>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawMessage {
    pub chat: RawChat,
    #[serde(default)]
    pub from: Option<RawUser>,
    /// Unix seconds
    pub date: i64,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawChat {
    #[serde(deserialize_with = "chat_id_as_string")]
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawUser {
    #[serde(default)]
    pub first_name: Option<String>,
}

impl RawUpdate {
    /// Chat id of the carried message, if any
    pub fn chat_id(&self) -> Option<&str> {
        self.message.as_ref().map(|m| m.chat.id.as_str())
    }
}

/// The Bot API sends chat ids as integers, but they are compared as strings
/// against the configured target, so accept either representation.
fn chat_id_as_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ChatId {
        Int(i64),
        Str(String),
    }

    Ok(match ChatId::deserialize(deserializer)? {
        ChatId::Int(id) => id.to_string(),
        ChatId::Str(id) => id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success_response() {
        let json = r#"{
            "ok": true,
            "result": [
                {"update_id": 10, "message": {
                    "message_id": 3,
                    "chat": {"id": 5943374104, "type": "private"},
                    "from": {"id": 1, "first_name": "Ayse", "is_bot": false},
                    "date": 1700000000,
                    "text": "merhaba"
                }}
            ]
        }"#;
        let resp: UpdatesResponse = serde_json::from_str(json).unwrap();
        assert!(resp.ok);
        assert_eq!(resp.result.len(), 1);
        let update = &resp.result[0];
        assert_eq!(update.update_id, 10);
        assert_eq!(update.chat_id(), Some("5943374104"));
        let msg = update.message.as_ref().unwrap();
        assert_eq!(msg.text.as_deref(), Some("merhaba"));
        assert_eq!(msg.from.as_ref().unwrap().first_name.as_deref(), Some("Ayse"));
    }

    #[test]
    fn test_parse_string_chat_id() {
        let json = r#"{"update_id": 1, "message": {"chat": {"id": "-100200"}, "date": 5}}"#;
        let update: RawUpdate = serde_json::from_str(json).unwrap();
        assert_eq!(update.chat_id(), Some("-100200"));
        let msg = update.message.unwrap();
        assert!(msg.from.is_none());
        assert!(msg.text.is_none());
    }

    #[test]
    fn test_parse_update_without_message() {
        let json = r#"{"update_id": 77, "edited_message": {"chat": {"id": 1}, "date": 5}}"#;
        let update: RawUpdate = serde_json::from_str(json).unwrap();
        assert_eq!(update.update_id, 77);
        assert!(update.message.is_none());
        assert_eq!(update.chat_id(), None);
    }

    #[test]
    fn test_parse_rejected_response() {
        let json = r#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#;
        let resp: UpdatesResponse = serde_json::from_str(json).unwrap();
        assert!(!resp.ok);
        assert!(resp.result.is_empty());
        assert_eq!(resp.description.as_deref(), Some("Unauthorized"));
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        let json = r#"{"ok": true, "result": [{"message": {}}]}"#;
        assert!(serde_json::from_str::<UpdatesResponse>(json).is_err());
    }
}
