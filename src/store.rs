//! Merge store - the authoritative ordered message list
//!
//! Every fetched batch is folded in with [`merge`]: the cursor advances past
//! every update the server returned, updates for other chats are dropped,
//! and the result is deduplicated by id and sorted by `(timestamp, id)`.

use crate::api::RawUpdate;
use crate::message::Message;
use std::collections::HashSet;

/// Result of folding one batch into a list
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub messages: Vec<Message>,
    pub cursor: i64,
    pub grew: bool,
}

/// Fold `batch` into `existing`.
///
/// Pure: the same inputs always give the same output, so replaying a batch
/// (at-least-once delivery from the poll loop) is harmless.
pub fn merge(
    existing: &[Message],
    existing_cursor: i64,
    batch: &[RawUpdate],
    target_chat_id: &str,
) -> MergeOutcome {
    // Filtered updates still advance the cursor
    let cursor = batch
        .iter()
        .map(|u| u.update_id)
        .fold(existing_cursor, i64::max);

    let mut seen: HashSet<i64> = existing.iter().map(|m| m.id).collect();
    let mut messages = existing.to_vec();

    for update in batch {
        if update.chat_id() != Some(target_chat_id) {
            continue;
        }
        // First seen wins
        if !seen.insert(update.update_id) {
            continue;
        }
        if let Some(msg) = Message::from_update(update) {
            messages.push(msg);
        }
    }

    messages.sort_by_key(Message::sort_key);

    let grew = messages.len() > existing.len();
    MergeOutcome {
        messages,
        cursor,
        grew,
    }
}

/// What a call to [`MergeStore::absorb`] changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeReport {
    pub previous_len: usize,
    pub new_len: usize,
    pub previous_cursor: i64,
    pub cursor: i64,
    pub grew: bool,
}

impl MergeReport {
    pub fn added(&self) -> usize {
        self.new_len.saturating_sub(self.previous_len)
    }
}

/// In-memory message list plus cursor for one target chat
#[derive(Debug, Clone)]
pub struct MergeStore {
    target_chat_id: String,
    messages: Vec<Message>,
    cursor: i64,
}

impl MergeStore {
    pub fn new(target_chat_id: &str) -> Self {
        Self {
            target_chat_id: target_chat_id.to_string(),
            messages: Vec::new(),
            cursor: 0,
        }
    }

    /// Merge a fetched batch and commit the result
    pub fn absorb(&mut self, batch: &[RawUpdate]) -> MergeReport {
        let previous_len = self.messages.len();
        let previous_cursor = self.cursor;

        let outcome = merge(&self.messages, self.cursor, batch, &self.target_chat_id);
        self.messages = outcome.messages;
        self.cursor = outcome.cursor;

        MergeReport {
            previous_len,
            new_len: self.messages.len(),
            previous_cursor,
            cursor: self.cursor,
            grew: outcome.grew,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn get(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    pub fn target_chat_id(&self) -> &str {
        &self.target_chat_id
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{RawChat, RawMessage, RawUser};

    const TARGET: &str = "5943374104";

    fn update(id: i64, chat: &str, date: i64, text: &str) -> RawUpdate {
        RawUpdate {
            update_id: id,
            message: Some(RawMessage {
                chat: RawChat { id: chat.to_string() },
                from: Some(RawUser {
                    first_name: Some("Ayse".to_string()),
                }),
                date,
                text: Some(text.to_string()),
            }),
        }
    }

    #[test]
    fn test_merge_into_empty() {
        let batch = vec![
            update(5, TARGET, 100, "a"),
            update(6, TARGET, 200, "b"),
            update(7, TARGET, 300, "c"),
        ];
        let out = merge(&[], 0, &batch, TARGET);
        assert_eq!(out.messages.len(), 3);
        assert_eq!(out.cursor, 7);
        assert!(out.grew);
    }

    #[test]
    fn test_merge_dedup_and_filter() {
        let first = merge(
            &[],
            0,
            &[
                update(5, TARGET, 100, "a"),
                update(6, TARGET, 200, "b"),
                update(7, TARGET, 300, "c"),
            ],
            TARGET,
        );

        let batch = vec![
            update(6, TARGET, 200, "edited b"),
            update(8, TARGET, 400, "d"),
            update(9, "999", 500, "other chat"),
        ];
        let out = merge(&first.messages, first.cursor, &batch, TARGET);

        assert_eq!(out.messages.len(), 4);
        assert_eq!(out.cursor, 9);
        assert!(out.grew);
        // Existing message untouched
        let six = out.messages.iter().find(|m| m.id == 6).unwrap();
        assert_eq!(six.text, "b");
        assert!(out.messages.iter().all(|m| m.id != 9));
    }

    #[test]
    fn test_merge_empty_batch() {
        let first = merge(&[], 0, &[update(5, TARGET, 100, "a")], TARGET);
        let out = merge(&first.messages, first.cursor, &[], TARGET);
        assert_eq!(out.messages, first.messages);
        assert_eq!(out.cursor, first.cursor);
        assert!(!out.grew);
    }

    #[test]
    fn test_merge_sorts_by_timestamp_then_id() {
        let batch = vec![
            update(12, TARGET, 300, "late"),
            update(11, TARGET, 100, "early"),
            update(14, TARGET, 200, "tie b"),
            update(13, TARGET, 200, "tie a"),
        ];
        let out = merge(&[], 0, &batch, TARGET);
        let ids: Vec<i64> = out.messages.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![11, 13, 14, 12]);
    }

    #[test]
    fn test_duplicate_within_batch_first_wins() {
        let batch = vec![update(3, TARGET, 10, "first"), update(3, TARGET, 10, "second")];
        let out = merge(&[], 0, &batch, TARGET);
        assert_eq!(out.messages.len(), 1);
        assert_eq!(out.messages[0].text, "first");
    }

    #[test]
    fn test_update_without_message_advances_cursor() {
        let batch = vec![RawUpdate {
            update_id: 40,
            message: None,
        }];
        let out = merge(&[], 12, &batch, TARGET);
        assert!(out.messages.is_empty());
        assert_eq!(out.cursor, 40);
        assert!(!out.grew);
    }

    #[test]
    fn test_cursor_never_moves_backwards() {
        let out = merge(&[], 50, &[update(3, TARGET, 1, "old")], TARGET);
        assert_eq!(out.cursor, 50);
    }

    #[test]
    fn test_store_absorb_report() {
        let mut store = MergeStore::new(TARGET);
        let report = store.absorb(&[update(5, TARGET, 1, "a"), update(6, "x", 2, "b")]);
        assert_eq!(report.previous_len, 0);
        assert_eq!(report.new_len, 1);
        assert_eq!(report.added(), 1);
        assert_eq!(report.cursor, 6);
        assert!(report.grew);
        assert_eq!(store.cursor(), 6);
        assert_eq!(store.get(0).unwrap().text, "a");

        let report = store.absorb(&[update(5, TARGET, 1, "a")]);
        assert!(!report.grew);
        assert_eq!(report.added(), 0);
        assert_eq!(store.len(), 1);
    }
}
