//! Viewer session state
//!
//! One `Session` holds everything a consumer can observe: the merge store,
//! the navigation index, and the loading/error flags of the poll cycle.
//! The poller is its only writer for fetch results; navigation comes from
//! the consumer.

use crate::client::{redact_token, FetchOutcome};
use crate::error::Result;
use crate::message::Message;
use crate::navigation::Navigator;
use crate::store::{MergeReport, MergeStore};

/// How a single poll cycle ended
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Merged(MergeReport),
    /// Server answered `ok: false`; nothing changed
    Rejected(Option<String>),
    /// Transport or parse failure; nothing changed
    Failed(String),
}

impl CycleOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, CycleOutcome::Failed(_))
    }
}

/// What the consumer should show right now
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    /// First fetch still in flight
    Loading,
    /// Nothing loaded yet and the last fetch failed
    Error(String),
    /// Fetches succeed but the chat has no messages
    Empty,
    Showing {
        message: Message,
        position: usize,
        total: usize,
    },
}

/// Point-in-time copy of the observable state
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub messages: Vec<Message>,
    pub index: Option<usize>,
    pub loading: bool,
    pub error: String,
    pub cursor: i64,
}

impl Snapshot {
    pub fn current(&self) -> Option<&Message> {
        self.index.and_then(|i| self.messages.get(i))
    }

    /// Loaded messages always win over a stale error
    pub fn view(&self) -> ViewState {
        if self.loading && self.messages.is_empty() {
            return ViewState::Loading;
        }
        if !self.error.is_empty() && self.messages.is_empty() {
            return ViewState::Error(self.error.clone());
        }
        match (self.index, self.current()) {
            (Some(position), Some(message)) => ViewState::Showing {
                message: message.clone(),
                position,
                total: self.messages.len(),
            },
            _ => ViewState::Empty,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    store: MergeStore,
    navigator: Navigator,
    loading: bool,
    error: String,
    cycles: u64,
}

impl Session {
    pub fn new(target_chat_id: &str) -> Self {
        Self {
            store: MergeStore::new(target_chat_id),
            navigator: Navigator::new(),
            loading: false,
            error: String::new(),
            cycles: 0,
        }
    }

    /// Mark a fetch as outstanding
    pub fn begin_fetch(&mut self) {
        self.loading = true;
    }

    /// Apply the result of a fetch. List and cursor only change on success.
    pub fn commit(&mut self, result: Result<FetchOutcome>) -> CycleOutcome {
        self.loading = false;
        self.cycles += 1;

        match result {
            Ok(FetchOutcome::Updates(batch)) => {
                let report = self.store.absorb(&batch);
                self.navigator.apply(&report);
                self.error.clear();
                CycleOutcome::Merged(report)
            }
            Ok(FetchOutcome::Rejected { description }) => {
                self.error.clear();
                CycleOutcome::Rejected(description)
            }
            Err(e) => {
                self.error = redact_token(&format!("Error: {}", e));
                CycleOutcome::Failed(self.error.clone())
            }
        }
    }

    pub fn previous(&mut self) -> bool {
        self.navigator.previous()
    }

    pub fn next(&mut self) -> bool {
        self.navigator.next(self.store.len())
    }

    pub fn current(&self) -> Option<&Message> {
        self.navigator.index().and_then(|i| self.store.get(i))
    }

    pub fn messages(&self) -> &[Message] {
        self.store.messages()
    }

    pub fn index(&self) -> Option<usize> {
        self.navigator.index()
    }

    pub fn cursor(&self) -> i64 {
        self.store.cursor()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> &str {
        &self.error
    }

    /// Number of completed cycles
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn target_chat_id(&self) -> &str {
        self.store.target_chat_id()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            messages: self.store.messages().to_vec(),
            index: self.navigator.index(),
            loading: self.loading,
            error: self.error.clone(),
            cursor: self.store.cursor(),
        }
    }
}
