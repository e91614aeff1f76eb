//! Conversation thread

use chrono::{DateTime, Local};
use magpt_api::GenerationMetrics;

/// Identifier of a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub u64);

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Assistant,
}

/// A message in the thread; immutable once appended
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: EntryId,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Local>,
    /// Backend figures fetched right after the generation, assistant only
    pub metrics: Option<GenerationMetrics>,
}

impl Message {
    /// Metrics line shown under an assistant message
    pub fn annotation(&self) -> Option<String> {
        match self.sender {
            Sender::Assistant => self.metrics.as_ref().map(GenerationMetrics::summary),
            Sender::User => None,
        }
    }

    /// `HH:MM` label
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

/// One row of the thread
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptEntry {
    Message(Message),
    /// Placeholder while a generation is outstanding
    Loading(EntryId),
}

impl TranscriptEntry {
    pub fn id(&self) -> EntryId {
        match self {
            TranscriptEntry::Message(message) => message.id,
            TranscriptEntry::Loading(id) => *id,
        }
    }
}

/// Ordered conversation thread for the session
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> EntryId {
        self.next_id += 1;
        EntryId(self.next_id)
    }

    /// Append a message and return a copy of it
    pub fn push_message(
        &mut self,
        text: impl Into<String>,
        sender: Sender,
        metrics: Option<GenerationMetrics>,
    ) -> Message {
        let message = Message {
            id: self.allocate(),
            text: text.into(),
            sender,
            timestamp: Local::now(),
            metrics,
        };
        self.entries.push(TranscriptEntry::Message(message.clone()));
        message
    }

    /// Append a loading placeholder
    pub fn push_loading(&mut self) -> EntryId {
        let id = self.allocate();
        self.entries.push(TranscriptEntry::Loading(id));
        id
    }

    /// Remove a loading placeholder; `false` if it was already gone
    pub fn remove_loading(&mut self, id: EntryId) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|entry| !matches!(entry, TranscriptEntry::Loading(loading) if *loading == id));
        self.entries.len() != before
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Messages in order, placeholders skipped
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter().filter_map(|entry| match entry {
            TranscriptEntry::Message(message) => Some(message),
            TranscriptEntry::Loading(_) => None,
        })
    }

    /// Message by 1-based position among messages
    pub fn message(&self, position: usize) -> Option<&Message> {
        position
            .checked_sub(1)
            .and_then(|index| self.messages().nth(index))
    }

    pub fn message_count(&self) -> usize {
        self.messages().count()
    }

    pub fn has_loading(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| matches!(entry, TranscriptEntry::Loading(_)))
    }
}
