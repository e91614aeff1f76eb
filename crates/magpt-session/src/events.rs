//! Presentation events
//!
//! Session components never render anything themselves. They publish
//! [`UiEvent`]s and the front end decides how to show them.

use magpt_api::ModelOption;
use tokio::sync::mpsc;

use crate::catalog::ModelIndicator;
use crate::monitor::ConnectionStatus;
use crate::notices::{Notice, NoticeId};
use crate::transcript::{EntryId, Message};

/// Something the front end should reflect
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Status text, indicator or reconnect visibility changed
    StatusChanged(ConnectionStatus),
    /// Send action disabled (`true`) or re-enabled (`false`)
    SendingChanged(bool),
    /// Compose field should be emptied
    ComposeCleared,
    /// Focus should return to the compose field
    ComposeFocused,
    MessageAppended(Message),
    LoadingShown(EntryId),
    LoadingRemoved(EntryId),
    NoticeShown(Notice),
    NoticeFading(NoticeId),
    NoticeDismissed(NoticeId),
    FontApplied { font: String, size: u32 },
    ModelIndicatorChanged(ModelIndicator),
    CatalogLoaded(Vec<ModelOption>),
}

/// Publishing side of the event stream
///
/// Sending never fails: events published after the front end has gone away
/// are dropped.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<UiEvent>>,
}

impl EventSink {
    /// Create a sink and the receiver the front end drains
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<UiEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A sink that discards everything
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, event: UiEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}
