//! Message submission
//!
//! [`ConversationController::send_message`] serializes sends: at most one
//! generation is outstanding, nothing is sent while disconnected, and the
//! sending flag is cleared exactly once however the send ends.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use magpt_api::{ApiClient, ApiError, GenerateRequest, GenerationMetrics};
use magpt_config::PreferenceStore;
use parking_lot::RwLock;
use tracing::{debug, error, info, warn};

use crate::error::{Result, SessionError};
use crate::events::{EventSink, UiEvent};
use crate::monitor::ConnectionMonitor;
use crate::notices::NoticeBoard;
use crate::transcript::{EntryId, Sender, Transcript};

/// Notice shown when a send is attempted while disconnected
pub const NOT_CONNECTED_MESSAGE: &str = "Not connected to API server. Retrying connection...";

/// Reason used when the backend fails without saying why
pub const GENERIC_FAILURE: &str = "Generation failed";

/// Transcript shared between the controller and the front end
pub type SharedTranscript = Arc<RwLock<Transcript>>;

/// Which path a send took
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Another send is in flight
    Busy,
    /// Input was blank
    Empty,
    /// Backend unreachable; a reconnect was started
    NotConnected,
    /// Assistant reply appended
    Delivered,
    /// Generation failed; the reason was shown as a notice
    Failed(String),
}

/// Notice text for a failed generation, without the `Error: ` prefix
pub fn failure_reason(err: &ApiError) -> String {
    match err {
        ApiError::Status { detail, .. } => detail
            .clone()
            .unwrap_or_else(|| GENERIC_FAILURE.to_string()),
        other => other.to_string(),
    }
}

/// Holds the sending flag for the duration of one accepted send
struct SendingGuard<'a> {
    flag: &'a AtomicBool,
    events: &'a EventSink,
}

impl<'a> SendingGuard<'a> {
    fn acquire(flag: &'a AtomicBool, events: &'a EventSink) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        events.emit(UiEvent::SendingChanged(true));
        Some(Self { flag, events })
    }
}

impl Drop for SendingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
        self.events.emit(UiEvent::SendingChanged(false));
        self.events.emit(UiEvent::ComposeFocused);
    }
}

/// Owns the conversation thread and submits prompts
pub struct ConversationController {
    api: Arc<dyn ApiClient>,
    monitor: ConnectionMonitor,
    prefs: Arc<PreferenceStore>,
    transcript: SharedTranscript,
    notices: NoticeBoard,
    events: EventSink,
    sending: AtomicBool,
}

impl ConversationController {
    pub fn new(
        api: Arc<dyn ApiClient>,
        monitor: ConnectionMonitor,
        prefs: Arc<PreferenceStore>,
        notices: NoticeBoard,
        events: EventSink,
    ) -> Self {
        Self {
            api,
            monitor,
            prefs,
            transcript: Arc::new(RwLock::new(Transcript::new())),
            notices,
            events,
            sending: AtomicBool::new(false),
        }
    }

    pub fn transcript(&self) -> SharedTranscript {
        self.transcript.clone()
    }

    pub fn is_sending(&self) -> bool {
        self.sending.load(Ordering::SeqCst)
    }

    /// Text of the message at 1-based `position`
    pub fn message_text(&self, position: usize) -> Result<String> {
        self.transcript
            .read()
            .message(position)
            .map(|message| message.text.clone())
            .ok_or(SessionError::NoSuchMessage(position))
    }

    /// Submit `raw_input` as a prompt
    pub async fn send_message(&self, raw_input: &str) -> SendOutcome {
        if self.is_sending() {
            debug!("Send ignored: another send is in flight");
            return SendOutcome::Busy;
        }

        let prompt = raw_input.trim();
        if prompt.is_empty() {
            return SendOutcome::Empty;
        }

        if !self.monitor.is_connected() {
            warn!("Send refused: not connected");
            self.notices.show(NOT_CONNECTED_MESSAGE);
            self.monitor.request_check();
            return SendOutcome::NotConnected;
        }

        let Some(_guard) = SendingGuard::acquire(&self.sending, &self.events) else {
            debug!("Send ignored: another send won the race");
            return SendOutcome::Busy;
        };

        self.events.emit(UiEvent::ComposeCleared);
        self.append(prompt, Sender::User, None);
        let loading = self.transcript.write().push_loading();
        self.events.emit(UiEvent::LoadingShown(loading));

        let request = GenerateRequest::from_preferences(prompt, &self.prefs.snapshot());
        info!("Generating (prompt {} chars)", prompt.chars().count());
        let result = self.api.generate(&request).await;
        self.remove_loading(loading);

        match result {
            Ok(response) => {
                let metrics = self.fetch_metrics().await;
                self.append(&response.generated_text, Sender::Assistant, metrics);
                SendOutcome::Delivered
            }
            Err(err) => {
                error!("Generation failed: {}", err);
                let reason = failure_reason(&err);
                self.notices.show(format!("Error: {}", reason));
                SendOutcome::Failed(reason)
            }
        }
    }

    fn append(&self, text: &str, sender: Sender, metrics: Option<GenerationMetrics>) {
        let message = self.transcript.write().push_message(text, sender, metrics);
        self.events.emit(UiEvent::MessageAppended(message));
    }

    fn remove_loading(&self, id: EntryId) {
        if self.transcript.write().remove_loading(id) {
            self.events.emit(UiEvent::LoadingRemoved(id));
        }
    }

    async fn fetch_metrics(&self) -> Option<GenerationMetrics> {
        match self.api.metrics().await {
            Ok(metrics) => metrics,
            Err(e) => {
                warn!("Failed to fetch metrics: {}", e);
                None
            }
        }
    }
}
