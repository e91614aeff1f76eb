//! Connection and conversation lifecycle for magpt
//!
//! - [`ConnectionMonitor`] tracks backend reachability with a bounded health
//!   probe, a single pending retry and a background ticker.
//! - [`ConversationController`] serializes message submission against the
//!   connection state.
//! - [`SettingsController`] applies settings actions and their side effects.
//!
//! Everything the user should see is published as [`UiEvent`]s.

pub mod app;
pub mod catalog;
pub mod controller;
pub mod error;
pub mod events;
pub mod monitor;
pub mod notices;
pub mod scheduler;
pub mod settings;
pub mod transcript;

pub use app::ChatSession;
pub use catalog::{model_indicator, CatalogCache, ModelIndicator};
pub use controller::{
    failure_reason, ConversationController, SendOutcome, SharedTranscript, GENERIC_FAILURE,
    NOT_CONNECTED_MESSAGE,
};
pub use error::{Result, SessionError};
pub use events::{EventSink, UiEvent};
pub use monitor::{
    describe_failure, ConnectionMonitor, ConnectionState, ConnectionStatus, MonitorConfig,
    TIMEOUT_MESSAGE,
};
pub use notices::{Notice, NoticeBoard, NoticeId, NOTICE_FADE, NOTICE_VISIBLE};
pub use scheduler::{RepeatingTask, Scheduler, TaskFuture, TaskHandle, TokioScheduler};
pub use settings::SettingsController;
pub use transcript::{EntryId, Message, Sender, Transcript, TranscriptEntry};
