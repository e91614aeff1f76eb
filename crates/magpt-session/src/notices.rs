//! Transient error notices
//!
//! A notice is visible for five seconds, fades for 300 ms and is then
//! removed. Notices live outside the transcript.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use crate::events::{EventSink, UiEvent};
use crate::scheduler::Scheduler;

/// How long a notice stays fully visible
pub const NOTICE_VISIBLE: Duration = Duration::from_secs(5);

/// Fade-out before removal
pub const NOTICE_FADE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoticeId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: NoticeId,
    pub text: String,
    pub fading: bool,
}

struct BoardInner {
    scheduler: Arc<dyn Scheduler>,
    events: EventSink,
    next_id: AtomicU64,
    active: Mutex<Vec<Notice>>,
}

/// Active notices with scheduled dismissal
#[derive(Clone)]
pub struct NoticeBoard {
    inner: Arc<BoardInner>,
}

impl NoticeBoard {
    pub fn new(scheduler: Arc<dyn Scheduler>, events: EventSink) -> Self {
        Self {
            inner: Arc::new(BoardInner {
                scheduler,
                events,
                next_id: AtomicU64::new(0),
                active: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Show a notice and schedule its dismissal
    pub fn show(&self, text: impl Into<String>) -> NoticeId {
        let notice = Notice {
            id: NoticeId(self.inner.next_id.fetch_add(1, Ordering::SeqCst) + 1),
            text: text.into(),
            fading: false,
        };
        let id = notice.id;
        debug!("Showing notice {:?}: {}", id, notice.text);

        self.inner.active.lock().push(notice.clone());
        self.inner.events.emit(UiEvent::NoticeShown(notice));

        let board = self.clone();
        self.inner.scheduler.schedule(
            NOTICE_VISIBLE,
            Box::pin(async move {
                board.begin_fade(id);
            }),
        );

        id
    }

    /// Notices currently on screen, oldest first
    pub fn active(&self) -> Vec<Notice> {
        self.inner.active.lock().clone()
    }

    fn begin_fade(&self, id: NoticeId) {
        {
            let mut active = self.inner.active.lock();
            match active.iter_mut().find(|notice| notice.id == id) {
                Some(notice) => notice.fading = true,
                None => return,
            }
        }
        self.inner.events.emit(UiEvent::NoticeFading(id));

        let board = self.clone();
        self.inner.scheduler.schedule(
            NOTICE_FADE,
            Box::pin(async move {
                board.dismiss(id);
            }),
        );
    }

    fn dismiss(&self, id: NoticeId) {
        let removed = {
            let mut active = self.inner.active.lock();
            let before = active.len();
            active.retain(|notice| notice.id != id);
            active.len() != before
        };
        if removed {
            self.inner.events.emit(UiEvent::NoticeDismissed(id));
        }
    }
}
