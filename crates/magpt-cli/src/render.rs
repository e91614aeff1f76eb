//! Turns session events into terminal output

use magpt_session::UiEvent;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;

use crate::output::OutputStyle;

/// Formats [`UiEvent`]s, suppressing repeats of the status line
#[derive(Debug)]
pub struct Renderer {
    style: OutputStyle,
    last_status: Option<String>,
}

impl Renderer {
    pub fn new(style: OutputStyle) -> Self {
        Self {
            style,
            last_status: None,
        }
    }

    /// Text to print for `event`, if any
    pub fn render(&mut self, event: &UiEvent) -> Option<String> {
        match event {
            UiEvent::StatusChanged(status) => {
                if status.checking {
                    return None;
                }
                let line = self.style.status(status);
                if self.last_status.as_deref() == Some(line.as_str()) {
                    return None;
                }
                self.last_status = Some(line.clone());
                Some(line)
            }
            UiEvent::MessageAppended(message) => Some(self.style.message(message)),
            UiEvent::LoadingShown(_) => Some(self.style.dim("…")),
            UiEvent::NoticeShown(notice) => Some(self.style.error(&notice.text)),
            UiEvent::FontApplied { font, size } => Some(
                self.style
                    .info(&format!("Font: {} at {}px", font, size)),
            ),
            UiEvent::ModelIndicatorChanged(indicator) => Some(self.style.info(&format!(
                "{} {}",
                indicator.text,
                self.style.dim(&format!("({})", indicator.tooltip))
            ))),
            UiEvent::CatalogLoaded(options) => {
                debug!("{} model options available", options.len());
                None
            }
            UiEvent::SendingChanged(_)
            | UiEvent::ComposeCleared
            | UiEvent::ComposeFocused
            | UiEvent::LoadingRemoved(_)
            | UiEvent::NoticeFading(_)
            | UiEvent::NoticeDismissed(_) => None,
        }
    }
}

/// Print events until the session drops its sink
pub async fn render_loop(mut events: UnboundedReceiver<UiEvent>, mut renderer: Renderer) {
    while let Some(event) = events.recv().await {
        if let Some(text) = renderer.render(&event) {
            println!("{}", text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use magpt_session::{ConnectionState, ConnectionStatus, Notice, NoticeId};

    fn connected() -> ConnectionStatus {
        ConnectionStatus {
            state: ConnectionState::Connected,
            device: Some("cpu".to_string()),
            last_error: None,
            checking: false,
        }
    }

    #[test]
    fn test_status_printed_once_per_change() {
        let mut renderer = Renderer::new(OutputStyle::plain());
        let checking = ConnectionStatus {
            checking: true,
            ..ConnectionStatus::default()
        };

        assert!(renderer.render(&UiEvent::StatusChanged(checking)).is_none());
        assert_eq!(
            renderer.render(&UiEvent::StatusChanged(connected())).as_deref(),
            Some("● Connected (cpu)")
        );
        assert!(renderer.render(&UiEvent::StatusChanged(connected())).is_none());
    }

    #[test]
    fn test_notice_and_plumbing_events() {
        let mut renderer = Renderer::new(OutputStyle::plain());
        let notice = Notice {
            id: NoticeId(1),
            text: "Error: OOM".to_string(),
            fading: false,
        };

        assert_eq!(
            renderer.render(&UiEvent::NoticeShown(notice)).as_deref(),
            Some("✗ Error: OOM")
        );
        assert!(renderer.render(&UiEvent::ComposeFocused).is_none());
        assert!(renderer.render(&UiEvent::NoticeDismissed(NoticeId(1))).is_none());
    }
}
