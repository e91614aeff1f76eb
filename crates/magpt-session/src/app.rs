//! Wiring of the session components

use std::sync::Arc;

use magpt_api::ApiClient;
use magpt_config::PreferenceStore;
use tracing::info;

use crate::catalog::CatalogCache;
use crate::controller::{ConversationController, SharedTranscript};
use crate::events::{EventSink, UiEvent};
use crate::monitor::{ConnectionMonitor, MonitorConfig};
use crate::notices::NoticeBoard;
use crate::scheduler::Scheduler;
use crate::settings::SettingsController;

/// One chat session against one backend
pub struct ChatSession {
    api: Arc<dyn ApiClient>,
    events: EventSink,
    pub monitor: ConnectionMonitor,
    pub catalog: CatalogCache,
    pub notices: NoticeBoard,
    pub controller: Arc<ConversationController>,
    pub settings: SettingsController,
}

impl ChatSession {
    pub fn new(
        prefs: Arc<PreferenceStore>,
        api: Arc<dyn ApiClient>,
        scheduler: Arc<dyn Scheduler>,
        events: EventSink,
    ) -> Self {
        Self::with_monitor_config(prefs, api, scheduler, events, MonitorConfig::default())
    }

    pub fn with_monitor_config(
        prefs: Arc<PreferenceStore>,
        api: Arc<dyn ApiClient>,
        scheduler: Arc<dyn Scheduler>,
        events: EventSink,
        monitor_config: MonitorConfig,
    ) -> Self {
        let monitor = ConnectionMonitor::with_config(
            api.clone(),
            scheduler.clone(),
            events.clone(),
            monitor_config,
        );
        let catalog = CatalogCache::new();
        let notices = NoticeBoard::new(scheduler, events.clone());
        let controller = Arc::new(ConversationController::new(
            api.clone(),
            monitor.clone(),
            prefs.clone(),
            notices.clone(),
            events.clone(),
        ));
        let settings =
            SettingsController::new(prefs, monitor.clone(), catalog.clone(), events.clone());

        Self {
            api,
            events,
            monitor,
            catalog,
            notices,
            controller,
            settings,
        }
    }

    pub fn transcript(&self) -> SharedTranscript {
        self.controller.transcript()
    }

    /// Startup: font, first probe, model catalog, then the ticker
    pub async fn start(&self) {
        self.settings.apply_font();

        let status = self.monitor.check_connection().await;
        info!("Initial connection: {}", status.status_text());

        if self.catalog.load(self.api.as_ref()).await {
            self.events
                .emit(UiEvent::CatalogLoaded(self.catalog.options()));
        }
        self.settings.publish_indicator();

        self.monitor.start_polling();
    }

    pub fn shutdown(&self) {
        self.monitor.shutdown();
    }
}
