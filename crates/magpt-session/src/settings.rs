//! Settings actions with immediate-apply side effects

use std::sync::Arc;

use magpt_config::{PreferenceStore, Preferences, SettingChange, SettingKey};
use tracing::info;

use crate::catalog::{model_indicator, CatalogCache, ModelIndicator};
use crate::error::{Result, SessionError};
use crate::events::{EventSink, UiEvent};
use crate::monitor::ConnectionMonitor;

/// Applies one settings action at a time
pub struct SettingsController {
    prefs: Arc<PreferenceStore>,
    monitor: ConnectionMonitor,
    catalog: CatalogCache,
    events: EventSink,
}

impl SettingsController {
    pub fn new(
        prefs: Arc<PreferenceStore>,
        monitor: ConnectionMonitor,
        catalog: CatalogCache,
        events: EventSink,
    ) -> Self {
        Self {
            prefs,
            monitor,
            catalog,
            events,
        }
    }

    pub fn preferences(&self) -> Preferences {
        self.prefs.snapshot()
    }

    /// Validate, persist and react to a change
    ///
    /// A new API URL is probed before returning.
    pub async fn apply(&self, change: SettingChange) -> Result<Preferences> {
        if let SettingChange::Model(Some(id)) = &change {
            self.check_model(id)?;
        }

        let key = change.key();
        let prefs = self.prefs.apply(change)?;
        info!("Updated setting {}", key.name());

        match key {
            SettingKey::Font | SettingKey::FontSize => self.publish_font(&prefs),
            SettingKey::ApiUrl => {
                self.monitor.check_connection().await;
            }
            SettingKey::Model => self.publish_indicator(),
            SettingKey::Temperature | SettingKey::MaxTokens | SettingKey::TopK => {}
        }

        Ok(prefs)
    }

    /// Parse `key`/`value` from the command line and apply it
    pub async fn apply_text(&self, key: &str, value: &str) -> Result<Preferences> {
        let key = SettingKey::parse(key)?;
        let change = SettingChange::parse(key, value)?;
        self.apply(change).await
    }

    pub fn indicator(&self) -> ModelIndicator {
        let selected = self.prefs.model_id();
        model_indicator(selected.as_deref(), self.catalog.get().as_ref())
    }

    /// Publish the current font
    pub fn apply_font(&self) {
        self.publish_font(&self.prefs.snapshot());
    }

    pub fn publish_indicator(&self) {
        self.events
            .emit(UiEvent::ModelIndicatorChanged(self.indicator()));
    }

    fn publish_font(&self, prefs: &Preferences) {
        self.events.emit(UiEvent::FontApplied {
            font: prefs.font.clone(),
            size: prefs.font_size,
        });
    }

    // Without a catalog any identifier is accepted
    fn check_model(&self, id: &str) -> Result<()> {
        let Some(catalog) = self.catalog.get() else {
            return Ok(());
        };
        match catalog.get(id) {
            None => Err(SessionError::UnknownModel(id.to_string())),
            Some(entry) if entry.disabled => Err(SessionError::ModelUnavailable(id.to_string())),
            Some(_) => Ok(()),
        }
    }
}
