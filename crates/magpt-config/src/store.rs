//! Preference store: the single owner of the persisted preferences

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::{
    error::Result,
    preferences::{Preferences, SettingChange, STORAGE_KEY},
    storage::Storage,
};

/// Owns the current [`Preferences`] and writes every change through to storage.
///
/// Readers take cheap snapshots; the only mutation paths are [`save`] and
/// [`apply`], each of which performs exactly one storage write.
///
/// [`save`]: PreferenceStore::save
/// [`apply`]: PreferenceStore::apply
pub struct PreferenceStore {
    storage: Arc<dyn Storage>,
    current: RwLock<Preferences>,
}

impl PreferenceStore {
    /// Load persisted preferences over the defaults.
    ///
    /// Missing, unreadable or corrupt data falls back to the defaults; loading
    /// never fails.
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let prefs = load_preferences(storage.as_ref());
        Self {
            storage,
            current: RwLock::new(prefs),
        }
    }

    /// Create a store seeded with explicit preferences (nothing is written)
    pub fn with_preferences(storage: Arc<dyn Storage>, prefs: Preferences) -> Self {
        Self {
            storage,
            current: RwLock::new(prefs),
        }
    }

    /// Copy of the current preferences
    pub fn snapshot(&self) -> Preferences {
        self.current.read().clone()
    }

    /// Current backend base URL
    pub fn api_url(&self) -> String {
        self.current.read().api_url.clone()
    }

    /// Currently selected model, if any
    pub fn model_id(&self) -> Option<String> {
        self.current.read().model_id.clone()
    }

    /// Persist the full preference object, replacing prior state
    pub fn save(&self, prefs: Preferences) -> Result<()> {
        let blob = prefs.to_blob()?;
        self.storage.set_item(STORAGE_KEY, &blob)?;
        *self.current.write() = prefs;
        debug!("Saved preferences");
        Ok(())
    }

    /// Apply one settings change and persist the result.
    ///
    /// On a validation or storage failure nothing changes.
    pub fn apply(&self, change: SettingChange) -> Result<Preferences> {
        let key = change.key();
        let mut next = self.snapshot();
        next.apply(change)?;
        self.save(next.clone())?;
        info!("Updated setting {}", key);
        Ok(next)
    }
}

/// Read the persisted preferences, merged over the defaults
pub fn load_preferences(storage: &dyn Storage) -> Preferences {
    let blob = match storage.get_item(STORAGE_KEY) {
        Ok(Some(blob)) => blob,
        Ok(None) => {
            debug!("No saved preferences, using defaults");
            return Preferences::default();
        }
        Err(e) => {
            warn!("Failed to read saved preferences: {}", e);
            return Preferences::default();
        }
    };

    match Preferences::from_blob(&blob) {
        Ok(prefs) => prefs,
        Err(e) => {
            warn!("Ignoring corrupt saved preferences: {}", e);
            Preferences::default()
        }
    }
}
